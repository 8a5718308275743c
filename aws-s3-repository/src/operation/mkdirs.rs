/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use tracing::Instrument;

use crate::client::Handle;
use crate::error::{self, Error};
use crate::key::DELIMITER;

/// Write an empty marker object for every directory on the path to `key`, outermost first.
///
/// `a/b/c.txt` produces `a/` then `a/b/`. A key ending in `/` gets a marker for itself too.
pub(crate) async fn ensure_directories(handle: &Handle, key: &str) -> Result<(), Error> {
    let span = tracing::debug_span!("ensure-directories", key);
    async move {
        for directory in directories(key) {
            write_marker(handle, directory).await?;
        }
        Ok(())
    }
    .instrument(span)
    .await
}

fn directories(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices(DELIMITER)
        .map(move |(index, delimiter)| &key[..index + delimiter.len()])
}

async fn write_marker(handle: &Handle, directory: &str) -> Result<(), Error> {
    tracing::trace!(directory, "writing directory marker");
    handle
        .client
        .put_object()
        .bucket(handle.bucket())
        .key(directory)
        .content_length(0)
        .server_side_encryption(ServerSideEncryption::Aes256)
        .body(ByteStream::from_static(b""))
        .send()
        .await
        .map_err(|err| error::transfer_failed(format!("cannot write directory '{directory}'"), err))?;
    Ok(())
}

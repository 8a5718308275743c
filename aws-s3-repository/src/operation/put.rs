/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::Path;
use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use tokio::fs;
use tracing::Instrument;

use crate::client::Handle;
use crate::error::{self, Error};
use crate::io::{ProgressBody, TransferProgress};
use crate::operation::mkdirs;

/// Operation struct for uploading a local file as a single resource
#[derive(Clone, Default, Debug)]
pub(crate) struct Put;

impl Put {
    /// Upload `source` as `destination`.
    ///
    /// Directory markers for every ancestor of the destination key are written first and are
    /// not removed if the upload itself fails.
    pub(crate) async fn orchestrate(
        handle: Arc<Handle>,
        source: &Path,
        destination: &str,
        progress: &mut dyn TransferProgress,
    ) -> Result<(), Error> {
        let span = tracing::debug_span!("put", source = %source.display(), destination);
        transfer(&handle, source, destination, progress)
            .instrument(span)
            .await
    }
}

async fn transfer(
    handle: &Handle,
    source: &Path,
    destination: &str,
    progress: &mut dyn TransferProgress,
) -> Result<(), Error> {
    let key = handle.key(destination);
    mkdirs::ensure_directories(handle, &key).await?;

    let cannot_read = |err: std::io::Error| {
        error::not_found(format!("cannot read file from '{}'", source.display()), err)
    };
    let file = fs::File::open(source).await.map_err(cannot_read)?;
    let content_length = file.metadata().await.map_err(cannot_read)?.len();
    let content_type = mime_guess::from_path(source).first_or_octet_stream();
    let (body, mut chunks) = ProgressBody::new(file, content_length);

    tracing::trace!(
        bucket = handle.bucket(),
        %key,
        content_length,
        %content_type,
        "sending put-object"
    );
    let request = handle
        .client
        .put_object()
        .bucket(handle.bucket())
        .key(key)
        .content_length(content_length as i64)
        .content_type(content_type.essence_str())
        .server_side_encryption(ServerSideEncryption::Aes256)
        .body(ByteStream::from_body_1_x(body))
        .send();
    tokio::pin!(request);

    // report chunks as the client pulls them from the body
    let mut reporting = true;
    let result = loop {
        tokio::select! {
            chunk = chunks.recv(), if reporting => match chunk {
                Some(chunk) => progress.notify(&chunk),
                None => reporting = false,
            },
            result = &mut request => break result,
        }
    };
    while let Ok(chunk) = chunks.try_recv() {
        progress.notify(&chunk);
    }

    result.map_err(|err| {
        error::transfer_failed(format!("cannot write file to '{destination}'"), err)
    })?;

    tracing::debug!(destination, content_length, "uploaded resource");
    Ok(())
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::DateTime;
use tracing::Instrument;

use crate::client::Handle;
use crate::error::{self, Error};

/// Whether the object behind `resource_name` can be looked up.
///
/// Absence and any other failure (permissions, connectivity) are both `false`.
pub(crate) async fn exists(handle: &Handle, resource_name: &str) -> bool {
    let span = tracing::debug_span!("exists", resource_name);
    match head_object(handle, resource_name).instrument(span).await {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(
                resource_name,
                error = %DisplayErrorContext(&err),
                "resource lookup failed; reporting as absent"
            );
            false
        }
    }
}

/// Whether `resource_name` was last modified strictly after `timestamp`.
pub(crate) async fn is_newer(
    handle: &Handle,
    resource_name: &str,
    timestamp: DateTime,
) -> Result<bool, Error> {
    let span = tracing::debug_span!("is-newer", resource_name);
    let output = head_object(handle, resource_name)
        .instrument(span)
        .await
        .map_err(|err| error::resource_does_not_exist(resource_name, err))?;

    Ok(match output.last_modified() {
        Some(last_modified) => millis(last_modified) > millis(&timestamp),
        None => true,
    })
}

async fn head_object(
    handle: &Handle,
    resource_name: &str,
) -> Result<HeadObjectOutput, SdkError<HeadObjectError>> {
    handle
        .client
        .head_object()
        .bucket(handle.bucket())
        .key(handle.key(resource_name))
        .send()
        .await
}

// timestamps are compared at millisecond granularity
fn millis(time: &DateTime) -> (i64, u32) {
    (time.secs(), time.subsec_nanos() / 1_000_000)
}

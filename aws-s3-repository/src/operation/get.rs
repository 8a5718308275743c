/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::Instrument;

use crate::client::Handle;
use crate::error::{self, Error};
use crate::io::{ProgressWriter, TransferProgress};

/// Operation struct for downloading a single resource to a local file
#[derive(Clone, Default, Debug)]
pub(crate) struct Get;

impl Get {
    /// Download `resource_name` into `destination`, reporting every chunk written.
    ///
    /// The destination's parent directories are created as needed. A failed transfer may
    /// leave a partially written destination behind.
    pub(crate) async fn orchestrate(
        handle: Arc<Handle>,
        resource_name: &str,
        destination: &Path,
        progress: &mut dyn TransferProgress,
    ) -> Result<(), Error> {
        let span =
            tracing::debug_span!("get", resource_name, destination = %destination.display());
        transfer(&handle, resource_name, destination, progress)
            .instrument(span)
            .await
    }
}

async fn transfer(
    handle: &Handle,
    resource_name: &str,
    destination: &Path,
    progress: &mut dyn TransferProgress,
) -> Result<(), Error> {
    let key = handle.key(resource_name);
    tracing::trace!(bucket = handle.bucket(), %key, "sending get-object");
    let output = handle
        .client
        .get_object()
        .bucket(handle.bucket())
        .key(key)
        .send()
        .await
        .map_err(|err| error::resource_does_not_exist(resource_name, err))?;

    let cannot_write = |err: std::io::Error| {
        error::transfer_failed(
            format!("cannot write file to '{}'", destination.display()),
            err,
        )
    };
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(cannot_write)?;
    }
    let file = fs::File::create(destination).await.map_err(cannot_write)?;

    let cannot_copy = |err: std::io::Error| {
        error::transfer_failed(
            format!(
                "cannot read from '{resource_name}' and write to '{}'",
                destination.display()
            ),
            err,
        )
    };
    let body = output.body.into_async_read();
    tokio::pin!(body);
    let mut writer = ProgressWriter::new(file, progress);
    let bytes = tokio::io::copy_buf(&mut body, &mut writer)
        .await
        .map_err(cannot_copy)?;
    writer.flush().await.map_err(cannot_copy)?;

    tracing::debug!(resource_name, bytes, "downloaded resource");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_s3::operation::get_object::GetObjectOutput;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    use super::Get;
    use crate::client::Handle;
    use crate::error::ErrorKind;
    use crate::types::RepositoryLocation;

    fn handle(client: aws_sdk_s3::Client) -> Arc<Handle> {
        Arc::new(Handle {
            client,
            location: RepositoryLocation::new("test-bucket", "/releases"),
        })
    }

    #[tokio::test]
    async fn test_get_writes_destination() {
        let get = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|r| {
                r.bucket() == Some("test-bucket") && r.key() == Some("releases/com/a.txt")
            })
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"hello repository"))
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get]);

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested/a.txt");
        let mut received = 0;
        let mut progress = |chunk: &[u8]| received += chunk.len();

        Get::orchestrate(handle(client), "com/a.txt", &destination, &mut progress)
            .await
            .unwrap();

        assert_eq!(
            b"hello repository".as_slice(),
            std::fs::read(&destination).unwrap()
        );
        assert_eq!(16, received);
    }

    #[tokio::test]
    async fn test_get_missing_resource() {
        let get = mock!(aws_sdk_s3::Client::get_object).then_http_response(|| {
            HttpResponse::new(StatusCode::try_from(404).unwrap(), SdkBody::empty())
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get]);

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("a.txt");
        let mut progress = |_: &[u8]| {};

        let err = Get::orchestrate(handle(client), "com/a.txt", &destination, &mut progress)
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
        assert!(err.to_string().contains("'com/a.txt' does not exist"));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_get_unwritable_destination() {
        let get = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"data"))
                .build()
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get]);

        // the destination is an existing directory
        let dir = tempfile::tempdir().unwrap();
        let mut progress = |_: &[u8]| {};

        let err = Get::orchestrate(handle(client), "com/a.txt", dir.path(), &mut progress)
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::TransferFailed, err.kind());
        assert!(err.to_string().contains("cannot write file to"));
    }

    #[tokio::test]
    async fn test_panicking_progress_releases_destination() {
        let failing = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"first attempt"))
                .build()
        });
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("a.txt");

        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&failing]);
        let target = destination.clone();
        let task = tokio::spawn(async move {
            let mut progress = |_: &[u8]| panic!("progress sink failed");
            Get::orchestrate(handle(client), "com/a.txt", &target, &mut progress).await
        });
        let err = task.await.unwrap_err();
        assert!(err.is_panic());

        // the file handle was dropped with the panicking task
        let retry = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"second"))
                .build()
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&retry]);
        let mut progress = |_: &[u8]| {};
        Get::orchestrate(handle(client), "com/a.txt", &destination, &mut progress)
            .await
            .unwrap();
        assert_eq!(b"second".as_slice(), std::fs::read(&destination).unwrap());
        std::fs::remove_file(&destination).unwrap();
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::config::IdentityCache;
use aws_sdk_s3::types::BucketLocationConstraint;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_types::region::Region;
use tracing::Instrument;

use crate::config::Config;
use crate::credentials::CredentialsChain;
use crate::error::{self, Error};
use crate::http;

/// Region of buckets without a location constraint, also used when no region is configured
const GLOBAL_REGION: &str = "us-east-1";

/// Build the S3 client used for all requests against `bucket`.
///
/// Fails with `AuthenticationFailed` when `credentials` yields nothing.
pub(crate) async fn load_client(
    config: &Config,
    bucket: &str,
    credentials: CredentialsChain,
) -> Result<aws_sdk_s3::Client, Error> {
    credentials
        .provide_credentials()
        .await
        .map_err(error::authentication_failed)?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).credentials_provider(credentials);
    if let Some(region) = config.region() {
        loader = loader.region(region.clone());
    }
    if let Some(profile_name) = config.profile_name() {
        loader = loader.profile_name(profile_name);
    }
    if let Some(endpoint_url) = config.endpoint_url() {
        loader = loader.endpoint_url(endpoint_url);
    }
    if let Some(http_client) = http::http_client(config) {
        tracing::debug!(proxy = ?config.proxy(), "tunneling connections through proxy");
        loader = loader.http_client(http_client);
    }
    let shared_config = loader.load().await;

    let region = shared_config
        .region()
        .cloned()
        .unwrap_or_else(|| Region::from_static(GLOBAL_REGION));

    // the credential chain is consulted on every request
    let mut s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
        .identity_cache(IdentityCache::no_cache())
        .region(region)
        .force_path_style(config.force_path_style());

    if config.discover_bucket_region() {
        let probe = aws_sdk_s3::Client::from_conf(s3_config.clone().build());
        if let Some(bucket_region) = bucket_region(&probe, bucket).await {
            tracing::debug!(bucket, region = %bucket_region, "discovered bucket region");
            s3_config = s3_config.region(bucket_region);
        }
    }

    Ok(aws_sdk_s3::Client::from_conf(s3_config.build()))
}

/// Ask the store where `bucket` lives. `None` when the lookup fails.
pub(crate) async fn bucket_region(client: &aws_sdk_s3::Client, bucket: &str) -> Option<Region> {
    let result = client
        .get_bucket_location()
        .bucket(bucket)
        .send()
        .instrument(tracing::debug_span!("send-get-bucket-location"))
        .await;

    match result {
        Ok(output) => Some(location_region(output.location_constraint())),
        Err(err) => {
            tracing::warn!(
                bucket,
                error = %DisplayErrorContext(&err),
                "unable to discover bucket region; keeping configured region"
            );
            None
        }
    }
}

fn location_region(constraint: Option<&BucketLocationConstraint>) -> Region {
    match constraint.map(BucketLocationConstraint::as_str) {
        None | Some("") => Region::from_static(GLOBAL_REGION),
        // legacy constraint
        Some("EU") => Region::from_static("eu-west-1"),
        Some(region) => Region::new(region.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{bucket_region, load_client, location_region};
    use crate::credentials::{CredentialSource, CredentialsChain};
    use crate::error::ErrorKind;
    use aws_sdk_s3::operation::get_bucket_location::GetBucketLocationOutput;
    use aws_sdk_s3::types::BucketLocationConstraint;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    #[test]
    fn test_location_region() {
        assert_eq!("us-east-1", location_region(None).as_ref());
        assert_eq!(
            "us-east-1",
            location_region(Some(&BucketLocationConstraint::from(""))).as_ref()
        );
        assert_eq!(
            "eu-west-1",
            location_region(Some(&BucketLocationConstraint::Eu)).as_ref()
        );
        assert_eq!(
            "ap-southeast-2",
            location_region(Some(&BucketLocationConstraint::ApSoutheast2)).as_ref()
        );
    }

    #[tokio::test]
    async fn test_bucket_region_from_location() {
        let get_location = mock!(aws_sdk_s3::Client::get_bucket_location)
            .match_requests(|r| r.bucket() == Some("test-bucket"))
            .then_output(|| {
                GetBucketLocationOutput::builder()
                    .location_constraint(BucketLocationConstraint::EuCentral1)
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get_location]);

        let region = bucket_region(&client, "test-bucket").await.unwrap();
        assert_eq!("eu-central-1", region.as_ref());
    }

    #[tokio::test]
    async fn test_bucket_region_lookup_failure() {
        let get_location = mock!(aws_sdk_s3::Client::get_bucket_location).then_http_response(|| {
            HttpResponse::new(StatusCode::try_from(403).unwrap(), SdkBody::empty())
        });
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get_location]);

        assert!(bucket_region(&client, "test-bucket").await.is_none());
    }

    #[tokio::test]
    async fn test_load_client_without_credentials() {
        let chain = CredentialsChain::new(vec![CredentialSource::Explicit(None)]);
        let err = load_client(&crate::Config::default(), "test-bucket", chain)
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::AuthenticationFailed, err.kind());
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::ecs::EcsCredentialsProvider;
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{future, ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::types::AuthenticationInfo;

const EXPLICIT_PROVIDER_NAME: &str = "RepositoryAuthentication";

/// A single source of credentials in a [`CredentialsChain`]
#[derive(Debug)]
#[non_exhaustive]
pub enum CredentialSource {
    /// Caller supplied user name / password, used as access key id / secret access key.
    /// Yields nothing when absent.
    Explicit(Option<AuthenticationInfo>),

    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`
    Environment(EnvironmentVariableCredentialsProvider),

    /// Named profile of the shared config / credentials files
    Profile(ProfileFileCredentialsProvider),

    /// Container credentials endpoint (ECS, EKS pod identity)
    Container(EcsCredentialsProvider),

    /// EC2 instance metadata service
    Instance(ImdsCredentialsProvider),

    /// Any other provider
    Custom(SharedCredentialsProvider),
}

impl CredentialSource {
    fn name(&self) -> &'static str {
        match self {
            CredentialSource::Explicit(_) => "explicit",
            CredentialSource::Environment(_) => "environment",
            CredentialSource::Profile(_) => "profile",
            CredentialSource::Container(_) => "container",
            CredentialSource::Instance(_) => "instance",
            CredentialSource::Custom(_) => "custom",
        }
    }

    /// `Ok(None)` when this source has nothing to offer
    async fn try_resolve(&self) -> Result<Option<Credentials>, CredentialsError> {
        let result = match self {
            CredentialSource::Explicit(None) => return Ok(None),
            CredentialSource::Explicit(Some(info)) => {
                return Ok(Some(Credentials::new(
                    info.username(),
                    info.password(),
                    None,
                    None,
                    EXPLICIT_PROVIDER_NAME,
                )))
            }
            CredentialSource::Environment(provider) => provider.provide_credentials().await,
            CredentialSource::Profile(provider) => provider.provide_credentials().await,
            CredentialSource::Container(provider) => provider.provide_credentials().await,
            CredentialSource::Instance(provider) => provider.provide_credentials().await,
            CredentialSource::Custom(provider) => provider.provide_credentials().await,
        };

        match result {
            Ok(credentials) => Ok(Some(credentials)),
            Err(CredentialsError::CredentialsNotLoaded(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Ordered list of credential sources; the first source yielding credentials wins.
///
/// Nothing is cached: every call to [`provide_credentials`](ProvideCredentials::provide_credentials)
/// walks the chain again, so rotated credentials are picked up.
#[derive(Debug)]
pub struct CredentialsChain {
    sources: Vec<CredentialSource>,
}

impl CredentialsChain {
    /// Create a chain evaluating `sources` in order
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self { sources }
    }

    /// The chain used when connecting to a repository: explicit authentication info,
    /// environment variables, the named (or default) profile, then container and instance
    /// credentials.
    pub fn repository_default(
        authentication_info: Option<&AuthenticationInfo>,
        profile_name: Option<&str>,
    ) -> Self {
        let mut profile = ProfileFileCredentialsProvider::builder();
        if let Some(profile_name) = profile_name {
            profile = profile.profile_name(profile_name);
        }

        Self::new(vec![
            CredentialSource::Explicit(authentication_info.cloned()),
            CredentialSource::Environment(EnvironmentVariableCredentialsProvider::new()),
            CredentialSource::Profile(profile.build()),
            CredentialSource::Container(EcsCredentialsProvider::builder().build()),
            CredentialSource::Instance(ImdsCredentialsProvider::builder().build()),
        ])
    }

    /// The sources of this chain, in evaluation order
    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// Walk the chain and return the first credentials found.
    ///
    /// A source failing with an error is skipped like a source that has no credentials.
    pub async fn resolve(&self) -> Result<Credentials, CredentialsError> {
        for source in &self.sources {
            match source.try_resolve().await {
                Ok(Some(credentials)) => {
                    tracing::debug!(source = source.name(), "loaded credentials");
                    return Ok(credentials);
                }
                Ok(None) => {
                    tracing::trace!(source = source.name(), "no credentials in source");
                }
                Err(err) => {
                    tracing::debug!(
                        source = source.name(),
                        error = %DisplayErrorContext(&err),
                        "credential source failed; trying next source"
                    );
                }
            }
        }

        Err(CredentialsError::not_loaded(
            "no credential source in the chain yielded credentials",
        ))
    }
}

impl ProvideCredentials for CredentialsChain {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialSource, CredentialsChain};
    use crate::types::AuthenticationInfo;
    use aws_credential_types::provider::error::CredentialsError;
    use aws_credential_types::provider::{future, ProvideCredentials, SharedCredentialsProvider};
    use aws_credential_types::Credentials;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn static_source(access_key_id: &str) -> CredentialSource {
        let credentials = Credentials::new(access_key_id, "secret", None, None, "test");
        CredentialSource::Custom(SharedCredentialsProvider::new(credentials))
    }

    #[derive(Debug)]
    struct Failing;

    impl ProvideCredentials for Failing {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            future::ProvideCredentials::ready(Err(CredentialsError::provider_error("boom")))
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Counting(Arc<AtomicUsize>);

    impl ProvideCredentials for Counting {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            let call = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            let credentials =
                Credentials::new(format!("AKID{call}"), "secret", None, None, "counting");
            future::ProvideCredentials::ready(Ok(credentials))
        }
    }

    #[tokio::test]
    async fn test_explicit_info_preempts_other_sources() {
        let info = AuthenticationInfo::new("username", "password");
        let chain = CredentialsChain::new(vec![
            CredentialSource::Explicit(Some(info)),
            static_source("from-environment"),
        ]);

        let credentials = chain.provide_credentials().await.unwrap();
        assert_eq!("username", credentials.access_key_id());
        assert_eq!("password", credentials.secret_access_key());
    }

    #[tokio::test]
    async fn test_absent_explicit_info_falls_through() {
        let chain = CredentialsChain::new(vec![
            CredentialSource::Explicit(None),
            static_source("second"),
            static_source("third"),
        ]);

        let credentials = chain.provide_credentials().await.unwrap();
        assert_eq!("second", credentials.access_key_id());
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        let chain = CredentialsChain::new(vec![
            CredentialSource::Custom(SharedCredentialsProvider::new(Failing)),
            static_source("next"),
        ]);

        let credentials = chain.provide_credentials().await.unwrap();
        assert_eq!("next", credentials.access_key_id());
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let chain = CredentialsChain::new(vec![
            CredentialSource::Explicit(None),
            CredentialSource::Custom(SharedCredentialsProvider::new(Failing)),
        ]);

        let err = chain.provide_credentials().await.unwrap_err();
        assert!(matches!(err, CredentialsError::CredentialsNotLoaded(_)));
    }

    #[tokio::test]
    async fn test_chain_is_evaluated_on_every_request() {
        let counting = Counting::default();
        let chain = CredentialsChain::new(vec![
            CredentialSource::Explicit(None),
            CredentialSource::Custom(SharedCredentialsProvider::new(counting.clone())),
        ]);

        assert_eq!("AKID1", chain.resolve().await.unwrap().access_key_id());
        assert_eq!("AKID2", chain.resolve().await.unwrap().access_key_id());
        assert_eq!(2, counting.0.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_repository_default_order() {
        let chain = CredentialsChain::repository_default(None, Some("deploy"));
        let names: Vec<_> = chain.sources().iter().map(|s| s.name()).collect();
        assert_eq!(
            vec!["explicit", "environment", "profile", "container", "instance"],
            names
        );
        assert!(matches!(
            chain.sources()[0],
            CredentialSource::Explicit(None)
        ));
    }
}

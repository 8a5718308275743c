/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use aws_smithy_types::DateTime;
use tracing::Instrument;

use crate::config::loader;
use crate::credentials::CredentialsChain;
use crate::error::{self, Error};
use crate::io::TransferProgress;
use crate::key;
use crate::operation::{get::Get, list::ListDirectory, metadata, put::Put};
use crate::types::{AuthenticationInfo, RepositoryLocation};
use crate::Config;

/// Remote repository client for a directory tree stored in an Amazon S3 bucket.
///
/// A client starts disconnected. [`connect`](Client::connect) resolves credentials and the
/// bucket to use; every other operation requires an established connection and fails with
/// [`ErrorKind::NotConnected`](crate::error::ErrorKind::NotConnected) otherwise.
///
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct Client {
    state: Arc<State>,
}

#[derive(Debug)]
struct State {
    config: Config,
    connection: RwLock<Option<Arc<Handle>>>,
    // serializes connect attempts
    connecting: tokio::sync::Mutex<()>,
}

/// An established connection: store handle, bucket and base directory.
///
/// Published and cleared as a whole; operations hold on to one `Arc<Handle>` for their
/// entire duration.
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) client: aws_sdk_s3::Client,
    pub(crate) location: RepositoryLocation,
}

impl Handle {
    pub(crate) fn bucket(&self) -> &str {
        self.location.bucket()
    }

    pub(crate) fn base_directory(&self) -> &str {
        self.location.base_directory()
    }

    /// Object key of `resource_name` within this repository
    pub(crate) fn key(&self, resource_name: &str) -> String {
        key::to_key(self.base_directory(), resource_name)
    }
}

impl Client {
    /// Creates a new, disconnected client.
    pub fn new(config: Config) -> Client {
        Client {
            state: Arc::new(State {
                config,
                connection: RwLock::new(None),
                connecting: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Creates a client already connected to `location` through an existing S3 client.
    pub fn connected(
        client: aws_sdk_s3::Client,
        location: RepositoryLocation,
        config: Config,
    ) -> Client {
        let repository = Client::new(config);
        repository.publish(Some(Arc::new(Handle { client, location })));
        repository
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// The location of the current connection, if connected
    pub fn location(&self) -> Option<RepositoryLocation> {
        self.current().map(|handle| handle.location.clone())
    }

    /// Whether a connection is established
    pub fn is_connected(&self) -> bool {
        self.current().is_some()
    }

    /// Connect to the repository at `location`.
    ///
    /// Credentials come from `authentication_info` when given, then from the environment,
    /// the configured profile and finally container or instance credentials.
    /// Connecting an already connected client does nothing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aws_s3_repository::types::{AuthenticationInfo, RepositoryLocation};
    ///
    /// async fn connect(client: &aws_s3_repository::Client) -> Result<(), aws_s3_repository::error::Error> {
    ///     let location = RepositoryLocation::from_url("s3://my-bucket/releases")?;
    ///     let auth = AuthenticationInfo::new("AKIDEXAMPLE", "secret");
    ///     client.connect(&location, Some(&auth)).await
    /// }
    /// ```
    pub async fn connect(
        &self,
        location: &RepositoryLocation,
        authentication_info: Option<&AuthenticationInfo>,
    ) -> Result<(), Error> {
        let credentials = CredentialsChain::repository_default(
            authentication_info,
            self.config().profile_name(),
        );
        self.connect_with_credentials(location, credentials).await
    }

    /// Connect to the repository at `location` using an explicit credential chain.
    pub async fn connect_with_credentials(
        &self,
        location: &RepositoryLocation,
        credentials: CredentialsChain,
    ) -> Result<(), Error> {
        let _connecting = self.state.connecting.lock().await;
        if let Some(handle) = self.current() {
            tracing::debug!(location = %handle.location, "already connected");
            return Ok(());
        }

        let client = loader::load_client(self.config(), location.bucket(), credentials)
            .instrument(tracing::debug_span!("connect", %location))
            .await?;

        tracing::debug!(%location, "connected");
        self.publish(Some(Arc::new(Handle {
            client,
            location: location.clone(),
        })));
        Ok(())
    }

    /// Drop the current connection, if any.
    pub fn disconnect(&self) {
        if let Some(handle) = self.publish(None) {
            tracing::debug!(location = %handle.location, "disconnected");
        }
    }

    /// Whether `resource_name` exists in the repository.
    ///
    /// Any failure looking up the resource, not just its absence, yields `false`.
    pub async fn exists(&self, resource_name: &str) -> Result<bool, Error> {
        let handle = self.handle()?;
        Ok(metadata::exists(&handle, resource_name).await)
    }

    /// Whether `resource_name` was modified after `timestamp`.
    ///
    /// Compared at millisecond granularity; a resource without a modification time is
    /// always newer.
    pub async fn is_newer(
        &self,
        resource_name: &str,
        timestamp: impl Into<DateTime>,
    ) -> Result<bool, Error> {
        let handle = self.handle()?;
        metadata::is_newer(&handle, resource_name, timestamp.into()).await
    }

    /// Download `resource_name` into the file at `destination`, reporting every chunk written
    /// to `progress`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// async fn fetch(client: &aws_s3_repository::Client) -> Result<(), aws_s3_repository::error::Error> {
    ///     let mut received = 0;
    ///     let mut progress = |chunk: &[u8]| received += chunk.len();
    ///     client
    ///         .get("com/example/app/1.0/app-1.0.jar", "app-1.0.jar", &mut progress)
    ///         .await
    /// }
    /// ```
    pub async fn get(
        &self,
        resource_name: &str,
        destination: impl AsRef<Path>,
        progress: &mut dyn TransferProgress,
    ) -> Result<(), Error> {
        let handle = self.handle()?;
        Get::orchestrate(handle, resource_name, destination.as_ref(), progress).await
    }

    /// Upload the file at `source` as `destination`, creating the directory markers leading
    /// up to it first. The file is streamed, and every chunk handed to the store is reported
    /// to `progress`.
    pub async fn put(
        &self,
        source: impl AsRef<Path>,
        destination: &str,
        progress: &mut dyn TransferProgress,
    ) -> Result<(), Error> {
        let handle = self.handle()?;
        Put::orchestrate(handle, source.as_ref(), destination, progress).await
    }

    /// Names of the files and directories directly below `directory`.
    ///
    /// `directory` is empty or ends with `/`; directory names end with `/`.
    pub async fn list(&self, directory: &str) -> Result<Vec<String>, Error> {
        let handle = self.handle()?;
        ListDirectory::orchestrate(handle, directory).await
    }

    fn current(&self) -> Option<Arc<Handle>> {
        self.state
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn handle(&self) -> Result<Arc<Handle>, Error> {
        self.current().ok_or_else(error::not_connected)
    }

    /// Replace the current connection, returning the previous one
    fn publish(&self, handle: Option<Arc<Handle>>) -> Option<Arc<Handle>> {
        let mut connection = self
            .state
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *connection, handle)
    }
}

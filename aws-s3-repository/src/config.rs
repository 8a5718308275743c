/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_types::region::Region;

pub(crate) mod loader;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    region: Option<Region>,
    profile_name: Option<String>,
    endpoint_url: Option<String>,
    force_path_style: bool,
    discover_bucket_region: bool,
    proxy: Option<ProxyConfig>,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Explicit region, if any. Otherwise the default region provider chain is used.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Profile consulted by the profile credential source
    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    /// Alternate endpoint for S3 compatible stores
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Whether path-style addressing is forced
    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    /// Whether the bucket's own region is looked up on connect
    pub fn discover_bucket_region(&self) -> bool {
        self.discover_bucket_region && self.endpoint_url.is_none()
    }

    /// Proxy all connections are tunneled through, if any
    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Builder::default().build()
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone)]
pub struct Builder {
    region: Option<Region>,
    profile_name: Option<String>,
    endpoint_url: Option<String>,
    force_path_style: bool,
    discover_bucket_region: bool,
    proxy: Option<ProxyConfig>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            region: None,
            profile_name: None,
            endpoint_url: None,
            force_path_style: false,
            discover_bucket_region: true,
            proxy: None,
        }
    }
}

impl Builder {
    /// Region used to reach the bucket.
    ///
    /// When bucket region discovery is enabled this is only the region the discovery request
    /// is sent to.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Name of the profile the profile credential source reads.
    ///
    /// Default is the `AWS_PROFILE` environment variable, or `default`.
    pub fn profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Send requests to an S3 compatible endpoint instead of Amazon S3.
    ///
    /// Setting an endpoint disables bucket region discovery.
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Force path-style addressing (`https://endpoint/bucket/key`).
    ///
    /// Default is `false`.
    pub fn force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Look up the bucket's region on connect and send all requests there.
    ///
    /// Default is `true`.
    pub fn discover_bucket_region(mut self, discover_bucket_region: bool) -> Self {
        self.discover_bucket_region = discover_bucket_region;
        self
    }

    /// Tunnel every connection through the HTTP proxy at `host:port`.
    ///
    /// Default is no proxy.
    pub fn proxy(self, host: impl Into<String>, port: u16) -> Self {
        self.set_proxy(Some(ProxyConfig::new(host, port)))
    }

    /// Set or clear the proxy connections are tunneled through
    pub fn set_proxy(mut self, proxy: Option<ProxyConfig>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    pub fn build(self) -> Config {
        Config {
            region: self.region,
            profile_name: self.profile_name,
            endpoint_url: self.endpoint_url,
            force_path_style: self.force_path_style,
            discover_bucket_region: self.discover_bucket_region,
            proxy: self.proxy,
        }
    }
}

/// Address of an HTTP proxy supporting `CONNECT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    host: String,
    port: u16,
}

impl ProxyConfig {
    /// Proxy listening on `host:port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address of the proxy
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the proxy
    pub fn port(&self) -> u16 {
        self.port
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use aws_smithy_runtime_api::client::http::SharedHttpClient;

use crate::config::{Config, ProxyConfig};

pub(crate) mod tunnel;

/// The HTTP client for `config`, `None` when the SDK default client should be used.
pub(crate) fn http_client(config: &Config) -> Option<SharedHttpClient> {
    config.proxy().map(proxy_client)
}

/// HTTPS client whose connections are tunneled through `proxy`
fn proxy_client(proxy: &ProxyConfig) -> SharedHttpClient {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .wrap_connector(tunnel::TunnelConnector::new(proxy.clone()));
    HyperClientBuilder::new().build(connector)
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use hyper::service::Service;
use hyper::Uri;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ProxyConfig;

/// Upper bound on the size of a proxy's `CONNECT` response head
const MAX_HEAD: usize = 8 * 1024;

/// Connector opening every connection as a `CONNECT` tunnel through an HTTP proxy.
///
/// TLS, when the destination needs it, is layered on top of the tunnel by the caller.
#[derive(Debug, Clone)]
pub(crate) struct TunnelConnector {
    proxy: ProxyConfig,
}

impl TunnelConnector {
    pub(crate) fn new(proxy: ProxyConfig) -> Self {
        Self { proxy }
    }
}

impl Service<Uri> for TunnelConnector {
    type Response = TcpStream;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = io::Result<TcpStream>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, destination: Uri) -> Self::Future {
        let proxy = self.proxy.clone();
        Box::pin(async move {
            let authority = authority(&destination)?;
            open_tunnel(&proxy, &authority).await
        })
    }
}

/// `host:port` of `destination`, with the scheme's default port filled in
fn authority(destination: &Uri) -> io::Result<String> {
    let host = destination.host().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no host in '{destination}'"),
        )
    })?;
    let port = match (destination.port_u16(), destination.scheme_str()) {
        (Some(port), _) => port,
        (None, Some("http")) => 80,
        (None, _) => 443,
    };
    Ok(format!("{host}:{port}"))
}

async fn open_tunnel(proxy: &ProxyConfig, authority: &str) -> io::Result<TcpStream> {
    let mut stream = TcpStream::connect((proxy.host(), proxy.port())).await?;
    let request = format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let head = read_head(&mut stream).await?;
    let status_line = head.lines().next().unwrap_or_default();
    match status_line.split_whitespace().nth(1) {
        Some(status) if status.starts_with('2') => {
            tracing::trace!(
                proxy = proxy.host(),
                port = proxy.port(),
                authority,
                "opened proxy tunnel"
            );
            Ok(stream)
        }
        _ => Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("proxy refused tunnel to '{authority}': {status_line}"),
        )),
    }
}

/// Read up to and including the blank line ending a message head.
///
/// Reads byte by byte so nothing sent through the tunnel afterwards is consumed.
async fn read_head(stream: &mut TcpStream) -> io::Result<String> {
    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_HEAD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "proxy response head too large",
            ));
        }
        head.push(stream.read_u8().await?);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

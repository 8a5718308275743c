/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! AWS S3 Repository
//!
//! Treats a directory tree inside an Amazon S3 bucket as a remote artifact repository:
//! check whether a resource exists or is newer than a local copy, download and upload
//! resources with progress reporting, and list the entries of a directory.
//!
//! A repository location is an `s3://bucket/base/path` URL. Resource names are relative
//! to the base path and use `/` as separator.

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

/// Error types emitted by `aws-s3-repository`
pub mod error;

/// Common types used by `aws-s3-repository`
pub mod types;

/// Mapping between resource names and object keys
pub mod key;

/// Types and helpers for I/O
pub mod io;

/// Credential sources consulted when connecting
pub mod credentials;

/// Repository client
pub mod client;

/// Repository operations
pub(crate) mod operation;

/// Client configuration
pub mod config;

/// HTTP client construction
pub(crate) mod http;

pub use self::client::Client;
pub use self::config::Config;

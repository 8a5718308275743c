/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Tokio I/O adapters reporting transferred chunks to a [`TransferProgress`] sink
pub mod progress;

/// Streaming request body reporting the chunks it yields
pub(crate) mod body;

// re-exports
pub(crate) use self::body::ProgressBody;
pub use self::progress::ProgressReader;
pub use self::progress::ProgressWriter;
pub use self::progress::TransferProgress;

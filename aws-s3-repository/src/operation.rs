/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Download of a single resource
pub(crate) mod get;

/// Upload of a single resource
pub(crate) mod put;

/// Directory listing
pub(crate) mod list;

/// Existence and modification time checks
pub(crate) mod metadata;

/// Directory marker objects written ahead of uploads
pub(crate) mod mkdirs;

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Mapping between repository resource names and object keys.

/// Separator between path segments of a key
pub const DELIMITER: &str = "/";

/// Map a resource name to its object key.
///
/// Plain concatenation: the resource name is not validated or normalized, callers must not
/// pass names starting with `/` or containing `..` segments.
pub fn to_key(base_directory: &str, resource_name: &str) -> String {
    format!("{base_directory}{resource_name}")
}

/// Matcher anchored at a listing prefix, used to recover resource names from listed keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePattern {
    prefix: String,
}

impl ResourcePattern {
    /// Create a pattern anchored at `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix this pattern is anchored at
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the part of `key` following the prefix, or `key` itself when it does not
    /// start with the prefix.
    pub fn resource_name<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fs;
use tempfile::TempDir;

/// Create a temporary directory containing `files`, given as paths relative to the
/// directory and their contents
pub fn create_test_dir(files: &[(&str, &[u8])]) -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();

    for (path, contents) in files {
        let full_path = temp_dir.path().join(path);
        let parent = full_path.parent().unwrap();

        // Create the parent directories if they don't exist
        fs::create_dir_all(parent).unwrap();
        fs::write(&full_path, contents).unwrap();
    }

    temp_dir
}

/// Deterministic test content of `size` bytes
pub fn test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Progress sink state recorded by tests
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordedProgress {
    /// Total bytes reported
    pub total: usize,
    /// Number of notifications
    pub chunks: usize,
}

impl RecordedProgress {
    /// Record a notification for `buffer`
    pub fn record(&mut self, buffer: &[u8]) {
        self.total += buffer.len();
        self.chunks += 1;
    }
}

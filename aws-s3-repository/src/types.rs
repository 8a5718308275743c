/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use url::Url;

use crate::error::{self, Error};
use crate::key::DELIMITER;

/// Host used when a repository URL does not name one
pub const DEFAULT_HOST: &str = "localhost";

const DEFAULT_SCHEME: &str = "s3";

/// Bucket and base directory a repository is rooted at.
///
/// The base directory is either empty or ends with a single `/`, so that
/// every key is formed by plain concatenation with a resource name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryLocation {
    bucket: String,
    base_directory: String,
}

impl RepositoryLocation {
    /// Create a location from a bucket and a base path as it appears in a URL (`/folder`).
    ///
    /// Everything up to and including the first `/` of the base path is dropped.
    pub fn new(bucket: impl Into<String>, base_path: &str) -> Self {
        Self {
            bucket: bucket.into(),
            base_directory: base_directory(base_path),
        }
    }

    /// Derive a location from a repository URL such as `s3://bucket/folder`.
    ///
    /// The `s3://` scheme is optional. An empty URL resolves to the [`DEFAULT_HOST`]
    /// bucket with no base directory.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(Self::new(DEFAULT_HOST, ""));
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("{DEFAULT_SCHEME}://{url}")).map_err(|err| {
                    error::invalid_input(format!("invalid repository url '{url}'"), err)
                })?
            }
            Err(err) => {
                return Err(error::invalid_input(
                    format!("invalid repository url '{url}'"),
                    err,
                ))
            }
        };

        let bucket = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST);

        // the parsed path is percent-encoded
        let path = urlencoding::decode(parsed.path()).map_err(|err| {
            error::invalid_input(format!("invalid repository url '{url}'"), err)
        })?;
        // the path of `s3://bucket` is empty, `s3://bucket/` is "/"
        let base_path = format!("/{}", path.trim_start_matches(DELIMITER));
        Ok(Self::new(bucket, &base_path))
    }

    /// The bucket holding the repository
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Prefix every key of the repository starts with, empty or `/`-terminated
    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DEFAULT_SCHEME}://{}/{}",
            self.bucket, self.base_directory
        )
    }
}

/// Strip everything up to and including the first `/`, then make sure a
/// non-blank remainder ends with exactly one `/`.
fn base_directory(base_path: &str) -> String {
    let directory = match base_path.split_once(DELIMITER) {
        Some((_, rest)) => rest,
        None => "",
    };

    if directory.trim().is_empty() {
        String::new()
    } else if directory.ends_with(DELIMITER) {
        directory.to_owned()
    } else {
        format!("{directory}{DELIMITER}")
    }
}

/// Caller supplied repository credentials.
///
/// The user name is used as the access key id and the password as the secret access key.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationInfo {
    username: String,
    password: String,
}

impl AuthenticationInfo {
    /// Create authentication info from a user name / password pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The user name, used as the access key id
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password, used as the secret access key
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for AuthenticationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationInfo")
            .field("username", &self.username)
            .field("password", &"** redacted **")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(url: &str) -> RepositoryLocation {
        RepositoryLocation::from_url(url).unwrap()
    }

    #[test]
    fn test_bucket_from_url() {
        assert_eq!("localhost", location("").bucket());
        assert_eq!("bucket", location("s3://bucket").bucket());
        assert_eq!("bucket", location("s3://bucket/folder").bucket());
        assert_eq!("bucket", location("bucket").bucket());
        assert_eq!("bucket", location("bucket/folder").bucket());
        assert_eq!(
            "static.example.org",
            location("s3://static.example.org/releases").bucket()
        );
    }

    #[test]
    fn test_base_directory_from_url() {
        assert_eq!("", location("").base_directory());
        assert_eq!("", location("s3://bucket").base_directory());
        assert_eq!("", location("s3://bucket/").base_directory());
        assert_eq!("folder/", location("s3://bucket/folder").base_directory());
        assert_eq!(
            "folder/subfolder/",
            location("s3://bucket/folder/subfolder").base_directory()
        );
        assert_eq!(
            "folder/subfolder/",
            location("s3://bucket/folder/subfolder/").base_directory()
        );
        assert_eq!("", location("bucket").base_directory());
        assert_eq!("folder/", location("bucket/folder").base_directory());
        assert_eq!(
            "folder/subfolder/",
            location("bucket/folder/subfolder/").base_directory()
        );
    }

    #[test]
    fn test_base_directory_is_decoded() {
        assert_eq!("my folder/", location("bucket/my folder").base_directory());
        assert_eq!(
            "my folder/sub%dir/",
            location("s3://bucket/my%20folder/sub%25dir").base_directory()
        );
    }

    #[test]
    fn test_new_normalizes_base_path() {
        assert_eq!("", RepositoryLocation::new("b", "").base_directory());
        assert_eq!("", RepositoryLocation::new("b", "/").base_directory());
        assert_eq!("a/b/", RepositoryLocation::new("b", "/a/b").base_directory());
    }

    #[test]
    fn test_display() {
        assert_eq!("s3://bucket/folder/", location("bucket/folder").to_string());
    }

    #[test]
    fn test_authentication_info_debug_redacts_password() {
        let info = AuthenticationInfo::new("AKID", "secret");
        let debug = format!("{info:?}");
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("secret"));
    }
}

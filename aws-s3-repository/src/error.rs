/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<BoxError>,
}

/// General categories of repository errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// None of the configured credential sources yielded credentials
    AuthenticationFailed,

    /// The requested resource does not exist, or the store could not resolve it
    NotFound,

    /// Reading or writing a resource failed for a reason other than absence
    TransferFailed,

    /// A repository operation was invoked before `connect` (or after `disconnect`)
    NotConnected,

    /// Operation input validation issues
    InputInvalid,
}

impl Error {
    /// Creates a new repository [`Error`] from a known kind of error, a message naming the
    /// offending resource, and an arbitrary error source.
    pub fn new<E>(kind: ErrorKind, message: impl Into<String>, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            message: message.into(),
            source: Some(err.into()),
        }
    }

    fn without_source(kind: ErrorKind, message: impl Into<String>) -> Error {
        Error {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ErrorKind::AuthenticationFailed => "authentication failed",
            ErrorKind::NotFound => "resource not found",
            ErrorKind::TransferFailed => "transfer failed",
            ErrorKind::NotConnected => "not connected",
            ErrorKind::InputInvalid => "invalid input",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub(crate) fn authentication_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(
        ErrorKind::AuthenticationFailed,
        "no credential source yielded credentials",
        err,
    )
}

/// `'{resource}' does not exist`
pub(crate) fn resource_does_not_exist<E>(resource: &str, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(
        ErrorKind::NotFound,
        format!("'{resource}' does not exist"),
        err,
    )
}

pub(crate) fn not_found<E>(message: impl Into<String>, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::NotFound, message, err)
}

pub(crate) fn transfer_failed<E>(message: impl Into<String>, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::TransferFailed, message, err)
}

pub(crate) fn invalid_input<E>(message: impl Into<String>, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, message, err)
}

pub(crate) fn not_connected() -> Error {
    Error::without_source(
        ErrorKind::NotConnected,
        "repository operations require an established connection",
    )
}

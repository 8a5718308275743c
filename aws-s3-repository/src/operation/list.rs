/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_sdk_s3::{
    error::SdkError,
    operation::list_objects_v2::{ListObjectsV2Error, ListObjectsV2Output},
};
use tracing::Instrument;

use crate::client::Handle;
use crate::error::{self, Error};
use crate::key::{ResourcePattern, DELIMITER};

/// Operation struct for listing a single directory level
#[derive(Clone, Default, Debug)]
pub(crate) struct ListDirectory;

impl ListDirectory {
    /// List the files and subdirectories directly below `directory`.
    ///
    /// Every page of a truncated listing is fetched. Any failure is reported as the
    /// directory not existing.
    pub(crate) async fn orchestrate(
        handle: Arc<Handle>,
        directory: &str,
    ) -> Result<Vec<String>, Error> {
        let span = tracing::debug_span!("list-directory", directory);
        list_directory(handle, directory).instrument(span).await
    }
}

async fn list_directory(handle: Arc<Handle>, directory: &str) -> Result<Vec<String>, Error> {
    let pattern = ResourcePattern::new(handle.key(directory));
    let mut paginator = ListPaginator::new(handle, pattern.prefix().to_owned());

    let mut resource_names = Vec::new();
    while let Some(page) = paginator.next_page().await {
        let page = page.map_err(|err| error::resource_does_not_exist(directory, err))?;
        resource_names.extend(resource_names_of(&page, &pattern));
    }

    tracing::debug!(
        directory,
        entries = resource_names.len(),
        "listed directory"
    );
    Ok(resource_names)
}

/// Subdirectories (common prefixes) first, then files, as names relative to `pattern`
fn resource_names_of(output: &ListObjectsV2Output, pattern: &ResourcePattern) -> Vec<String> {
    let directories = output
        .common_prefixes()
        .iter()
        .filter_map(|prefix| prefix.prefix());
    let files = output.contents().iter().filter_map(|object| object.key());

    directories
        .chain(files)
        .map(|key| pattern.resource_name(key).to_owned())
        .collect()
}

#[derive(Debug, PartialEq)]
enum State {
    Paginating {
        // continuation token of the next page, `None` for the first page
        next_token: Option<String>,
    },
    Done,
}

impl State {
    fn next_state(self, output: &ListObjectsV2Output) -> State {
        let is_truncated = output.is_truncated().unwrap_or(false);
        match (self, output.next_continuation_token()) {
            (State::Paginating { .. }, Some(token)) if is_truncated => State::Paginating {
                next_token: Some(token.to_owned()),
            },
            (State::Paginating { .. }, None) if is_truncated => {
                tracing::warn!("listing truncated without a continuation token; stopping");
                State::Done
            }
            _ => State::Done,
        }
    }
}

/// Paginator for `ListObjectsV2` over a single prefix with the `/` delimiter, carrying
/// the continuation token of each page into the request for the next one.
#[derive(Debug)]
struct ListPaginator {
    handle: Arc<Handle>,
    prefix: String,
    state: Option<State>,
}

impl ListPaginator {
    fn new(handle: Arc<Handle>, prefix: String) -> Self {
        Self {
            handle,
            prefix,
            state: Some(State::Paginating { next_token: None }),
        }
    }

    async fn next_page(
        &mut self,
    ) -> Option<Result<ListObjectsV2Output, SdkError<ListObjectsV2Error>>> {
        let next_token = match self.state.as_ref()? {
            State::Done => return None,
            State::Paginating { next_token } => next_token.clone(),
        };

        tracing::trace!(prefix = %self.prefix, ?next_token, "requesting listing page");
        let list_result = self
            .handle
            .client
            .list_objects_v2()
            .bucket(self.handle.bucket())
            .prefix(self.prefix.as_str())
            .delimiter(DELIMITER)
            .set_continuation_token(next_token)
            .send()
            .instrument(tracing::debug_span!("send-list-objects-v2"))
            .await;

        match list_result {
            Ok(output) => {
                let prev_state = self.state.take()?;
                self.state.replace(prev_state.next_state(&output));
                Some(Ok(output))
            }
            Err(err) => {
                self.state.replace(State::Done);
                Some(Err(err))
            }
        }
    }
}

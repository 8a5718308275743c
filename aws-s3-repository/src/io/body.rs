/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use pin_project_lite::pin_project;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

/// Size of the chunks read from the source file
const CHUNK_SIZE: usize = 64 * 1024;

pin_project! {
    /// Request body streaming `length` bytes of a file.
    ///
    /// Every chunk handed to the HTTP client is also sent to the progress channel, so only
    /// bytes the store actually pulled are reported.
    #[derive(Debug)]
    pub(crate) struct ProgressBody {
        #[pin]
        file: File,
        buffer: Vec<u8>,
        remaining: u64,
        progress: mpsc::UnboundedSender<Bytes>,
    }
}

impl ProgressBody {
    /// Stream `length` bytes of `file`. Returns the body and the receiving end of its
    /// progress channel.
    pub(crate) fn new(file: File, length: u64) -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (progress, chunks) = mpsc::unbounded_channel();
        let capacity = cmp::min(length, CHUNK_SIZE as u64) as usize;
        let body = Self {
            file,
            buffer: vec![0; capacity],
            remaining: length,
            progress,
        };
        (body, chunks)
    }
}

impl http_body_1x::Body for ProgressBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body_1x::Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        if *this.remaining == 0 {
            return Poll::Ready(None);
        }

        let len = cmp::min(*this.remaining, this.buffer.len() as u64) as usize;
        let mut buf = ReadBuf::new(&mut this.buffer[..len]);
        ready!(this.file.poll_read(cx, &mut buf))?;

        let filled = buf.filled();
        if filled.is_empty() {
            return Poll::Ready(Some(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file ended before its expected length",
            ))));
        }
        *this.remaining -= filled.len() as u64;

        let chunk = Bytes::copy_from_slice(filled);
        // nobody listens once the upload was abandoned
        let _ = this.progress.send(chunk.clone());
        Poll::Ready(Some(Ok(http_body_1x::Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> http_body_1x::SizeHint {
        http_body_1x::SizeHint::with_exact(self.remaining)
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Observer of the bytes moved by a single transfer.
///
/// `notify` is invoked once per chunk, with exactly the bytes of that chunk.
/// Closures taking `&[u8]` implement this trait.
pub trait TransferProgress: Send {
    /// Called after `buffer` has been read from the source or written to the destination
    fn notify(&mut self, buffer: &[u8]);
}

impl<F> TransferProgress for F
where
    F: FnMut(&[u8]) + Send,
{
    fn notify(&mut self, buffer: &[u8]) {
        self(buffer)
    }
}

pin_project! {
    /// Wraps an [`AsyncRead`] and reports every chunk read to a [`TransferProgress`]
    pub struct ProgressReader<'a, R> {
        #[pin]
        inner: R,
        progress: &'a mut dyn TransferProgress,
    }
}

impl<'a, R> ProgressReader<'a, R> {
    /// Wrap `inner`, reporting to `progress`
    pub fn new(inner: R, progress: &'a mut dyn TransferProgress) -> Self {
        Self { inner, progress }
    }

    /// Consume the adapter, returning the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead> AsyncRead for ProgressReader<'_, R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let filled = buf.filled().len();
        ready!(this.inner.poll_read(cx, buf))?;

        let chunk = &buf.filled()[filled..];
        if !chunk.is_empty() {
            this.progress.notify(chunk);
        }
        Poll::Ready(Ok(()))
    }
}

impl<R: fmt::Debug> fmt::Debug for ProgressReader<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReader")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

pin_project! {
    /// Wraps an [`AsyncWrite`] and reports every chunk written to a [`TransferProgress`]
    pub struct ProgressWriter<'a, W> {
        #[pin]
        inner: W,
        progress: &'a mut dyn TransferProgress,
    }
}

impl<'a, W> ProgressWriter<'a, W> {
    /// Wrap `inner`, reporting to `progress`
    pub fn new(inner: W, progress: &'a mut dyn TransferProgress) -> Self {
        Self { inner, progress }
    }

    /// Consume the adapter, returning the wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite> AsyncWrite for ProgressWriter<'_, W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let written = ready!(this.inner.poll_write(cx, buf))?;
        if written > 0 {
            this.progress.notify(&buf[..written]);
        }
        Poll::Ready(Ok(written))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

impl<W: fmt::Debug> fmt::Debug for ProgressWriter<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressWriter")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressReader, ProgressWriter};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_reader_notifies_each_chunk() {
        let mock = Builder::new().read(b"hello").read(b" world").build();
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut sink = |buffer: &[u8]| chunks.push(buffer.to_vec());

        let mut data = Vec::new();
        let mut reader = ProgressReader::new(mock, &mut sink);
        reader.read_to_end(&mut data).await.unwrap();
        drop(reader);

        assert_eq!(b"hello world".to_vec(), data);
        assert_eq!(vec![b"hello".to_vec(), b" world".to_vec()], chunks);
    }

    #[tokio::test]
    async fn test_reader_skips_eof() {
        let mock = Builder::new().build();
        let mut calls = 0;
        let mut sink = |_: &[u8]| calls += 1;

        let mut data = Vec::new();
        let mut reader = ProgressReader::new(mock, &mut sink);
        reader.read_to_end(&mut data).await.unwrap();
        drop(reader);

        assert!(data.is_empty());
        assert_eq!(0, calls);
    }

    #[tokio::test]
    async fn test_writer_notifies_each_chunk() {
        let mock = Builder::new().write(b"every ").write(b"dog").build();
        let mut total = 0;
        let mut lengths = Vec::new();
        let mut sink = |buffer: &[u8]| {
            total += buffer.len();
            lengths.push(buffer.len());
        };

        let mut writer = ProgressWriter::new(mock, &mut sink);
        writer.write_all(b"every ").await.unwrap();
        writer.write_all(b"dog").await.unwrap();
        writer.flush().await.unwrap();
        drop(writer);

        assert_eq!(9, total);
        assert_eq!(vec![6, 3], lengths);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SinkError;

/// A borrowed async sink
pub type Sink<'a> = &'a mut (dyn AsyncWrite + Unpin + Send);

/// Writes every chunk to several sinks in order
///
/// Each chunk is attempted on every sink even after one of them fails, and
/// the call fails as a whole if any sink failed. The reported error is the
/// one from the first failing sink.
#[derive(Default)]
pub struct FanOut<'a> {
    sinks: Vec<Sink<'a>>,
}

impl<'a> FanOut<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink, returning the writer for chaining
    pub fn with(mut self, sink: Sink<'a>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Sink<'a>) {
        self.sinks.push(sink);
    }

    /// Write the whole chunk to every sink
    pub async fn write_all(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        let mut first_error = None;

        for (index, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(source) = sink.write_all(chunk).await {
                first_error.get_or_insert(SinkError { index, source });
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Flush every sink
    pub async fn flush(&mut self) -> Result<(), SinkError> {
        let mut first_error = None;

        for (index, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(source) = sink.flush().await {
                first_error.get_or_insert(SinkError { index, source });
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct BrokenSink;

    impl AsyncWrite for BrokenSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::other("disk full")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn mirrors_chunks_to_all_sinks() {
        let mut first = Vec::new();
        let mut second = Vec::new();

        {
            let mut out = FanOut::new().with(&mut first).with(&mut second);
            out.write_all(b"hello ").await.unwrap();
            out.write_all(b"world").await.unwrap();
            out.flush().await.unwrap();
        }

        assert_eq!(first, b"hello world");
        assert_eq!(second, b"hello world");
    }

    #[tokio::test]
    async fn failure_on_one_sink_fails_the_write() {
        let mut broken = BrokenSink;
        let mut healthy = Vec::new();

        let err = {
            let mut out = FanOut::new().with(&mut broken).with(&mut healthy);
            out.write_all(b"chunk").await.unwrap_err()
        };

        assert_eq!(err.index, 0);
        // the remaining sink was still attempted
        assert_eq!(healthy, b"chunk");
    }

    #[tokio::test]
    async fn reports_first_failing_sink() {
        let mut healthy = Vec::new();
        let mut broken = BrokenSink;

        let mut out = FanOut::new().with(&mut healthy).with(&mut broken);
        let err = out.write_all(b"chunk").await.unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[tokio::test]
    async fn empty_fan_out_accepts_writes() {
        let mut out = FanOut::new();
        out.write_all(b"nowhere").await.unwrap();
    }
}

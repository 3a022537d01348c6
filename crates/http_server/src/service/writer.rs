use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::AsyncWrite;

/// The byte sink handed to a [`Handler`](super::Handler).
///
/// Writes land in the connection's output buffer and are not guaranteed to reach the peer
/// until the handler returns. The writer borrows the connection, so it cannot escape the call.
pub struct ResponseWriter<'a> {
    inner: &'a mut (dyn AsyncWrite + Unpin + Send),
    written: u64,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(inner: &'a mut (dyn AsyncWrite + Unpin + Send)) -> Self {
        Self { inner, written: 0 }
    }

    /// Total bytes accepted so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl AsyncWrite for ResponseWriter<'_> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = &mut *self;
        let poll = Pin::new(&mut *this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            this.written += n as u64;
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.inner).poll_flush(cx)
    }

    /// Shutting down is the connection's job, this only flushes
    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.inner).poll_flush(cx)
    }
}

impl std::fmt::Debug for ResponseWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncWriteExt, BufWriter};

    use super::*;

    #[tokio::test]
    async fn writes_into_the_borrowed_buffer() {
        let mut out = BufWriter::new(Vec::new());
        {
            let mut w = ResponseWriter::new(&mut out);
            w.write_all(b"HTTP/1.1 200 OK\r\n").await.unwrap();
            let n = w.write(b"\r\n").await.unwrap();
            assert_eq!(n, 2);
            assert_eq!(w.written(), 19);
            w.shutdown().await.unwrap();
        }
        assert_eq!(out.get_ref().as_slice(), b"HTTP/1.1 200 OK\r\n\r\n");
    }
}

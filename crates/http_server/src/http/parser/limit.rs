use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A byte source which refuses to hand out more than `remaining` bytes.
///
/// Once the budget reaches zero every read fails with [`io::ErrorKind::QuotaExceeded`]
/// instead of blocking on the peer, which bounds how much a single header block may buffer.
#[derive(Debug)]
pub struct LimitedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R> LimitedReader<R> {
    /// Effectively no limit, used once the header block has been consumed.
    pub const UNLIMITED: u64 = u64::MAX;

    pub fn new(inner: R, remaining: u64) -> Self {
        Self { inner, remaining }
    }

    pub fn set_remaining(&mut self, remaining: u64) {
        self.remaining = remaining;
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R> LimitedReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Reads at most `remaining` bytes into `buf`, returning how many were appended.
    ///
    /// `Ok(0)` means the underlying source reached end of stream.
    pub async fn read_buf(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(
                io::ErrorKind::QuotaExceeded,
                "read size limit exceeded",
            ));
        }
        let n = (&mut self.inner).take(self.remaining).read_buf(buf).await?;
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(n)
    }
}

pub mod header;
pub mod method;
pub mod request;
pub mod uri;

pub mod parser;

mod version;
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};
pub use version::{HttpVersion, ParseHttpVersionError};

/// The body of a request.
///
/// Message bodies are not framed yet, so every body is already at end of stream and whatever
/// follows the header block is read as the next request.
#[derive(Debug, Clone, Default)]
pub struct Body {
    _priv: (),
}

impl Body {
    pub const fn empty() -> Self {
        Self { _priv: () }
    }
}

impl AsyncRead for Body {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn body_is_always_exhausted() {
        let mut body = Body::empty();
        let mut buf = Vec::new();
        assert_eq!(body.read_to_end(&mut buf).await.unwrap(), 0);
        assert_eq!(body.read(&mut [0u8; 8]).await.unwrap(), 0);
    }
}

use bytes::{Buf, Bytes};
use tokio::{io::AsyncRead, sync::mpsc};

/// An [`AsyncRead`] fed by a channel of byte chunks.
///
/// A single read never returns more than what is left of the current chunk, so chunk
/// boundaries show up as fragmented reads on the consumer side.
pub struct ChannelReader {
    rx: mpsc::UnboundedReceiver<Bytes>,
    current: Bytes,
}

impl ChannelReader {
    pub fn new(rx: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self {
            rx,
            current: Bytes::new(),
        }
    }

    /// A reader which yields `chunks` one by one and then reports end of stream
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in chunks {
            // The receiver is alive, sending cannot fail
            let _ = tx.send(chunk);
        }
        Self::new(rx)
    }
}

impl AsyncRead for ChannelReader {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        use std::task::Poll;
        while self.current.is_empty() {
            match self.rx.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => self.current = chunk,
                // sender dropped, end of stream
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let n = self.current.len().min(buf.remaining());
        buf.put_slice(&self.current[..n]);
        self.current.advance(n);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    const LINE: &[u8] = b"GET / HTTP/1.1\r\nHost: test\r\n\r\n";

    #[tokio::test]
    async fn test_channel_reader_fragments() {
        let mut reader = ChannelReader::from_chunks(
            LINE.chunks(5).map(Bytes::copy_from_slice),
        );
        let mut buf = [0u8; 64];

        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"GET /");

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, &LINE[5..]);
    }

    #[tokio::test]
    async fn test_channel_reader_with_sender() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut reader = ChannelReader::new(rx);

        tokio::spawn(async move {
            for byte in LINE {
                tx.send(Bytes::copy_from_slice(&[*byte])).unwrap();
                tokio::task::yield_now().await;
            }
        });

        let mut buf = [0u8; LINE.len()];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, LINE);
    }
}

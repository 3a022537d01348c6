use std::io;

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use tokio::io::AsyncRead;

use super::limit::LimitedReader;

/// Splits a byte stream into CRLF or LF terminated lines.
///
/// Lines which arrive across several reads are reassembled in `buf`; bytes after the last
/// returned line stay buffered for the next call, so nothing belonging to the next message is
/// lost between requests.
pub(crate) struct LineReader<R> {
    source: LimitedReader<R>,
    buf: BytesMut,
    /// How far into `buf` we already searched for a newline
    scanned: usize,
    read_size: usize,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(source: LimitedReader<R>, read_size: usize) -> Self {
        Self {
            source,
            buf: BytesMut::with_capacity(read_size),
            scanned: 0,
            read_size,
        }
    }

    pub fn source_mut(&mut self) -> &mut LimitedReader<R> {
        &mut self.source
    }

    /// Returns the next line without its terminator.
    ///
    /// `Ok(None)` means the source ended cleanly before the first byte of a line. A source
    /// which ends in the middle of a line yields [`io::ErrorKind::UnexpectedEof`].
    pub async fn read_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }

            self.buf.reserve(self.read_size);
            if self.source.read_buf(&mut self.buf).await? == 0 {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream ended in the middle of a line",
                    ))
                };
            }
        }
    }

    fn take_line(&mut self) -> Option<Bytes> {
        let Some(nl_rel) = memchr(b'\n', &self.buf[self.scanned..]) else {
            self.scanned = self.buf.len();
            return None;
        };
        let nl = self.scanned + nl_rel;
        self.scanned = 0;

        let mut line = self.buf.split_to(nl + 1);
        line.truncate(nl);
        if line.last() == Some(&b'\r') {
            line.truncate(nl - 1);
        }
        Some(line.freeze())
    }

    /// Bytes read from the source but not returned as a line yet.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use ember_http_test_suite::ChannelReader;

    use super::*;

    fn reader_from(data: &'static [u8]) -> LineReader<&'static [u8]> {
        LineReader::new(LimitedReader::new(data, LimitedReader::<&[u8]>::UNLIMITED), 16)
    }

    #[tokio::test]
    async fn strips_crlf_and_lf() {
        let mut reader = reader_from(b"GET / HTTP/1.1\r\nHost: a\n\r\n");
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(&b"GET / HTTP/1.1"[..])
        );
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(&b"Host: a"[..])
        );
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(&b""[..]));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reassembles_fragmented_lines() {
        let chunks = [
            &b"GE"[..],
            b"T /ind",
            b"ex.html HTTP/1.",
            b"1\r",
            b"\nUser-Agent: frag",
            b"mented\r\n\r\n",
        ];
        let source = ChannelReader::from_chunks(chunks.iter().map(|c| Bytes::from_static(c)));
        let mut reader = LineReader::new(LimitedReader::new(source, 1 << 20), 4);

        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(&b"GET /index.html HTTP/1.1"[..])
        );
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(&b"User-Agent: fragmented"[..])
        );
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(&b""[..]));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn leaves_following_bytes_buffered() {
        let mut reader = reader_from(b"first\r\nsecond");
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(&b"first"[..])
        );
        assert_eq!(reader.buffered(), b"second");
    }

    #[tokio::test]
    async fn partial_line_at_eof_is_an_error() {
        let mut reader = reader_from(b"no terminator");
        let err = reader.read_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn unterminated_line_hits_the_limit() {
        let data: &'static [u8] = b"an endless line without any newline in it";
        let mut reader = LineReader::new(LimitedReader::new(data, 8), 4);
        let err = reader.read_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::QuotaExceeded);
    }
}

use std::{io, net::SocketAddr};

use bytes::Bytes;
use memchr::memchr;
use tokio::io::AsyncRead;

use crate::http::{
    header::{HeaderMap, HeaderName, HeaderValue},
    request::{Request, RequestLine},
};

mod error;
pub mod limit;
mod reader;
pub use error::*;
use limit::LimitedReader;
use reader::LineReader;

pub type HttpParseResult<T> = Result<T, HttpParseError>;

/// Parses one header field line.
/// SPEC: RFC 9112 5 Field Syntax
/// ABNF: field-line = field-name ":" OWS field-value OWS
///
/// The name is everything before the first colon, untrimmed. A line whose colon is its last
/// byte contributes nothing and yields `Ok(None)`.
pub fn parse_header_line(line: &Bytes) -> Result<Option<(HeaderName, HeaderValue)>, ParseErrorKind> {
    let colon = memchr(b':', line).ok_or(ParseErrorKind::MalformedHeaderLine)?;
    if colon == line.len() - 1 {
        return Ok(None);
    }
    let name = HeaderName::from(&line[..colon]);
    let value = line.slice_ref(line[colon + 1..].trim_ascii());
    Ok(Some((name, HeaderValue::from_bytes(value))))
}

/// Reads request heads off a byte stream, one at a time.
///
/// Each head is read under a fresh size ceiling of `max_header_bytes`, the ceiling is lifted
/// once the head is complete.
pub struct Parser<R> {
    reader: LineReader<R>,
    max_header_bytes: u64,
    line_cnt: usize,
}

impl<R> Parser<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R, max_header_bytes: u64, read_buffer_size: usize) -> Self {
        Self {
            reader: LineReader::new(
                LimitedReader::new(reader, max_header_bytes),
                read_buffer_size,
            ),
            max_header_bytes,
            line_cnt: 0,
        }
    }

    /// Reads the next request head.
    ///
    /// Returns `Ok(None)` if the stream ended before the first byte of a new request, which is
    /// how a peer closes a keep-alive connection.
    pub async fn parse_request(&mut self, remote: SocketAddr) -> HttpParseResult<Option<Request>> {
        // Parses an HTTP Request head
        // SPEC: RFC 9112 - 2.1 Message Format
        // ABNF:
        //  HTTP-message = start-line CRLF *( field-line CRLF ) CRLF [ message-body ]
        self.reader.source_mut().set_remaining(self.max_header_bytes);
        self.line_cnt = 0;

        let Some(line) = self.next_line(Location::StartLine).await? else {
            return Ok(None);
        };
        let request_line = RequestLine::parse(&line)?;
        log::trace!(
            "{} {} {}",
            request_line.method,
            request_line.target,
            request_line.protocol
        );

        let headers = self.read_headers().await?;

        // The body is not read, lift the ceiling until the next head starts
        self.reader
            .source_mut()
            .set_remaining(LimitedReader::<R>::UNLIMITED);

        Ok(Some(Request::new(request_line, headers, remote)))
    }

    /// Reads header lines up to and including the empty line which ends the block.
    pub async fn read_headers(&mut self) -> HttpParseResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        loop {
            let line = self
                .next_line(Location::Headers)
                .await?
                .ok_or_else(|| {
                    HttpParseError::new(
                        ParseErrorKind::IncompleteMessage,
                        Location::Headers,
                        self.line_cnt,
                    )
                })?;
            if line.is_empty() {
                return Ok(headers);
            }

            let field = parse_header_line(&line)
                .map_err(|kind| HttpParseError::new(kind, Location::Headers, self.line_cnt))?;
            if let Some((name, value)) = field {
                headers.append(name, value);
            }
        }
    }

    async fn next_line(&mut self, location: Location) -> HttpParseResult<Option<Bytes>> {
        self.line_cnt += 1;
        self.reader
            .read_line()
            .await
            .map_err(|err: io::Error| {
                HttpParseError::from_io(err, location, self.line_cnt, self.max_header_bytes)
            })
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> &[u8] {
        self.reader.buffered()
    }
}

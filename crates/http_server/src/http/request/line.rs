use bytes::Bytes;

use crate::http::{
    method::Method,
    parser::{HttpParseError, HttpParseResult, Location, ParseErrorKind},
    uri::RequestTarget,
};

/// The first line of a request
/// SPEC: RFC 9112 3 Request Line
/// ABNF: request-line = method SP request-target SP HTTP-version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// The request target exactly as received
    pub target: String,
    pub uri: RequestTarget,
    /// The protocol token, e.g. `HTTP/1.1`. Not validated here
    pub protocol: String,
}

impl RequestLine {
    /// Parses a request line with its terminator already removed.
    ///
    /// The line must hold exactly three whitespace separated tokens, and the target must be an
    /// absolute path or absolute URI. No token is rejected for its encoding.
    pub fn parse(line: &Bytes) -> HttpParseResult<Self> {
        #[inline]
        fn make_err(kind: ParseErrorKind) -> HttpParseError {
            HttpParseError::new(kind, Location::StartLine, 1)
        }

        let mut words = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|word| !word.is_empty());
        let (Some(method), Some(target), Some(protocol), None) =
            (words.next(), words.next(), words.next(), words.next())
        else {
            return Err(make_err(ParseErrorKind::MalformedRequestLine));
        };

        let method = Method::try_from(line.slice_ref(method))
            .map_err(|_| make_err(ParseErrorKind::InvalidMethod))?;
        // Bytes outside UTF-8 are carried as U+FFFD rather than failing the request
        let target = String::from_utf8_lossy(target).into_owned();
        let uri = RequestTarget::parse(&target)
            .map_err(|err| make_err(ParseErrorKind::InvalidTarget(err)))?;
        let protocol = String::from_utf8_lossy(protocol).into_owned();

        Ok(Self {
            method,
            target,
            uri,
            protocol,
        })
    }
}

use std::{fmt::Display, io};

use crate::http::uri::MalformedUriError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    StartLine,
    Headers,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StartLine => "start line",
            Self::Headers => "headers",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    HeaderBytesTotal,
}

impl Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::HeaderBytesTotal => "header bytes",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    // Syntax/tokenization
    InvalidMethod,
    InvalidTarget(MalformedUriError),
    MalformedRequestLine, // not exactly three tokens
    MalformedHeaderLine,  // no colon

    // Limits
    TooLarge { what: LimitKind, limit: u64 },

    // Flow / I/O
    IncompleteMessage, // ran out before the terminating empty line
    Io(io::ErrorKind),
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMethod => f.write_str("invalid method"),
            Self::InvalidTarget(err) => write!(f, "invalid target: {}", err),
            Self::MalformedRequestLine => f.write_str("malformed request line"),
            Self::MalformedHeaderLine => f.write_str("malformed header line"),
            Self::TooLarge { what, limit } => {
                write!(f, "limit on {} exceeded (limit: {})", what, limit)
            }
            Self::IncompleteMessage => f.write_str("incomplete message"),
            Self::Io(err) => Display::fmt(&err, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    /// 1-based index of the line (request line is line 1) where we noticed the error.
    pub line: Option<usize>,
}

impl Display for HttpParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "http parse error: {} while parsing {}",
            self.kind, self.location
        )?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::InvalidTarget(err) => Some(err),
            _ => None,
        }
    }
}

impl HttpParseError {
    pub fn new(kind: ParseErrorKind, location: Location, line: usize) -> Self {
        Self {
            kind,
            location,
            line: Some(line),
        }
    }

    /// Classifies an error coming out of the line reader.
    ///
    /// `limit` is the size ceiling that was in force for the read.
    pub(crate) fn from_io(err: io::Error, location: Location, line: usize, limit: u64) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::UnexpectedEof => ParseErrorKind::IncompleteMessage,
            io::ErrorKind::QuotaExceeded => ParseErrorKind::TooLarge {
                what: LimitKind::HeaderBytesTotal,
                limit,
            },
            other => ParseErrorKind::Io(other),
        };
        Self::new(kind, location, line)
    }

    /// Whether the error was caused by the size ceiling rather than the bytes themselves.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self.kind, ParseErrorKind::TooLarge { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_and_line() {
        let err = HttpParseError::new(ParseErrorKind::MalformedHeaderLine, Location::Headers, 3);
        assert_eq!(
            err.to_string(),
            "http parse error: malformed header line while parsing headers (line 3)"
        );
    }

    #[test]
    fn io_errors_are_classified() {
        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        let err = HttpParseError::from_io(eof, Location::Headers, 2, 64);
        assert_eq!(err.kind, ParseErrorKind::IncompleteMessage);

        let quota = io::Error::from(io::ErrorKind::QuotaExceeded);
        let err = HttpParseError::from_io(quota, Location::StartLine, 1, 64);
        assert!(err.is_limit_exceeded());
        assert_eq!(
            err.kind,
            ParseErrorKind::TooLarge {
                what: LimitKind::HeaderBytesTotal,
                limit: 64
            }
        );

        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        let err = HttpParseError::from_io(reset, Location::Headers, 4, 64);
        assert_eq!(err.kind, ParseErrorKind::Io(io::ErrorKind::ConnectionReset));
    }
}

use std::{
    borrow::Cow,
    fmt::{Debug, Display},
};

use bytes::Bytes;

/// An HTTP Method
/// SPEC: Defined in RFC9112 3.1
/// ABNF: method = token
///
/// Methods outside the builtin set are kept as-is, so new methods pass through untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct Method(Repr);

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid method token")]
pub struct InvalidMethod;

impl TryFrom<Bytes> for Method {
    type Error = InvalidMethod;

    /// Only an empty token is rejected. Bytes which are not UTF-8 are replaced with U+FFFD.
    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidMethod);
        }
        let builtin = match String::from_utf8_lossy(&value) {
            Cow::Borrowed(s) => Builtin::from_str(s),
            Cow::Owned(replaced) => return Ok(Method(Repr::Custom(Bytes::from(replaced)))),
        };
        Ok(match builtin {
            Some(builtin) => Method(Repr::Builtin(builtin)),
            None => Method(Repr::Custom(value)),
        })
    }
}

impl Method {
    pub const GET: Self = Self(Repr::Builtin(Builtin::GET));
    pub const POST: Self = Self(Repr::Builtin(Builtin::POST));
    pub const PUT: Self = Self(Repr::Builtin(Builtin::PUT));
    pub const DELETE: Self = Self(Repr::Builtin(Builtin::DELETE));
    pub const PATCH: Self = Self(Repr::Builtin(Builtin::PATCH));
    pub const OPTIONS: Self = Self(Repr::Builtin(Builtin::OPTIONS));
    pub const CONNECT: Self = Self(Repr::Builtin(Builtin::CONNECT));
    pub const TRACE: Self = Self(Repr::Builtin(Builtin::TRACE));
    pub const HEAD: Self = Self(Repr::Builtin(Builtin::HEAD));

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Builtin(builtin) => builtin.as_str(),
            // Custom methods always hold UTF-8, invalid bytes were replaced on construction
            Repr::Custom(custom) => std::str::from_utf8(custom).unwrap_or_default(),
        }
    }
}

impl PartialEq<str> for Method {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Method {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Builtin(Builtin),
    Custom(Bytes),
}

// It should be possible for rust to optimize it to 24 bits, we check that it is the case
static_assertions::assert_eq_size!(Repr, Bytes);

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
    HEAD,
}

impl Builtin {
    fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "GET" => Self::GET,
            "POST" => Self::POST,
            "PUT" => Self::PUT,
            "DELETE" => Self::DELETE,
            "PATCH" => Self::PATCH,
            "OPTIONS" => Self::OPTIONS,
            "CONNECT" => Self::CONNECT,
            "TRACE" => Self::TRACE,
            "HEAD" => Self::HEAD,
            _ => return None,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::PATCH => "PATCH",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
            Self::HEAD => "HEAD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_and_custom_methods() {
        let get = Method::try_from(Bytes::from_static(b"GET")).unwrap();
        assert_eq!(get, Method::GET);
        assert_eq!(get.to_string(), "GET");

        let purge = Method::try_from(Bytes::from_static(b"PURGE")).unwrap();
        assert_eq!(purge, "PURGE");
        assert_eq!(format!("{:?}", purge), "\"PURGE\"");

        // methods are case-sensitive
        assert_ne!(Method::try_from(Bytes::from_static(b"get")).unwrap(), Method::GET);
    }

    #[test]
    fn only_empty_tokens_are_rejected() {
        assert_eq!(Method::try_from(Bytes::new()), Err(InvalidMethod));
        let raw = Method::try_from(Bytes::from_static(b"G\xffT")).unwrap();
        assert_eq!(raw, "G\u{fffd}T");
    }
}

mod map;
use std::fmt;

use bytes::Bytes;
pub use map::*;
use smallvec::SmallVec;
use unicase::Ascii;

/// A header field name, kept exactly as it appeared on the wire.
///
/// Equality through [`HeaderName::matches`] is ASCII case-insensitive, `==` is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderName(String);

impl HeaderName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, as HTTP field names are compared
    pub fn matches(&self, name: &str) -> bool {
        Ascii::new(self.as_str()) == Ascii::new(name)
    }
}

/// Bytes which are not UTF-8 are replaced with U+FFFD, the name itself is never rejected.
impl From<&[u8]> for HeaderName {
    fn from(value: &[u8]) -> Self {
        Self(String::from_utf8_lossy(value).into_owned())
    }
}

impl From<&str> for HeaderName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single header field value with surrounding whitespace already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderValue(Bytes);

impl HeaderValue {
    pub fn from_bytes(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub const fn from_static(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Views the value as text, `None` if the bytes are not UTF-8
    pub fn to_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

/// All values received for one header name, in arrival order
#[derive(Debug, Clone, Default)]
pub struct HeaderValues {
    values: SmallVec<[HeaderValue; 1]>,
}

impl HeaderValues {
    pub fn new() -> Self {
        Self {
            values: SmallVec::new(),
        }
    }

    pub fn push(&mut self, value: HeaderValue) {
        self.values.push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderValue> {
        self.values.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderValues {
    type Item = &'a HeaderValue;
    type IntoIter = std::slice::Iter<'a, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matching_ignores_case() {
        let name = HeaderName::from("User-Agent");
        assert!(name.matches("user-agent"));
        assert!(name.matches("USER-AGENT"));
        assert!(!name.matches("User-Agen"));
        assert_ne!(name, HeaderName::from("user-agent"));
    }

    #[test]
    fn name_from_raw_bytes() {
        assert_eq!(HeaderName::from(&b"X-\xff"[..]).as_str(), "X-\u{fffd}");
        assert_eq!(HeaderName::from(&b"X-Name "[..]).as_str(), "X-Name ");
    }

    #[test]
    fn value_as_text() {
        assert_eq!(HeaderValue::from_static("text/html; q=1").to_utf8(), Some("text/html; q=1"));
        let raw = HeaderValue::from_bytes(Bytes::from_static(b"caf\xc3\xa9"));
        assert_eq!(raw.to_utf8(), Some("café"));
        assert_eq!(raw.as_bytes(), b"caf\xc3\xa9");

        let binary = HeaderValue::from_bytes(Bytes::from_static(b"\xff\xfe"));
        assert_eq!(binary.to_utf8(), None);
    }
}

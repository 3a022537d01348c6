use std::{
    fmt,
    net::{AddrParseError, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedUriError {
    #[error("empty request target")]
    Empty,
    #[error("invalid control character in request target")]
    ControlCharacter,
    #[error("missing protocol scheme")]
    MissingScheme,
    #[error("request target is neither an absolute path nor an absolute URI")]
    NotAbsolute,
    #[error("invalid IPv6 address")]
    InvalidAddress(#[from] AddrParseError),
    #[error("invalid host")]
    InvalidHost,
    #[error("invalid port")]
    InvalidPort,
    #[error(transparent)]
    InvalidEscape(#[from] UrlDecodeError),
}

/// A Target for a HTTP Request
/// SPEC: RFC 9112 - 3.2. Request Target
/// ABNF: request-target = origin-form / absolute-form / authority-form / asterisk-form
///
/// Authority-form (`host:port`) has no leading slash and is read like any other absolute URI,
/// with `host` as the scheme and `port` as opaque data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// An Origin request as an URI
    Origin(OriginForm),
    /// An absolute URL
    Absolute(AbsoluteForm),
    /// Asterisk Form of a Request Target
    /// SPEC: RFC 9112 - 3.2.4. asterisk-form
    /// ABNF: asterisk-form = "*"
    Asterisk,
}

impl RequestTarget {
    pub fn parse(s: &str) -> Result<Self, MalformedUriError> {
        if s.is_empty() {
            return Err(MalformedUriError::Empty);
        }
        if s.bytes().any(|b| b < 0x20 || b == 0x7f) {
            return Err(MalformedUriError::ControlCharacter);
        }
        if s == "*" {
            return Ok(Self::Asterisk);
        }

        let (scheme, rest) = split_scheme(s)?;
        let (rest, raw_query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query.to_owned())),
            None => (rest, None),
        };

        let Some(scheme) = scheme else {
            if !rest.starts_with('/') {
                return Err(MalformedUriError::NotAbsolute);
            }
            // Without a scheme a leading "//" is still part of the path
            return Ok(Self::Origin(OriginForm {
                path: url_decode(rest.as_bytes())?,
                raw_query,
            }));
        };
        let scheme = scheme.to_ascii_lowercase();

        if !rest.starts_with('/') {
            return Ok(Self::Absolute(AbsoluteForm {
                scheme,
                authority: None,
                opaque: Some(rest.to_owned()),
                path: String::new(),
                raw_query,
            }));
        }

        let (authority, path) = match rest.strip_prefix("//") {
            Some(rest) => {
                let end = rest.find('/').unwrap_or(rest.len());
                (Some(rest[..end].parse()?), &rest[end..])
            }
            None => (None, rest),
        };

        Ok(Self::Absolute(AbsoluteForm {
            scheme,
            authority,
            opaque: None,
            path: url_decode(path.as_bytes())?,
            raw_query,
        }))
    }

    /// The decoded path, `*` for the asterisk form
    pub fn path(&self) -> &str {
        match self {
            Self::Origin(origin) => &origin.path,
            Self::Absolute(absolute) => &absolute.path,
            Self::Asterisk => "*",
        }
    }

    /// The query exactly as received, without the leading `?`
    pub fn raw_query(&self) -> Option<&str> {
        match self {
            Self::Origin(origin) => origin.raw_query.as_deref(),
            Self::Absolute(absolute) => absolute.raw_query.as_deref(),
            Self::Asterisk => None,
        }
    }
}

/// Splits off `scheme ":"` if `s` starts with one.
/// ABNF: scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn split_scheme(s: &str) -> Result<(Option<&str>, &str), MalformedUriError> {
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
            b':' if i == 0 => return Err(MalformedUriError::MissingScheme),
            b':' => return Ok((Some(&s[..i]), &s[i + 1..])),
            _ => break,
        }
    }
    Ok((None, s))
}

/// Origin Form for a Request Target
/// SPEC: RFC 9112 - 3.2.1. origin-form
/// ABNF: origin-form = absolute-path [ "?" query ]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginForm {
    pub path: String,
    pub raw_query: Option<String>,
}

/// Absolute Form of a Request Target
/// SPEC: RFC 9112 - 3.2.2. absolute-form
/// ABNF: absolute-form  = absolute-URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsoluteForm {
    /// Lowercased scheme
    pub scheme: String,
    pub authority: Option<Authority>,
    /// Everything after `scheme:` when it does not start with a slash
    pub opaque: Option<String>,
    pub path: String,
    pub raw_query: Option<String>,
}

/// ABNF: authority = [ userinfo "@" ] host [ ":" port ]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub userinfo: Option<String>,
    pub host: UriHost,
    pub port: Option<UriPort>,
}

impl FromStr for Authority {
    type Err = MalformedUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (userinfo, hostport) = match s.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo.to_owned()), hostport),
            None => (None, s),
        };

        // An IP literal may itself contain colons, so the port is only searched after `]`
        let port_search_start = if hostport.starts_with('[') {
            hostport.find(']').ok_or(MalformedUriError::InvalidHost)?
        } else {
            0
        };
        let (host, port) = match hostport[port_search_start..].rfind(':') {
            Some(idx) => {
                let idx = port_search_start + idx;
                (&hostport[..idx], &hostport[idx + 1..])
            }
            None => (hostport, ""),
        };

        let port = if port.is_empty() {
            None
        } else if port.bytes().all(|b| b.is_ascii_digit()) {
            Some(port.parse().map_err(|_| MalformedUriError::InvalidPort)?)
        } else {
            return Err(MalformedUriError::InvalidPort);
        };

        Ok(Self {
            userinfo,
            host: host.parse()?,
            port,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpLiteral {
    Ipv6(Ipv6Addr),
    IpvFuture(IpvFuture),
}

impl IpLiteral {
    fn from_str(s: &str) -> Result<Option<Self>, MalformedUriError> {
        if !s.starts_with('[') || !s.ends_with(']') {
            return Ok(None);
        }
        let s = &s[1..s.len() - 1];
        Ok(Some(match s.strip_prefix('v') {
            Some(future) => Self::IpvFuture(future.parse()?),
            None => Self::Ipv6(s.parse()?),
        }))
    }
}

/// ABNF: IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpvFuture {
    pub version: u32,
    pub content: String,
}

impl FromStr for IpvFuture {
    type Err = MalformedUriError;

    /// Parses what follows the `v`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, content) = s.split_once('.').ok_or(MalformedUriError::InvalidHost)?;
        if content.is_empty() || !content.is_ascii() {
            return Err(MalformedUriError::InvalidHost);
        }
        let version =
            u32::from_str_radix(version, 16).map_err(|_| MalformedUriError::InvalidHost)?;
        Ok(Self {
            version,
            content: content.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriHost {
    IpLiteral(IpLiteral),
    Ipv4(Ipv4Addr),
    RegName(String),
}

impl FromStr for UriHost {
    type Err = MalformedUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(addr) = IpLiteral::from_str(s)? {
            return Ok(Self::IpLiteral(addr));
        }

        if let Ok(ipv4) = Ipv4Addr::from_str(s) {
            Ok(Self::Ipv4(ipv4))
        } else if s.is_ascii() {
            Ok(Self::RegName(s.to_owned()))
        } else {
            Err(MalformedUriError::InvalidHost)
        }
    }
}

impl fmt::Display for UriHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpLiteral(IpLiteral::Ipv6(addr)) => write!(f, "[{}]", addr),
            Self::IpLiteral(IpLiteral::IpvFuture(future)) => {
                write!(f, "[v{:x}.{}]", future.version, future.content)
            }
            Self::Ipv4(addr) => fmt::Display::fmt(addr, f),
            Self::RegName(name) => f.write_str(name),
        }
    }
}

pub type UriPort = u16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlDecodeError {
    #[error("malformed encoding")]
    MalformedEncoding, // e.g., `%G1`, `%A`
}

/// Percent-decodes `input`. `+` is left alone, that is a form encoding rule only.
///
/// Only the escapes themselves are validated. Decoded bytes which are not UTF-8 are replaced
/// with U+FFFD.
pub fn url_decode(input: &[u8]) -> Result<String, UrlDecodeError> {
    let mut decoded = Vec::with_capacity(input.len());

    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'%' => {
                if i + 2 >= input.len() {
                    return Err(UrlDecodeError::MalformedEncoding);
                }
                decoded.push(parse_hex_byte(&input[i + 1..i + 3])?);
                i += 3;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    Ok(match String::from_utf8(decoded) {
        Ok(decoded) => decoded,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

fn parse_hex_byte(hex_slice: &[u8]) -> Result<u8, UrlDecodeError> {
    let high = hex_to_digit(hex_slice[0])?;
    let low = hex_to_digit(hex_slice[1])?;
    Ok((high << 4) | low)
}

fn hex_to_digit(c: u8) -> Result<u8, UrlDecodeError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(UrlDecodeError::MalformedEncoding),
    }
}

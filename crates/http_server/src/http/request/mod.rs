use std::{collections::HashMap, net::SocketAddr, sync::OnceLock};

mod line;
pub mod params;
pub use line::*;

use crate::http::{
    Body, HttpVersion,
    header::{HeaderMap, HeaderValue},
    method::Method,
    uri::RequestTarget,
};

/// A parsed request head.
///
/// Only built once both the request line and the header block parsed successfully.
#[derive(Debug)]
pub struct Request {
    method: Method,
    target: String,
    uri: RequestTarget,
    protocol: String,
    headers: HeaderMap,
    body: Body,
    remote: SocketAddr,
    query: HashMap<String, String>,
    cookies: OnceLock<HashMap<String, String>>,
}

impl Request {
    pub fn new(line: RequestLine, headers: HeaderMap, remote: SocketAddr) -> Self {
        let RequestLine {
            method,
            target,
            uri,
            protocol,
        } = line;
        let query = params::parse_query(uri.raw_query().unwrap_or_default());

        Self {
            method,
            target,
            uri,
            protocol,
            headers,
            body: Body::empty(),
            remote,
            query,
            cookies: OnceLock::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target as it appeared in the request line
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn uri(&self) -> &RequestTarget {
        &self.uri
    }

    /// Percent-decoded path of the target
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn raw_query(&self) -> Option<&str> {
        self.uri.raw_query()
    }

    /// The protocol token, e.g. `HTTP/1.1`
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The protocol token as a version, `None` if it is not `HTTP/x.y`
    pub fn version(&self) -> Option<HttpVersion> {
        self.protocol.parse().ok()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the header `name` (case-insensitive), if it is UTF-8.
    ///
    /// Values which are not UTF-8 are still reachable as bytes through [`Request::headers`].
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(HeaderValue::to_utf8)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Cookies from the first `Cookie` header, parsed on first use.
    ///
    /// Later `Cookie` lines are not consulted. Without the header the map is empty.
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| {
            self.headers
                .get("Cookie")
                .map(|value| params::parse_cookies(&String::from_utf8_lossy(value.as_bytes())))
                .unwrap_or_default()
        })
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name).map(String::as_str)
    }
}

use std::net::{Ipv4Addr, SocketAddr};

/// Settings for an [`HttpServer`](crate::HttpServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listening socket binds to
    pub addr: SocketAddr,
    /// Ceiling on the bytes read for one request line plus header block
    pub max_header_bytes: u64,
    /// Size of each read from the socket
    pub read_buffer_size: usize,
    /// Capacity of the response buffer, a handler writing more than this flushes early
    pub write_buffer_size: usize,
    /// Pending connection queue length passed to `listen`
    pub backlog: u32,
}

impl ServerConfig {
    pub const DEFAULT_MAX_HEADER_BYTES: u64 = 1 << 20;
    pub const DEFAULT_BUFFER_SIZE: usize = 4 << 10;

    pub fn new<A: Into<SocketAddr>>(addr: A) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    pub fn with_max_header_bytes(mut self, max_header_bytes: u64) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size.max(1);
        self
    }

    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_header_bytes: Self::DEFAULT_MAX_HEADER_BYTES,
            read_buffer_size: Self::DEFAULT_BUFFER_SIZE,
            write_buffer_size: Self::DEFAULT_BUFFER_SIZE,
            backlog: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_header_bytes, 1024 * 1024);
        assert_eq!(config.read_buffer_size, 4096);
        assert_eq!(config.write_buffer_size, 4096);
    }

    #[test]
    fn builder() {
        let config = ServerConfig::new(([0, 0, 0, 0], 9000))
            .with_max_header_bytes(512)
            .with_read_buffer_size(0)
            .with_backlog(16);
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.max_header_bytes, 512);
        assert_eq!(config.read_buffer_size, 1);
        assert_eq!(config.backlog, 16);
    }
}

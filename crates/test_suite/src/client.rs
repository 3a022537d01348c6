use std::{io, net::SocketAddr};

use bytes::{Buf, BytesMut};
use memchr::memmem;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

/// A response as read off the wire by [`RawClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// First header value matching `name`, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

/// A TCP client that writes raw request bytes and reads `Content-Length` framed responses.
pub struct RawClient {
    stream: TcpStream,
    buf: BytesMut,
}

impl RawClient {
    pub async fn connect(addr: SocketAddr) -> io::Result<Self> {
        Ok(Self {
            stream: TcpStream::connect(addr).await?,
            buf: BytesMut::with_capacity(4096),
        })
    }

    pub async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Reads one response. Fails with `UnexpectedEof` if the server closes first.
    pub async fn read_response(&mut self) -> io::Result<RawResponse> {
        let head_end = loop {
            if let Some(idx) = memmem::find(&self.buf, b"\r\n\r\n") {
                break idx;
            }
            self.fill().await?;
        };

        let head = self.buf.split_to(head_end + 4);
        let head = std::str::from_utf8(&head[..head_end])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default().to_owned();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.to_owned(), value.trim().to_owned()))
            .collect();

        let len = headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.parse::<usize>())
            .transpose()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
            .unwrap_or(0);
        while self.buf.len() < len {
            self.fill().await?;
        }
        let body = self.buf.split_to(len).to_vec();

        Ok(RawResponse {
            status_line,
            headers,
            body,
        })
    }

    /// Waits for the server to close the connection.
    ///
    /// Returns the bytes received before the close. A reset counts as closed.
    pub async fn read_until_closed(&mut self) -> io::Result<Vec<u8>> {
        loop {
            match self.stream.read_buf(&mut self.buf).await {
                Ok(0) => break,
                Ok(_) => continue,
                Err(err) if err.kind() == io::ErrorKind::ConnectionReset => break,
                Err(err) => return Err(err),
            }
        }
        let received = self.buf.to_vec();
        self.buf.advance(received.len());
        Ok(received)
    }

    /// Half-closes the write side, the server sees end of stream
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    async fn fill(&mut self) -> io::Result<()> {
        self.buf.reserve(4096);
        if self.stream.read_buf(&mut self.buf).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(())
    }
}

use std::{any::Any, io, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter, ReadHalf, WriteHalf};

use crate::{
    config::ServerConfig,
    http::{
        parser::{HttpParseError, Parser},
        request::Request,
    },
    service::{Handler, ResponseWriter},
};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Parse(#[from] HttpParseError),
    #[error("failed to flush response: {0}")]
    Io(#[from] io::Error),
    #[error("handler panicked: {0}")]
    HandlerPanic(String),
}

enum ConnectionState {
    AwaitingRequest,
    Dispatching(Request),
    Flushing,
    Closed,
}

/// One accepted stream and everything needed to serve requests on it.
///
/// Requests are handled strictly one after another: the next head is not read until the
/// previous response was flushed. Dropping the connection closes the stream.
pub struct Connection<IO, H> {
    parser: Parser<ReadHalf<IO>>,
    writer: BufWriter<WriteHalf<IO>>,
    remote: SocketAddr,
    handler: Arc<H>,
}

impl<IO, H> Connection<IO, H>
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
    H: Handler,
{
    pub fn new(io: IO, remote: SocketAddr, handler: Arc<H>, config: &ServerConfig) -> Self {
        let (read, write) = tokio::io::split(io);
        Self {
            parser: Parser::new(read, config.max_header_bytes, config.read_buffer_size),
            writer: BufWriter::with_capacity(config.write_buffer_size, write),
            remote,
            handler,
        }
    }

    /// Serves requests until the peer closes the stream or something goes wrong.
    ///
    /// A clean close between requests is `Ok(())`. Parse errors, I/O errors and handler panics
    /// end the connection without a response.
    pub async fn serve(mut self) -> Result<(), ConnectionError> {
        let mut state = ConnectionState::AwaitingRequest;
        loop {
            state = match state {
                ConnectionState::AwaitingRequest => {
                    match self.parser.parse_request(self.remote).await? {
                        Some(request) => ConnectionState::Dispatching(request),
                        None => ConnectionState::Closed,
                    }
                }
                ConnectionState::Dispatching(request) => {
                    self.dispatch(&request).await?;
                    ConnectionState::Flushing
                }
                ConnectionState::Flushing => {
                    self.writer.flush().await?;
                    ConnectionState::AwaitingRequest
                }
                ConnectionState::Closed => return Ok(()),
            };
        }
    }

    async fn dispatch(&mut self, request: &Request) -> Result<(), ConnectionError> {
        let mut writer = ResponseWriter::new(&mut self.writer);
        AssertUnwindSafe(self.handler.serve(&mut writer, request))
            .catch_unwind()
            .await
            .map_err(|payload| ConnectionError::HandlerPanic(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Serves one connection to completion and logs how it ended.
pub async fn serve_connection<IO, H>(
    io: IO,
    remote: SocketAddr,
    handler: Arc<H>,
    config: &ServerConfig,
) -> Result<(), ConnectionError>
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
    H: Handler,
{
    let result = Connection::new(io, remote, handler, config).serve().await;
    match &result {
        Ok(()) => log::debug!("{}: connection closed by peer", remote),
        Err(ConnectionError::HandlerPanic(msg)) => {
            log::error!("{}: handler panicked, closing connection: {}", remote, msg)
        }
        Err(err) => log::warn!("{}: closing connection: {}", remote, err),
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, duplex};

    use super::*;
    use crate::http::parser::ParseErrorKind;

    const REMOTE: &str = "192.0.2.7:40000";

    /// Replies with the path, and panics on `/panic`
    struct PathEcho {
        calls: AtomicUsize,
    }

    impl Handler for PathEcho {
        async fn serve(&self, w: &mut ResponseWriter<'_>, req: &Request) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if req.path() == "/panic" {
                panic!("boom");
            }
            let body = req.path();
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len());
            w.write_all(head.as_bytes()).await.unwrap();
            w.write_all(body.as_bytes()).await.unwrap();
        }
    }

    fn handler() -> Arc<PathEcho> {
        Arc::new(PathEcho {
            calls: AtomicUsize::new(0),
        })
    }

    async fn run(input: &[u8], handler: Arc<PathEcho>) -> (Result<(), ConnectionError>, Vec<u8>) {
        let (mut client, server) = duplex(64 << 10);
        let config = ServerConfig::default();
        let task = tokio::spawn(async move {
            serve_connection(server, REMOTE.parse().unwrap(), handler, &config).await
        });

        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();
        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        (task.await.unwrap(), output)
    }

    #[tokio::test]
    async fn serves_keep_alive_requests_in_order() {
        let handler = handler();
        let (result, output) = run(
            b"GET /first HTTP/1.1\r\n\r\nGET /second HTTP/1.1\r\nHost: x\r\n\r\n",
            handler.clone(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            output,
            b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\n/first\
              HTTP/1.1 200 OK\r\nContent-Length: 7\r\n\r\n/second"
        );
    }

    #[tokio::test]
    async fn parse_error_closes_without_response() {
        let handler = handler();
        let (result, output) = run(b"GET /ok HTTP/1.1\r\n\r\nnonsense\r\n\r\n", handler.clone()).await;

        let Err(ConnectionError::Parse(err)) = result else {
            panic!("expected a parse error, got {:?}", result);
        };
        assert_eq!(err.kind, ParseErrorKind::MalformedRequestLine);
        // the first response still went out
        assert_eq!(output, b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n/ok");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_panic_ends_the_connection() {
        let handler = handler();
        let (result, output) = run(
            b"GET /panic HTTP/1.1\r\n\r\nGET /never HTTP/1.1\r\n\r\n",
            handler.clone(),
        )
        .await;

        let Err(ConnectionError::HandlerPanic(msg)) = result else {
            panic!("expected a handler panic, got {:?}", result);
        };
        assert_eq!(msg, "boom");
        assert!(output.is_empty());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_connection_is_not_an_error() {
        let handler = handler();
        let (result, output) = run(b"", handler.clone()).await;
        assert!(result.is_ok());
        assert!(output.is_empty());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u32), "non-string panic payload");
    }
}

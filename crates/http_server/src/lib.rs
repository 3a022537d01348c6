//! An async HTTP/1.1 server core in rust
//!
//! The server reads request heads off each accepted connection, hands them to a single shared
//! [`Handler`], and keeps the connection open for further requests until the peer goes away.

pub mod config;
pub mod conn;
pub mod http;
pub mod service;

use std::{io, net::SocketAddr, sync::Arc};

use tokio::net::{TcpListener, TcpSocket};

pub use config::ServerConfig;
pub use conn::{ConnectionError, serve_connection};
pub use http::{Body, request::Request};
pub use service::{Handler, ResponseWriter};

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub struct HttpServer<H>(Arc<HttpServerInternal<H>>);

impl<H: Handler> HttpServer<H> {
    pub fn new(config: ServerConfig, handler: H) -> Self {
        Self(Arc::new(HttpServerInternal {
            config,
            handler: Arc::new(handler),
        }))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.0.config
    }

    pub fn handler(&self) -> &H {
        &self.0.handler
    }

    /// Binds the configured address and serves until accepting fails.
    pub async fn serve(&self) -> Result<(), HttpServerError> {
        let listener = HttpServerInternal::<H>::bind(&self.0.config)?;
        HttpServerInternal::serve(self.0.clone(), listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve_with(&self, listener: TcpListener) -> Result<(), HttpServerError> {
        HttpServerInternal::serve(self.0.clone(), listener).await
    }
}

pub(crate) struct HttpServerInternal<H> {
    config: ServerConfig,
    handler: Arc<H>,
}

impl<H: Handler> HttpServerInternal<H> {
    fn bind(config: &ServerConfig) -> io::Result<TcpListener> {
        let sock = match config.addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };

        sock.set_reuseaddr(true)?;
        sock.bind(config.addr)?;
        sock.listen(config.backlog)
    }

    async fn serve(sel: Arc<Self>, listener: TcpListener) -> Result<(), HttpServerError> {
        log::info!("listening on {}", listener.local_addr()?);
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) if is_transient_accept_error(&err) => {
                    log::warn!("failed to accept connection: {}", err);
                    continue;
                }
                Err(err) => {
                    log::error!("accept loop stopped: {}", err);
                    return Err(err.into());
                }
            };
            log::debug!("{}: accepted connection", addr);

            let sel = sel.clone();
            tokio::spawn(async move {
                // Errors are logged by `serve_connection` and never reach the accept loop
                let _ = serve_connection(stream, addr, sel.handler.clone(), &sel.config).await;
            });
        }
    }
}

/// Errors that only affect the connection being accepted, not the listener
fn is_transient_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

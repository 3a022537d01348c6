use std::{fmt::Write as _, net::SocketAddr};

use clap::Parser;
use ember_http_server::{Handler, HttpServer, Request, ResponseWriter, ServerConfig};
use tokio::io::AsyncWriteExt;

/// Echoes what the server parsed out of each request
#[derive(Debug, Parser)]
#[command(name = "ember-httpd", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
}

struct EchoRequest;

impl Handler for EchoRequest {
    async fn serve(&self, w: &mut ResponseWriter<'_>, req: &Request) {
        let mut body = String::new();
        let field = |value: Option<&str>| value.unwrap_or_default().to_owned();
        // Writing into a String cannot fail
        let _ = writeln!(body, "[query]name={}", field(req.query("name")));
        let _ = writeln!(body, "[query]token={}", field(req.query("token")));
        let _ = writeln!(body, "[cookie]foo1={}", field(req.cookie("foo1")));
        let _ = writeln!(body, "[cookie]foo2={}", field(req.cookie("foo2")));
        let _ = writeln!(body, "[Header]User-Agent={}", field(req.header("User-Agent")));
        let _ = writeln!(body, "[Header]Proto={}", req.protocol());
        let _ = writeln!(body, "[Header]Method={}", req.method());
        let _ = writeln!(body, "[Addr]Addr={}", req.remote_addr());
        let _ = writeln!(body, "[Request]{:?}", req);

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        // A failed write surfaces again when the connection flushes
        if let Err(err) = w.write_all(head.as_bytes()).await {
            log::debug!("{}: write failed: {}", req.remote_addr(), err);
            return;
        }
        if let Err(err) = w.write_all(body.as_bytes()).await {
            log::debug!("{}: write failed: {}", req.remote_addr(), err);
        }
    }
}

// try with: curl "127.0.0.1:8080?name=gu&token=123" -b "foo1=bar1;foo2=bar2;" -i
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let server = HttpServer::new(ServerConfig::new(args.addr), EchoRequest);
    if let Err(err) = server.serve().await {
        log::error!("server stopped: {}", err);
        std::process::exit(1);
    }
}

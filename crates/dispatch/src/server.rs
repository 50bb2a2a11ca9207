//! Run configuration and the built-in server adapters.
//!
//! Both adapters hand connections to `hyper`: `http1` serves HTTP/1.1 only, `auto`
//! detects HTTP/1.1 or HTTP/2 per connection.
//!
//! ```no_run
//! use clap::Parser;
//! use micro_dispatch::{App, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), micro_dispatch::ServerError> {
//!     App::new().run(ServerConfig::parse()).await
//! }
//! ```

use crate::app::App;
use crate::body::req_body;
use crate::error::{BoxError, ServerError};
use crate::request::RequestContext;
use clap::Parser;
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(version, about = "Serve a micro-dispatch application")]
pub struct ServerConfig {
    /// server adapter: http1 or auto (HTTP/1.1 and HTTP/2)
    #[arg(short = 's', long = "server", default_value = "http1")]
    pub server: String,

    #[arg(short = 'p', long, default_value_t = 5252)]
    pub port: u16,

    #[arg(short = 'o', long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { server: "http1".to_owned(), port: 5252, host: "0.0.0.0".to_owned(), log_level: Level::INFO }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAdapter {
    Http1,
    Auto,
}

impl FromStr for ServerAdapter {
    type Err = ServerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "http1" => Ok(ServerAdapter::Http1),
            "auto" => Ok(ServerAdapter::Auto),
            _ => Err(ServerError::UnknownAdapter(name.to_owned())),
        }
    }
}

/// Installs the fmt subscriber at `level`; a subscriber installed earlier is kept.
pub fn init_logging(level: Level) {
    if FmtSubscriber::builder().with_max_level(level).try_init().is_err() {
        debug!("a global subscriber is already installed");
    }
}

#[derive(Debug)]
pub struct Server {
    app: Arc<App>,
    adapter: ServerAdapter,
    address: Vec<SocketAddr>,
}

impl Server {
    /// Checks the adapter name and the address; nothing is bound yet.
    pub fn new(app: App, config: &ServerConfig) -> Result<Self, ServerError> {
        let adapter = config.server.parse::<ServerAdapter>()?;
        let address = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| ServerError::InvalidAddress(format!("{}:{} ({e})", config.host, config.port)))?
            .collect::<Vec<_>>();

        Ok(Self { app: Arc::new(app), adapter, address })
    }

    pub fn adapter(&self) -> ServerAdapter {
        self.adapter
    }

    pub async fn start(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.address.as_slice()).await.map_err(|source| ServerError::Bind {
            address: format!("{:?}", self.address),
            source,
        })?;
        info!(address = ?self.address, adapter = ?self.adapter, "start listening");
        self.serve(listener).await
    }

    /// Accepts connections from an already bound listener until it fails for good.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let app = Arc::clone(&self.app);
            let adapter = self.adapter;

            tokio::spawn(async move {
                let io = TokioIo::new(tcp_stream);
                let service = service_fn(move |req: Request<Incoming>| {
                    let app = Arc::clone(&app);
                    async move {
                        let ctx = RequestContext::from_request(req.map(req_body));
                        Ok::<_, Infallible>(app.call(ctx).await)
                    }
                });

                let result: Result<(), BoxError> = match adapter {
                    ServerAdapter::Http1 => http1::Builder::new().serve_connection(io, service).await.map_err(Into::into),
                    ServerAdapter::Auto => auto::Builder::new(TokioExecutor::new()).serve_connection(io, service).await,
                };

                match result {
                    Ok(()) => debug!(%remote_addr, "connection closed"),
                    Err(e) => error!(%remote_addr, cause = %e, "connection error"),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Server, ServerAdapter, ServerConfig};
    use crate::app::App;
    use crate::controller::Controller;
    use crate::error::ServerError;
    use crate::handler::handler_fn;
    use crate::request::RequestContext;
    use clap::Parser;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tracing::Level;

    #[test]
    fn config_defaults() {
        let config = ServerConfig::parse_from(["serve"]);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn config_flags() {
        let config = ServerConfig::parse_from(["serve", "-s", "auto", "-p", "8080", "-o", "127.0.0.1", "--log-level", "debug"]);
        assert_eq!(config.server, "auto");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn unknown_adapter_is_rejected() {
        let config = ServerConfig { server: "webrick".into(), ..ServerConfig::default() };
        let err = Server::new(App::new(), &config).unwrap_err();
        assert!(matches!(err, ServerError::UnknownAdapter(ref name) if name == "webrick"));
    }

    #[test]
    fn adapter_names() {
        assert_eq!("http1".parse::<ServerAdapter>().unwrap(), ServerAdapter::Http1);
        assert_eq!("AUTO".parse::<ServerAdapter>().unwrap(), ServerAdapter::Auto);
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let mut app = App::new();
        app.mount(Controller::builder("Ping").action("get_index", handler_fn(|_req: RequestContext| async { "pong" })).build())
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig { host: "127.0.0.1".into(), port: addr.port(), ..ServerConfig::default() };
        let server = Server::new(app, &config).unwrap();
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("pong"));
    }
}

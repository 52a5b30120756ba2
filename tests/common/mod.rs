//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use loginsrv_gate::auth::{token, TokenCodec, UserInfo};
use loginsrv_gate::config::{resolve, Config, Environment};
use loginsrv_gate::{LoginServer, ProviderRegistry};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A running server; dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub config: Arc<Config>,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Sign a token for `sub` that expires `ttl` seconds from now.
    pub fn token(&self, sub: &str, ttl: i64) -> String {
        let expiry = token::now().saturating_add_signed(ttl);
        TokenCodec::new(&self.config.jwt_secret)
            .issue(&UserInfo::new(sub, expiry))
            .unwrap()
    }
}

/// Resolve a config from flags and start a server on an ephemeral port.
pub async fn start_server(args: &[&str]) -> TestServer {
    let config = resolve(Config::default(), args.iter().copied(), &Environment::new()).unwrap();

    let server = LoginServer::new(Arc::new(config), &ProviderRegistry::with_builtin()).unwrap();
    let config = Arc::new(server.config().clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = server
            .run(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        config,
        _shutdown: tx,
    }
}

/// Client that does not follow redirects, so the gate's answers stay visible.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

//! Test server wrapper that starts Folio on a random port

use std::net::SocketAddr;

use axum::Router;
use folio_config::Config;
use folio_core::ErrorResponse;
use folio_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        Self::start_router(Server::new(&config).into_router()).await
    }

    /// Serve an arbitrary router, for exercising the dispatcher directly
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start_router(router: Router) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET a path and decode the error payload, asserting the status
    pub async fn get_error(&self, path: &str, status: u16) -> ErrorResponse {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), status, "unexpected status for GET {path}");
        resp.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

//! HTTP surface of Folio: routes, extractors and the error dispatcher

mod catalog;
mod dispatch;
mod error;
mod extract;
mod health;
mod request_context;

use std::any::Any;
use std::net::SocketAddr;

use axum::Router;
use axum::response::{IntoResponse, Response};
use folio_config::Config;
use http::{Method, Uri};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use dispatch::{Classification, classify, dispatch};
pub use error::{ApiError, BindingError};
pub use extract::{JsonBody, PathParams, QueryParams, required_header};
pub use request_context::RequestLine;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        let service = folio_catalog::build_service(&config.catalog);
        app = app.merge(catalog::catalog_router(service));

        app = with_error_dispatch(app);

        // Outermost, so the span covers failure rendering too
        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

/// Route every failure of `router` through the dispatcher
///
/// Adds the no-route and unsupported-method fallbacks, converts handler
/// panics into unclassified failures and scopes the request line for the
/// failure log. Must be applied after all routes are added.
#[must_use]
pub fn with_error_dispatch(router: Router) -> Router {
    router
        .fallback(no_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(request_context::request_context_middleware))
}

async fn no_route(method: Method, uri: Uri) -> ApiError {
    BindingError::NoRoute {
        method,
        path: uri.path().to_owned(),
    }
    .into()
}

async fn method_not_allowed(method: Method) -> ApiError {
    BindingError::MethodNotAllowed { method }.into()
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    ApiError::from(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::routing::get;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn explode() -> &'static str {
        panic!("index out of bounds")
    }

    async fn item(path: PathParams) -> Result<String, ApiError> {
        let id: i64 = path.required("id")?;
        Ok(id.to_string())
    }

    fn router() -> Router {
        with_error_dispatch(
            Router::new()
                .route("/ping", get(|| async { "pong" }))
                .route("/explode", get(explode))
                .route("/items/{id}", get(item)),
        )
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, body) = send(router(), Method::GET, "/nowhere").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No handler found for GET /nowhere");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let (status, body) = send(router(), Method::DELETE, "/ping").await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["message"], "Request method 'DELETE' is not supported");
        assert!(body.get("invalidParameters").is_none());
    }

    #[tokio::test]
    async fn undecodable_path_variable_is_a_bad_request() {
        let (status, body) = send(router(), Method::GET, "/items/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Bad Request");
        assert_eq!(body["invalidParameters"][0]["parameter"], "id");
        assert_eq!(
            body["invalidParameters"][0]["message"],
            "Unexpected type specified for 'id' parameter. Required 'i64'"
        );
    }

    #[tokio::test]
    async fn panics_become_unclassified_failures() {
        let (status, body) = send(router(), Method::GET, "/explode").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert!(body.get("code").is_none());
        assert!(!body.to_string().contains("index out of bounds"));
    }
}

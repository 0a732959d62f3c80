use std::fmt;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::{Method, header};

tokio::task_local! {
    static CURRENT: RequestLine;
}

/// Method and URL of the request being served, for failure logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub url: String,
}

impl RequestLine {
    /// Capture the method and the URL without its query string
    pub fn of(request: &Request) -> Self {
        let uri = request.uri();
        let host = uri.authority().map(ToString::to_string).or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned)
        });

        let url = match host {
            Some(host) => format!("{}://{host}{}", uri.scheme_str().unwrap_or("http"), uri.path()),
            None => uri.path().to_owned(),
        };

        Self {
            method: request.method().clone(),
            url,
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Middleware that makes the current [`RequestLine`] visible to the dispatcher
///
/// Everything below this layer, including extractor rejections, fallbacks
/// and the panic catcher, renders failures inside the scope.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let line = RequestLine::of(&request);
    CURRENT.scope(line, next.run(request)).await
}

/// The request being served, or `None` outside [`request_context_middleware`]
pub fn current() -> Option<RequestLine> {
    CURRENT.try_with(Clone::clone).ok()
}

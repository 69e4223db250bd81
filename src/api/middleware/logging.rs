//! Request logging middleware

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use tracing::info;

/// Log each request and its completion.
/// Spans come from `TraceLayer`; opening another one here duplicates them.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let request_id = request_id(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %loggable_headers(&request),
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn loggable_headers(request: &Request<Body>) -> String {
    request
        .headers()
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| format!("{}={}", name, value.to_str().unwrap_or("[invalid]")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Header names are lowercase in `http`
fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "x-real-ip"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_log_header() {
        assert!(should_log_header("content-type"));
        assert!(should_log_header("user-agent"));
        assert!(!should_log_header("cookie"));
        assert!(!should_log_header("authorization"));
    }

    #[test]
    fn test_request_id_prefers_header() {
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        assert_eq!(request_id(&request), "abc-123");
    }

    #[test]
    fn test_loggable_headers_skips_cookies() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .header("cookie", "session=secret")
            .body(Body::empty())
            .unwrap();

        let logged = loggable_headers(&request);
        assert_eq!(logged, "content-type=application/json");
    }
}

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::chat;
use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::web;

/// Build the HTTP surface: chat page, JSON and SSE chat, health
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web::index))
        .route("/chat", post(web::chat_form))
        .route("/api/chat", post(chat::chat_json))
        .route("/api/chat/stream", post(chat::chat_stream))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::services::MockChatbotServiceTrait;

    fn router(mock: MockChatbotServiceTrait) -> Router {
        create_router(AppState::new(Arc::new(mock)).with_stream_delay(Duration::ZERO))
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(MockChatbotServiceTrait::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"healthy\""));
    }

    #[tokio::test]
    async fn test_index_page_has_form() {
        let response = router(MockChatbotServiceTrait::new())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains(r#"action="/chat""#));
        assert!(body.contains(r#"name="message""#));
    }

    #[tokio::test]
    async fn test_chat_form_renders_markdown() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask()
            .times(1)
            .returning(|_| Ok("**役男**可出國".to_string()));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("message=hello"))
            .unwrap();

        let response = router(mock).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("<strong>役男</strong>可出國"));
    }

    #[tokio::test]
    async fn test_api_chat_answers_last_user_message() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask()
            .times(1)
            .returning(|q| Ok(format!("echo {}", q)));
        mock.expect_ask_in_session().never();

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({"messages": [
                    {"role": "user", "content": "first"},
                    {"role": "assistant", "content": "ok"},
                    {"role": "user", "content": "second"}
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["reply"], "echo second");
    }

    #[tokio::test]
    async fn test_api_chat_uses_session() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask().never();
        mock.expect_ask_in_session()
            .times(1)
            .returning(|session, q| Ok(format!("{}:{}", session, q)));

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({
                    "messages": [{"role": "user", "content": "hi"}],
                    "session_id": "abc"
                }),
            ))
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["reply"], "abc:hi");
    }

    #[tokio::test]
    async fn test_api_chat_error_becomes_reply() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask()
            .returning(|_| Err(DomainError::provider("openrouter", "HTTP 500")));

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["reply"].as_str().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_api_chat_without_user_message_is_rejected() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask().never();

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({"messages": [{"role": "system", "content": "x"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_chat_malformed_json() {
        let response = router(MockChatbotServiceTrait::new())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_emits_one_event_per_character() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask().returning(|_| Ok("你好".to_string()));

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat/stream",
                serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()["x-accel-buffering"], "no");
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let body = body_string(response).await;
        assert_eq!(body, "data: 你\n\ndata: 好\n\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_stream_error_is_streamed_as_text() {
        let mut mock = MockChatbotServiceTrait::new();
        mock.expect_ask()
            .returning(|_| Err(DomainError::timeout("slow")));

        let response = router(mock)
            .oneshot(json_request(
                "/api/chat/stream",
                serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
            ))
            .await
            .unwrap();

        let body = body_string(response).await;
        assert!(body.starts_with("data: E\n\ndata: r\n\n"));
        assert!(body.ends_with("data: [DONE]\n\n"));
    }

    #[tokio::test]
    async fn test_cors_is_permissive() {
        let response = router(MockChatbotServiceTrait::new())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/chat")
                    .header(header::ORIGIN, "http://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}

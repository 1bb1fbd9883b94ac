//! Router assembly.

use crate::api;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/v1/chat/completions", post(api::chat::chat_completions))
        .route("/v1/models", get(api::models::list_models))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use ensemble_application::{
        EnsembleConfig, FusionParams, InvokeOptions, ModelClient, ModelClientError, ModelRoles,
        RunEnsembleUseCase, ThinkingParams, ValidationParams,
    };
    use ensemble_domain::{ChatMessage, FusionStrategy};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedClient {
        response: Result<String, ModelClientError>,
    }

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn invoke(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: InvokeOptions,
        ) -> Result<String, ModelClientError> {
            self.response.clone()
        }
    }

    fn router_with(response: Result<&str, ModelClientError>) -> Router {
        let config = EnsembleConfig::default()
            .with_roles(ModelRoles::uniform("mock"))
            .with_thinking(ThinkingParams::default().with_threads(1))
            .with_validation(ValidationParams::default().with_enabled(false))
            .with_fusion(FusionParams::default().with_strategy(FusionStrategy::Concat));
        let client = Arc::new(FixedClient {
            response: response.map(str::to_string),
        });
        let orchestrator = Arc::new(RunEnsembleUseCase::new(client, config));
        create_router(AppState::new(orchestrator, "ensemble-reasoner"))
    }

    fn completion_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router_with(Ok("unused"))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model"], "ensemble-reasoner");
    }

    #[tokio::test]
    async fn test_models_listing() {
        let response = router_with(Ok("unused"))
            .oneshot(Request::get("/v1/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["object"], "list");
        assert_eq!(json["data"][0]["id"], "ensemble-reasoner");
    }

    #[tokio::test]
    async fn test_chat_completion_happy_path() {
        let response = router_with(Ok("The answer is 42. <END>"))
            .oneshot(completion_request(serde_json::json!({
                "model": "ensemble-reasoner",
                "messages": [{"role": "user", "content": "meaning of life?"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["object"], "chat.completion");
        assert_eq!(
            json["choices"][0]["message"]["content"],
            "The answer is 42. <END>"
        );
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert_eq!(json["usage_meta"]["threads_completed"], 1);
        assert_eq!(json["usage_meta"]["threads_failed"], 0);
        assert!(json["id"].as_str().unwrap().starts_with("chatcmpl-"));
    }

    #[tokio::test]
    async fn test_out_of_range_extension_is_bad_request() {
        let response = router_with(Ok("unused"))
            .oneshot(completion_request(serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "x_threads": 99
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "BadRequest");
    }

    #[tokio::test]
    async fn test_all_threads_failed_is_bad_gateway() {
        let response = router_with(Err(ModelClientError::UpstreamUnavailable(
            "down".to_string(),
        )))
        .oneshot(completion_request(serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "AllThreadsFailed");
    }

    #[tokio::test]
    async fn test_streaming_round_trip() {
        let body = format!("{}{}", "x".repeat(232), "<END>");
        let response = router_with(Ok(body.as_str()))
            .oneshot(completion_request(serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "stream": true
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let frames: Vec<&str> = text
            .split("\n\n")
            .filter_map(|block| block.strip_prefix("data: "))
            .collect();

        // Role frame, 5 content frames, stop frame, [DONE]
        assert_eq!(frames.len(), 8);
        assert_eq!(*frames.last().unwrap(), "[DONE]");

        let role: serde_json::Value = serde_json::from_str(frames[0]).unwrap();
        assert_eq!(role["choices"][0]["delta"]["role"], "assistant");

        let mut reassembled = String::new();
        let mut content_sizes = Vec::new();
        for frame in &frames[1..6] {
            let json: serde_json::Value = serde_json::from_str(frame).unwrap();
            let chunk = json["choices"][0]["delta"]["content"].as_str().unwrap();
            content_sizes.push(chunk.len());
            reassembled.push_str(chunk);
        }
        assert_eq!(content_sizes, vec![50, 50, 50, 50, 37]);
        assert_eq!(reassembled, body);

        let stop: serde_json::Value = serde_json::from_str(frames[6]).unwrap();
        assert_eq!(stop["choices"][0]["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn test_streaming_failure_emits_error_frame_and_done() {
        let response = router_with(Err(ModelClientError::UpstreamUnavailable(
            "down".to_string(),
        )))
        .oneshot(completion_request(serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}],
            "stream": true
        })))
        .await
        .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let frames: Vec<&str> = text
            .split("\n\n")
            .filter_map(|block| block.strip_prefix("data: "))
            .collect();

        // Role frame, error frame, [DONE]
        assert_eq!(frames.len(), 3);
        let error: serde_json::Value = serde_json::from_str(frames[1]).unwrap();
        assert_eq!(error["error"]["type"], "AllThreadsFailed");
        assert_eq!(*frames.last().unwrap(), "[DONE]");
    }
}

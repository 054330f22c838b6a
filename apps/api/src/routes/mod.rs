pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::enhancement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resume/enhance", post(handlers::handle_enhance))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::ingest::FileExtractor;
    use crate::llm_client::testing::ScriptedCompletion;
    use crate::render::docx::DOCX_CONTENT_TYPE;

    const BOUNDARY: &str = "resume-test-boundary";

    const SOURCE: &str = "Jane Doe | jane@example.com | github.com/janedoe\n\
                          Data engineer with five years of pipeline experience.\n\
                          Skills: Python, SQL, Airflow";

    const MODEL_OUTPUT: &str = r#"{
        "identity": {"name": "Jane Doe", "email": "jane@example.com",
                     "github": "https://github.com/janedoe"},
        "summary": "Data engineer building reliable pipelines.",
        "skills": {"Languages": ["Python", "SQL"], "Orchestration": ["Airflow", "Dagster"]}
    }"#;

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 100,
            cache_sweep_interval: Duration::from_secs(30),
            max_upload_bytes: 1024 * 1024,
            enhance_max_tokens: 1024,
            split_honors_tracks: true,
        }
    }

    fn app(llm: Arc<ScriptedCompletion>) -> Router {
        build_router(AppState::new(llm, Arc::new(FileExtractor), test_config()))
    }

    fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((filename, contents)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n{contents}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/v1/resume/enhance")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn to_analyze(mut request: Request<Body>) -> Request<Body> {
        *request.uri_mut() = "/api/v1/resume/analyze".parse().unwrap();
        request
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(ScriptedCompletion::default()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_enhance_returns_docx_attachment() {
        let llm = Arc::new(ScriptedCompletion::new([MODEL_OUTPUT]));
        let response = app(llm.clone())
            .oneshot(multipart(
                &[("target_role", "Data Engineer")],
                Some(("resume.txt", SOURCE)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DOCX_CONTENT_TYPE);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Ideal_Resume_Data_Engineer.docx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_enhance_reuses_cached_document() {
        let llm = Arc::new(ScriptedCompletion::new([MODEL_OUTPUT]));
        let app = app(llm.clone());
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(multipart(
                    &[("target_role", "Data Engineer")],
                    Some(("resume.txt", SOURCE)),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_role_is_bad_request() {
        let llm = Arc::new(ScriptedCompletion::new([MODEL_OUTPUT]));
        let response = app(llm.clone())
            .oneshot(multipart(&[], Some(("resume.txt", SOURCE))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_INPUT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_bad_request() {
        let llm = Arc::new(ScriptedCompletion::new([MODEL_OUTPUT]));
        let response = app(llm.clone())
            .oneshot(multipart(
                &[("target_role", "Data Engineer")],
                Some(("resume.docx", SOURCE)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_source_is_unprocessable_without_model_call() {
        let llm = Arc::new(ScriptedCompletion::new([MODEL_OUTPUT]));
        let response = app(llm.clone())
            .oneshot(multipart(
                &[("target_role", "Data Engineer")],
                Some(("resume.txt", "Jane Doe\nPython, SQL\n2019 - 2024")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_SOURCE");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_response_is_bad_gateway() {
        let llm = Arc::new(ScriptedCompletion::new(["no json here", "still none"]));
        let response = app(llm.clone())
            .oneshot(multipart(
                &[("target_role", "Data Engineer")],
                Some(("resume.txt", SOURCE)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["code"], "DECODE_ERROR");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_completion_failure_is_service_unavailable() {
        let llm = Arc::new(ScriptedCompletion::failing("upstream overloaded"));
        let response = app(llm)
            .oneshot(multipart(
                &[("target_role", "Data Engineer")],
                Some(("resume.txt", SOURCE)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_analyze_caches_report() {
        let llm = Arc::new(ScriptedCompletion::new(["STRENGTHS\n- Python"]));
        let app = app(llm.clone());

        let mut cached_flags = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(to_analyze(multipart(
                    &[("target_role", "Data Engineer")],
                    Some(("resume.txt", SOURCE)),
                )))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["report"], "STRENGTHS\n- Python");
            cached_flags.push(body["cached"].as_bool().unwrap());
        }
        assert_eq!(cached_flags, vec![false, true]);
        assert_eq!(llm.calls(), 1);
    }
}

//! Axum route handlers for the Resume API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::enhancement::pipeline::{analyze, build_artifact, generate_document, EnhancementRequest};
use crate::errors::AppError;
use crate::grounding::VerifyOptions;
use crate::ingest::UploadedFile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart fields shared by both endpoints.
#[derive(Debug, Default)]
struct UploadForm {
    resume: Option<(String, Bytes)>,
    target_role: Option<String>,
    guidance_report: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub report: String,
    pub cached: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
///
/// Returns a free-text guidance report for the target role. Cached per
/// (role, source) fingerprint.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    run_analyze(state, multipart)
        .instrument(info_span!("analyze", request_id = %Uuid::new_v4()))
        .await
}

async fn run_analyze(state: AppState, multipart: Multipart) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut form = read_form(multipart).await?;
    form.guidance_report = None;
    let request = prepare_request(&state, form).await?;

    let key = request.cache_key("analyze");
    if let Some(report) = state.analysis_cache.get(&key).await {
        info!("Analysis served from cache");
        return Ok(Json(AnalyzeResponse { report, cached: true }));
    }

    let report = analyze(state.llm.as_ref(), &request).await?;
    state.analysis_cache.insert(key, report.clone()).await;
    Ok(Json(AnalyzeResponse { report, cached: false }))
}

/// POST /api/v1/resume/enhance
///
/// Returns the enhanced resume as a `.docx` attachment. The decoded (unverified)
/// document is cached; grounding and rendering run on every request.
pub async fn handle_enhance(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    run_enhance(state, multipart)
        .instrument(info_span!("enhance", request_id = %Uuid::new_v4()))
        .await
}

async fn run_enhance(state: AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let request = prepare_request(&state, form).await?;

    let key = request.cache_key("enhance");
    let doc = match state.document_cache.get(&key).await {
        Some(doc) => {
            info!("Decoded document served from cache");
            doc
        }
        None => {
            let doc = generate_document(
                state.llm.as_ref(),
                &request,
                state.config.enhance_max_tokens,
            )
            .await?;
            let doc = Arc::new(doc);
            state.document_cache.insert(key, doc.clone()).await;
            doc
        }
    };

    let options = VerifyOptions {
        split_honors_tracks: state.config.split_honors_tracks,
    };
    // Verification, rendering and zip packaging are CPU-bound.
    let artifact = tokio::task::spawn_blocking(move || {
        build_artifact(&doc, &request.source, &request.target_role, options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))??;

    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("could not read resume upload: {e}")))?;
                form.resume = Some((filename, bytes));
            }
            "target_role" | "guidance_report" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("could not read field {name}: {e}")))?;
                if name == "target_role" {
                    form.target_role = Some(value);
                } else {
                    form.guidance_report = Some(value);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Field validation → temp file → extraction → normalization.
async fn prepare_request(state: &AppState, form: UploadForm) -> Result<EnhancementRequest, AppError> {
    let target_role = form
        .target_role
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("target_role is required".to_string()))?;
    let (filename, bytes) = form
        .resume
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::InvalidInput("resume file is required".to_string()))?;

    let extractor = state.extractor.clone();
    let raw_text = tokio::task::spawn_blocking(move || {
        let upload = UploadedFile::persist(&filename, &bytes)?;
        extractor.extract(&upload)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

    info!("Extracted {} characters from upload", raw_text.chars().count());
    EnhancementRequest::prepare(&target_role, &raw_text, form.guidance_report)
}

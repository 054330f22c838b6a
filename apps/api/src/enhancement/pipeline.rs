//! Enhancement pipeline orchestration.
//!
//! Normalizer → completion + Decoder → Verifier → Renderer → Assembler.
//! The async half (`generate_document`) talks to the completion service; the
//! sync half (`build_artifact`) is CPU-bound and runs on a blocking thread.

use tracing::{debug, info};

use crate::enhancement::decoder::decode;
use crate::enhancement::prompts::{fill_template, ANALYZE_PROMPT_TEMPLATE, ENHANCE_PROMPT_TEMPLATE};
use crate::errors::AppError;
use crate::grounding::{verify, VerifyOptions};
use crate::ingest::{normalize, SourceText};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::CompletionService;
use crate::models::ResumeDocument;
use crate::render::{assemble, render, ContentBlock, DocumentArtifact};

pub const ANALYZE_MAX_TOKENS: u32 = 2048;

/// One request's inputs. Owned by that request only.
#[derive(Debug, Clone)]
pub struct EnhancementRequest {
    pub target_role: String,
    pub source: SourceText,
    pub guidance_report: Option<String>,
}

impl EnhancementRequest {
    /// Validates the role and normalizes `raw_text`. Fails before any model call.
    pub fn prepare(
        target_role: &str,
        raw_text: &str,
        guidance_report: Option<String>,
    ) -> Result<Self, AppError> {
        let target_role = target_role.trim();
        if target_role.is_empty() {
            return Err(AppError::InvalidInput("target_role cannot be empty".to_string()));
        }
        let source = normalize(raw_text)?;
        let guidance_report = guidance_report
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());

        Ok(Self {
            target_role: target_role.to_string(),
            source,
            guidance_report,
        })
    }

    pub fn cache_key(&self, operation: &str) -> String {
        crate::cache::fingerprint(
            operation,
            &self.target_role,
            self.source.text(),
            self.guidance_report.as_deref(),
        )
    }
}

fn enhance_prompt(request: &EnhancementRequest) -> String {
    fill_template(
        ENHANCE_PROMPT_TEMPLATE,
        &[
            ("target_role", request.target_role.as_str()),
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("guidance_report", request.guidance_report.as_deref().unwrap_or("")),
            ("resume_text", request.source.text()),
        ],
    )
}

/// Free-text guidance report for the role.
pub async fn analyze(
    llm: &dyn CompletionService,
    request: &EnhancementRequest,
) -> Result<String, AppError> {
    let prompt = fill_template(
        ANALYZE_PROMPT_TEMPLATE,
        &[
            ("target_role", request.target_role.as_str()),
            ("resume_text", request.source.text()),
        ],
    );
    let report = llm.complete(&prompt, ANALYZE_MAX_TOKENS).await?;
    info!("Analysis report generated ({} chars)", report.len());
    Ok(report)
}

/// Completion call plus decode (with its single repair pass).
pub async fn generate_document(
    llm: &dyn CompletionService,
    request: &EnhancementRequest,
    max_tokens: u32,
) -> Result<ResumeDocument, AppError> {
    let prompt = enhance_prompt(request);
    debug!("Enhancement prompt: {} chars", prompt.len());
    let response = llm.complete(&prompt, max_tokens).await?;
    decode(&response, llm, max_tokens).await
}

/// Verify + render. `doc` is never modified, so a cached document can be reused.
pub fn render_verified(
    doc: &ResumeDocument,
    source: &SourceText,
    target_role: &str,
    options: VerifyOptions,
) -> Vec<ContentBlock> {
    let verified = verify(doc, source, options);
    render(&verified, target_role)
}

pub fn build_artifact(
    doc: &ResumeDocument,
    source: &SourceText,
    target_role: &str,
    options: VerifyOptions,
) -> Result<DocumentArtifact, AppError> {
    let blocks = render_verified(doc, source, target_role, options);
    let artifact = assemble(&blocks, target_role)?;
    info!(
        "Assembled {} ({} blocks, {} bytes)",
        artifact.filename,
        blocks.len(),
        artifact.bytes.len()
    );
    Ok(artifact)
}

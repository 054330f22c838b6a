//! Decoder: extracts a `ResumeDocument` from the model's text response.
//!
//! 1. strip code-fence markers, keeping anything that shares their line
//! 2. take the first `{` through the last `}` (greedy; the model is told to emit one object)
//! 3. parse
//!
//! On failure the model gets exactly one repair request and the same sequence runs
//! once more. A second failure is a `Decode` error; there is no further retry.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::enhancement::prompts::{fill_template, REPAIR_PROMPT_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::CompletionService;
use crate::models::ResumeDocument;

/// Opening fence with its optional language tag.
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[\w+-]*").expect("valid regex"));

static CLOSING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\s*$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response contains no JSON object")]
    NoObject,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Decodes `model_text`, issuing at most one repair request through `llm`.
pub async fn decode(
    model_text: &str,
    llm: &dyn CompletionService,
    max_tokens: u32,
) -> Result<ResumeDocument, AppError> {
    let first_error = match parse_payload(model_text) {
        Ok(doc) => return Ok(doc),
        Err(e) => e,
    };

    warn!("Initial decode failed ({first_error}); issuing repair request");
    let prompt = fill_template(REPAIR_PROMPT_TEMPLATE, &[("raw_response", model_text)]);
    let repaired = llm.complete(&prompt, max_tokens).await?;

    match parse_payload(&repaired) {
        Ok(doc) => {
            info!("Repair pass produced a valid document");
            Ok(doc)
        }
        Err(second_error) => Err(AppError::Decode(format!(
            "initial: {first_error}; after repair: {second_error}"
        ))),
    }
}

/// Fence stripping + outermost-brace extraction + parse. No model calls.
pub fn parse_payload(text: &str) -> Result<ResumeDocument, PayloadError> {
    let unfenced = strip_code_fences(text);
    let candidate = outermost_object(&unfenced).ok_or(PayloadError::NoObject)?;
    Ok(serde_json::from_str(candidate)?)
}

/// Removes markdown fence markers. Lines left empty by the removal are dropped;
/// lines without a fence pass through untouched.
fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter_map(|line| {
            let opened = OPENING_FENCE.replace(line, "");
            let unfenced = CLOSING_FENCE.replace(&opened, "");
            if unfenced.len() == line.len() {
                return Some(line.to_string());
            }
            let rest = unfenced.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

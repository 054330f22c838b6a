// Enhancement prompt templates.
// All prompts for the enhancement module are defined here.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid regex"));

/// Fills `{name}` placeholders in a single pass. Substituted text is never
/// scanned again; unknown placeholders stay as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Review the following resume for the target role "{target_role}".

ORIGINAL RESUME:
{resume_text}

Write a concise guidance report in plain text with these headings:
STRENGTHS, GAPS FOR THE ROLE, SUGGESTED IMPROVEMENTS, KEYWORDS TO EMPHASISE.
Only recommend emphasising skills and experience the resume actually shows.
Do not return JSON."#;

pub const ENHANCE_PROMPT_TEMPLATE: &str = r#"Rewrite the resume below into an ideal resume for the target role "{target_role}".

{grounding_instruction}

ORIGINAL RESUME:
{resume_text}

GUIDANCE REPORT (may be empty):
{guidance_report}

Return exactly one JSON object with this structure. Omit any field you cannot fill from the resume:
{
  "identity": {
    "name": "string", "email": "string", "phone": "string", "location": "string",
    "linkedin": "URL copied from the resume", "github": "URL copied from the resume",
    "portfolio": "URL copied from the resume"
  },
  "summary": "3-4 sentence professional summary",
  "skills": {"Category name": ["skill", "skill"]},
  "experience": [
    {"organization": "string", "title": "string", "period": "string", "achievements": ["string"]}
  ],
  "education": [
    {"credential": "string", "institution": "string", "period": "string", "details": "string"}
  ],
  "projects": [
    {"name": "string", "url": "string", "description": "string", "technologies": ["string"], "highlights": ["string"]}
  ],
  "certifications": [{"name": "string", "url": "string"}],
  "extras": {"Languages": ["string"], "Achievements": ["string"], "Volunteering": ["string"]}
}

RULES:
1. Keep experience, education and projects in the order the resume lists them.
2. Skills, project technologies, certifications and extras must use the resume's own wording.
3. Never output a URL that does not appear in the resume.
4. Return ONLY the JSON object. Nothing else, no code fences."#;

pub const REPAIR_PROMPT_TEMPLATE: &str = r#"The following text was meant to be a single JSON object but it is not valid JSON.

{raw_response}

Return the corrected JSON object with the same structure and content.
Fix only the syntax. Return ONLY the JSON object, with no commentary and no code fences."#;

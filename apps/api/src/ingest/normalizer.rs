//! Normalizer: turns raw extracted text into the canonical `SourceText`.
//!
//! Rules, applied in order:
//! 1. every line-break variant becomes `\n`
//! 2. a space is inserted at lower→upper letter boundaries (`JohnDoe` → `John Doe`),
//!    except inside URL, e-mail and domain tokens
//! 3. runs of 2+ blank lines collapse to one
//! 4. tabs, vertical tabs, form feeds and non-breaking spaces become a single space
//! 5. 3+ consecutive spaces collapse to two
//! 6. leading/trailing whitespace is trimmed
//!
//! `normalize` is idempotent over its own output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::AppError;
use crate::grounding::urls::mine_allowed_urls;

/// Below this many characters the document is treated as unusable
/// (scanned/image-only PDFs typically extract to a handful of characters).
pub const MIN_SOURCE_CHARS: usize = 50;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\u{2028}|\u{2029}|\u{0085}").expect("valid regex"));

/// Tokens that must never be split at case boundaries.
static PROTECTED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[a-z][a-z0-9+.-]*://\S+|www\.\S+|\S+@\S+\.\S+|\S*\b[a-z0-9-]+\.(?:com|org|net|io|dev|in|me|co|edu|ai|app|tech|xyz|info|us|uk)\b\S*",
    )
    .expect("valid regex")
});

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t\x0B\x0C\u{00A0}]*\n){2,}").expect("valid regex"));

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\x0B\x0C\u{00A0}]+").expect("valid regex"));

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {3,}").expect("valid regex"));

static WS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical normalized plain text of the uploaded document, plus the derived
/// forms every grounding check compares against. Immutable once built.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    comparison: String,
    alphanumeric: String,
    allowed_urls: HashSet<String>,
}

impl SourceText {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased, whitespace-collapsed form.
    pub fn comparison_form(&self) -> &str {
        &self.comparison
    }

    /// Lowercased form with every non-alphanumeric character removed.
    pub fn alphanumeric_form(&self) -> &str {
        &self.alphanumeric
    }

    /// Normalized URLs mined from the text. The only whitelist for output links.
    pub fn allowed_urls(&self) -> &HashSet<String> {
        &self.allowed_urls
    }
}

/// Normalizes raw extracted text, failing with `EmptySource` when too little survives.
pub fn normalize(raw: &str) -> Result<SourceText, AppError> {
    let text = normalize_text(raw);
    let chars = text.chars().count();
    if chars < MIN_SOURCE_CHARS {
        return Err(AppError::EmptySource(format!(
            "only {chars} characters of text found, at least {MIN_SOURCE_CHARS} required"
        )));
    }

    Ok(SourceText {
        comparison: comparison_form(&text),
        alphanumeric: alphanumeric_form(&text),
        allowed_urls: mine_allowed_urls(&text),
        text,
    })
}

/// The six normalization rules without the length check.
pub fn normalize_text(raw: &str) -> String {
    let text = LINE_BREAKS.replace_all(raw, "\n");
    let text = split_glued_words(&text);
    let text = BLANK_LINE_RUN.replace_all(&text, "\n\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = SPACE_RUN.replace_all(&text, "  ");
    text.trim().to_string()
}

/// Lowercase, collapse whitespace runs to one space, trim.
pub fn comparison_form(s: &str) -> String {
    WS_RUN.replace_all(&s.to_lowercase(), " ").trim().to_string()
}

/// Lowercase and keep alphanumerics only.
pub fn alphanumeric_form(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}

fn split_glued_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut last = 0;
    for token in PROTECTED_TOKEN.find_iter(text) {
        insert_case_boundaries(&text[last..token.start()], &mut out);
        out.push_str(token.as_str());
        last = token.end();
    }
    insert_case_boundaries(&text[last..], &mut out);
    out
}

fn insert_case_boundaries(segment: &str, out: &mut String) {
    let mut prev: Option<char> = None;
    for c in segment.chars() {
        if matches!(prev, Some(p) if p.is_lowercase()) && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
        prev = Some(c);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const RESUME: &str = "Jane Doe\r\nSenior Data Engineer\r\n\r\n\r\n\r\nSkills:\tPython, SQL\nExperience at AcmeCorp building pipelines.";

    #[test]
    fn test_line_breaks_unified() {
        let out = normalize_text("a\r\nb\rc\nd");
        assert_eq!(out, "a\nb\nc\nd");
    }

    #[test]
    fn test_glued_words_split_at_case_boundary() {
        assert_eq!(normalize_text("ExperienceSkills"), "Experience Skills");
        assert_eq!(normalize_text("led migrationManaged team"), "led migration Managed team");
    }

    #[test]
    fn test_urls_and_emails_not_split() {
        let out = normalize_text("See github.com/JaneDoe and https://janeDoe.dev/Work or jane.Doe@Mail.com");
        assert!(out.contains("github.com/JaneDoe"));
        assert!(out.contains("https://janeDoe.dev/Work"));
        assert!(out.contains("jane.Doe@Mail.com"));
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n \n\t\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_horizontal_whitespace() {
        assert_eq!(normalize_text("a\t\tb"), "a b");
        assert_eq!(normalize_text("a     b"), "a  b");
        assert_eq!(normalize_text("a \t b"), "a  b");
        assert_eq!(normalize_text("a\u{00A0}b"), "a b");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize_text("\n\n  hello  \n"), "hello");
    }

    #[test]
    fn test_idempotent_on_varied_inputs() {
        let samples = [
            RESUME,
            "  \t\r\n\r\nLeadEngineer\x0B\x0Cat   BigCo\n\n\n\n \n",
            "iPhone appDeveloper    with\t\t\tSwiftUI and www.Example.com/MyApp",
            "a\n \n\t\n\nb   c",
            "mixed\u{2028}separators\u{00A0}\u{00A0}\u{00A0}here",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            let twice = normalize_text(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_text_is_idempotent(
            raw in "[ \t\r\n\u{0B}\u{0C}\u{A0}\u{2028}]{0,3}(?:(?:[a-zA-Z0-9.,:|-]{1,10}|www\\.[a-zA-Z]{1,6}\\.com|[a-zA-Z]{1,5}@[a-zA-Z]{1,5}\\.io|https://[a-zA-Z]{1,6}\\.dev/[a-zA-Z]{1,6})[ \t\r\n\u{0B}\u{0C}\u{A0}\u{2028}]{1,5}){0,30}"
        ) {
            let once = normalize_text(&raw);
            prop_assert_eq!(normalize_text(&once), once);
        }
    }

    #[test]
    fn test_normalize_rejects_short_source() {
        let thirty = "Jane Doe, Engineer, Python 123";
        assert_eq!(thirty.chars().count(), 30);
        let err = normalize(thirty).unwrap_err();
        assert!(matches!(err, AppError::EmptySource(_)));
    }

    #[test]
    fn test_normalize_rejects_whitespace_padding() {
        let padded = format!("{}Jane Doe{}", " ".repeat(40), "\n".repeat(40));
        assert!(matches!(normalize(&padded), Err(AppError::EmptySource(_))));
    }

    #[test]
    fn test_normalize_builds_derived_forms() {
        let source = normalize(RESUME).unwrap();
        assert!(source.text().starts_with("Jane Doe\nSenior Data Engineer\n\nSkills: Python, SQL"));
        assert!(source.text().contains("Acme Corp"));
        assert!(source.comparison_form().contains("skills: python, sql experience"));
        assert!(source.alphanumeric_form().contains("skillspythonsql"));
    }

    #[test]
    fn test_comparison_and_alphanumeric_forms() {
        assert_eq!(comparison_form("  Machine \n  Learning "), "machine learning");
        assert_eq!(alphanumeric_form("C++ / Node.js"), "cnodejs");
    }
}

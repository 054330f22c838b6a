//! URL allow-listing.
//!
//! Every link in the output must be (a) shaped like a web URL and (b) in the source
//! document's allowed-URL set. A link that fails either check is dropped, never repaired.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::ingest::normalizer::SourceText;

/// Web links as they appear in resumes: with a scheme, with `www.`, or a bare domain.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)https?://[^\s<>"'()\[\]]+|www\.[^\s<>"'()\[\]]+|\b(?:[a-z0-9-]+\.)+(?:com|org|net|io|dev|in|me|co|edu|ai|app|tech|xyz|info|us|uk)\b(?:/[^\s<>"'()\[\]]*)?"#,
    )
    .expect("valid regex")
});

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.-]*://").expect("valid regex"));

static DRIVE_LETTER_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[^a-z])[a-z]:[\\/]").expect("valid regex"));

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '/', ')', ']', '}', '"', '\''];

const LEADING_PUNCTUATION: &[char] = &['(', '[', '{', '<', '"', '\''];

/// Comparison form of a URL: lowercase, no scheme, no leading `www.`,
/// no trailing punctuation.
pub fn normalize_url(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = SCHEME.replace(&lowered, "");
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(&without_scheme);
    without_www.trim_end_matches(TRAILING_PUNCTUATION).to_string()
}

/// Mines the allowed-URL set from normalized source text: pattern matches plus
/// whole domain-shaped tokens. Domains glued to an e-mail address are skipped.
pub fn mine_allowed_urls(text: &str) -> HashSet<String> {
    let matched = URL_PATTERN
        .find_iter(text)
        .filter(|m| !text[..m.start()].ends_with('@') && !text[m.end()..].starts_with('@'))
        .map(|m| normalize_url(m.as_str()));
    let verbatim = text.split_whitespace().filter_map(domain_shaped_token);
    matched.chain(verbatim).filter(|url| !url.is_empty()).collect()
}

/// A whitespace-delimited token such as `jane.blog.rs` that the pattern does not
/// know the TLD of. `None` for e-mail addresses, numbers and abbreviations.
fn domain_shaped_token(token: &str) -> Option<String> {
    let token = token.trim_start_matches(LEADING_PUNCTUATION);
    if token.contains('@') || !is_well_formed(token) {
        return None;
    }
    let normalized = normalize_url(token);
    let (_, tld) = host(&normalized).rsplit_once('.')?;
    (tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())).then_some(normalized)
}

fn host(normalized: &str) -> &str {
    normalized.split('/').next().unwrap_or_default()
}

/// Structural rejection: whitespace, local paths, backslashes, `file:` scheme.
pub fn is_well_formed(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return false;
    }
    if trimmed.contains('\\') || DRIVE_LETTER_PATH.is_match(trimmed) {
        return false;
    }
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("file:") {
        return false;
    }
    !(trimmed.starts_with('/')
        || trimmed.starts_with("~/")
        || trimmed.starts_with("./")
        || trimmed.starts_with("../"))
}

/// Returns the link to render, or `None` when the candidate must be dropped.
///
/// Accepted only when well formed, not an e-mail address, and its normalized form
/// (markup tags removed first) is in the allowed-URL set.
pub fn validate_url(candidate: Option<&str>, source: &SourceText) -> Option<String> {
    let stripped = MARKUP_TAG.replace_all(candidate?, "");
    let stripped = stripped.trim();
    if !is_well_formed(stripped) {
        return None;
    }

    let normalized = normalize_url(stripped);
    if normalized.is_empty() || host(&normalized).contains('@') {
        return None;
    }
    source
        .allowed_urls()
        .contains(&normalized)
        .then(|| with_scheme(stripped))
}

/// Links without a scheme are rendered as https.
fn with_scheme(url: &str) -> String {
    if SCHEME.is_match(&url.to_lowercase()) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::normalizer::normalize;

    fn source() -> SourceText {
        normalize(
            "Jane Doe | jane.doe@gmail.com | +1 (555) 010-2000\n\
             linkedin.com/in/janedoe | https://github.com/JaneDoe/ | Portfolio: www.janedoe.dev.\n\
             Data engineer with eight years of Python and SQL.",
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_url_strips_scheme_www_and_punctuation() {
        assert_eq!(normalize_url("HTTPS://www.Example.com/Path/."), "example.com/path");
        assert_eq!(normalize_url("http://github.com/x),"), "github.com/x");
        assert_eq!(normalize_url("  linkedin.com/in/jane  "), "linkedin.com/in/jane");
    }

    #[test]
    fn test_mined_urls_exclude_email_domains() {
        let urls = source().allowed_urls().clone();
        assert!(urls.contains("linkedin.com/in/janedoe"));
        assert!(urls.contains("github.com/janedoe"));
        assert!(urls.contains("janedoe.dev"));
        assert!(!urls.contains("gmail.com"));
    }

    #[test]
    fn test_no_urls_in_plain_text() {
        let urls = mine_allowed_urls("Python, SQL and a lot of data engineering work");
        assert!(urls.is_empty());
    }

    #[test]
    fn test_structural_rejections() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("github.com/jane doe"));
        assert!(!is_well_formed("C:\\Users\\jane\\resume.pdf"));
        assert!(!is_well_formed("C:/Users/jane"));
        assert!(!is_well_formed("file:///home/jane/cv.pdf"));
        assert!(!is_well_formed("/home/jane/site"));
        assert!(!is_well_formed("github.com\\jane"));
        assert!(is_well_formed("https://github.com/jane"));
    }

    #[test]
    fn test_validate_accepts_source_links_in_any_spelling() {
        let src = source();
        assert_eq!(
            validate_url(Some("https://www.linkedin.com/in/janedoe/"), &src).as_deref(),
            Some("https://www.linkedin.com/in/janedoe/")
        );
        assert_eq!(
            validate_url(Some("github.com/JaneDoe"), &src).as_deref(),
            Some("https://github.com/JaneDoe")
        );
        assert_eq!(
            validate_url(Some("<a>janedoe.dev</a>"), &src).as_deref(),
            Some("https://janedoe.dev")
        );
    }

    #[test]
    fn test_validate_rejects_fabricated_links() {
        let src = source();
        assert!(validate_url(Some("https://linkedin.com/in/someone-else"), &src).is_none());
        assert!(validate_url(Some("https://janedoe.com"), &src).is_none());
        assert!(validate_url(Some("file:///github.com/JaneDoe"), &src).is_none());
        assert!(validate_url(Some("   "), &src).is_none());
        assert!(validate_url(None, &src).is_none());
    }

    #[test]
    fn test_domain_shaped_tokens_are_allowed() {
        let src = normalize(
            "Kotlin developer. Blog at jane.blog.rs and talks on Android architecture for mobile teams.",
        )
        .unwrap();
        assert!(src.allowed_urls().contains("jane.blog.rs"));
        assert_eq!(
            validate_url(Some("jane.blog.rs"), &src).as_deref(),
            Some("https://jane.blog.rs")
        );
        assert!(validate_url(Some("Kotlin"), &src).is_none());
        assert!(validate_url(Some("blog.rs"), &src).is_none());
    }

    #[test]
    fn test_prefixes_and_email_parts_are_rejected() {
        let src = normalize(
            "Jane Doe | jane.doe@gmail.com | github.com/janedoe
             Data engineer with eight years of Python and SQL.",
        )
        .unwrap();
        assert_eq!(
            src.allowed_urls().iter().collect::<Vec<_>>(),
            vec!["github.com/janedoe"]
        );
        assert!(validate_url(Some("github.com/jane"), &src).is_none());
        assert!(validate_url(Some("gmail.com"), &src).is_none());
        assert!(validate_url(Some("doe@gmail.com"), &src).is_none());
        assert!(validate_url(Some("jane.doe@gmail.com"), &src).is_none());
        assert!(validate_url(Some("github.com/janedoe"), &src).is_some());
    }

    #[test]
    fn test_tokens_glued_to_email_are_not_mined() {
        let urls = mine_allowed_urls("Contact jane.dev@example.com or see (janedoe.dev) and 8.4/10, e.g. U.S.");
        assert!(urls.contains("janedoe.dev"));
        assert!(!urls.contains("jane.dev"));
        assert!(!urls.contains("example.com"));
        assert!(!urls.iter().any(|u| u.starts_with("8.4") || u.starts_with("e.g") || u.starts_with("u.s")));
    }

    #[test]
    fn test_path_with_at_sign_is_kept() {
        let src = normalize(
            "Jane Doe writes at medium.com/@janedoe about data pipelines and warehouse design.",
        )
        .unwrap();
        assert_eq!(
            validate_url(Some("https://medium.com/@janedoe"), &src).as_deref(),
            Some("https://medium.com/@janedoe")
        );
    }
}

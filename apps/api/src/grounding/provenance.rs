//! Traceability test: is a candidate string drawn from the source document?
//!
//! Two containment checks, cheapest first:
//! 1. whitespace/case-normalized candidate inside the normalized source
//! 2. alphanumeric-only candidate inside the alphanumeric-only source, which absorbs
//!    punctuation and spacing drift (`Node.js` vs `NodeJS`, `CI / CD` vs `CI/CD`)

use crate::ingest::normalizer::{alphanumeric_form, comparison_form, SourceText};
use crate::models::{Provenance, TaggedText};

pub fn is_traceable(candidate: &str, source: &SourceText) -> bool {
    let normalized = comparison_form(candidate);
    if normalized.is_empty() {
        return false;
    }
    if source.comparison_form().contains(&normalized) {
        return true;
    }
    let compact = alphanumeric_form(candidate);
    !compact.is_empty() && source.alphanumeric_form().contains(&compact)
}

pub fn provenance_of(candidate: &str, source: &SourceText) -> Provenance {
    if is_traceable(candidate, source) {
        Provenance::Verified
    } else {
        Provenance::Added
    }
}

/// Tags one value. Blank values yield `None` and are dropped by callers.
pub fn tag(candidate: &str, source: &SourceText) -> Option<TaggedText> {
    let text = candidate.trim();
    if text.is_empty() {
        return None;
    }
    Some(TaggedText {
        text: text.to_string(),
        provenance: provenance_of(text, source),
    })
}

pub fn tag_all(candidates: &[String], source: &SourceText) -> Vec<TaggedText> {
    candidates.iter().filter_map(|c| tag(c, source)).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ingest::normalizer::normalize;

    fn source() -> SourceText {
        normalize(
            "JANE DOE\nBackend engineer. Skills: Python, SQL, Node.js, CI / CD pipelines, \
             Machine   Learning. Certified AWS Solutions Architect - Associate.",
        )
        .unwrap()
    }

    #[test]
    fn test_exact_and_case_insensitive_matches() {
        let src = source();
        assert!(is_traceable("Python", &src));
        assert!(is_traceable("sql", &src));
        assert!(is_traceable("machine learning", &src));
        assert!(is_traceable("  Jane   Doe ", &src));
    }

    #[test]
    fn test_punctuation_drift_matches() {
        let src = source();
        assert!(is_traceable("NodeJS", &src));
        assert!(is_traceable("CI/CD", &src));
        assert!(is_traceable("AWS Solutions Architect (Associate)", &src));
    }

    #[test]
    fn test_absent_items_are_added() {
        let src = source();
        assert_eq!(provenance_of("Kubernetes", &src), Provenance::Added);
        assert_eq!(provenance_of("Rust", &src), Provenance::Added);
    }

    #[test]
    fn test_blank_and_symbol_only_candidates() {
        let src = source();
        assert!(!is_traceable("   ", &src));
        assert!(!is_traceable("--", &src));
        assert!(tag("  ", &src).is_none());
    }

    proptest! {
        #[test]
        fn prop_any_source_substring_is_verified(
            raw in "[a-zA-Z0-9 ,./()\n-]{60,240}",
            start in 0usize..240,
            len in 1usize..60,
        ) {
            let src = normalize(&raw);
            prop_assume!(src.is_ok());
            let src = src.unwrap();
            let text = src.text();
            let start = start % text.len();
            let end = (start + len).min(text.len());
            let slice = &text[start..end];
            prop_assume!(slice.chars().any(char::is_alphanumeric));
            prop_assert_eq!(provenance_of(slice, &src), Provenance::Verified, "slice {:?}", slice);
        }
    }

    #[test]
    fn test_tag_all_skips_blanks_and_trims() {
        let src = source();
        let tagged = tag_all(&["Python ".into(), "".into(), "Kubernetes".into()], &src);
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].text, "Python");
        assert!(!tagged[0].is_added());
        assert!(tagged[1].is_added());
    }
}

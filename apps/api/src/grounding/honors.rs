//! Honors-track post-pass.
//!
//! Indian and some European degrees award "Honors in <Minor>" alongside the main
//! degree, often with its own grade. Models tend to fold it into the main entry's
//! details. When an entry's details mention an honors track that no entry lists as
//! its credential, this pass splits it out into its own entry placed directly
//! after the parent, so later entries shift down by one.
//!
//! Isolated from the rest of grounding; `VerifyOptions::split_honors_tracks` turns it off.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::Education;

static HONORS_TRACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhonou?rs\s+(?:degree\s+)?in\s+([a-z][a-z&/+ -]*[a-z])").expect("valid regex")
});

/// Words that end the track name when the clause keeps going. `and` only ends it
/// when a grade follows, so "Data Science and Engineering" stays whole.
static TRACK_TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s+(?:with|cgpa|gpa|grade|percentage|score|from|at)\b|\s+and\s+(?:an?\s+)?(?:c?gpa|grade|percentage|score)\b",
    )
    .expect("valid regex")
});

static GRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(c?gpa|grade|percentage|score)\b\s*(?:of\s+|:\s*|-\s*)?([0-9]+(?:\.[0-9]+)?(?:\s*/\s*[0-9]+(?:\.[0-9]+)?)?\s*%?)",
    )
    .expect("valid regex")
});

static CLAUSE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;\n]|\.(?:\s|$)").expect("valid regex"));

struct HonorsMention {
    track: String,
    grade: Option<String>,
    clause_start: usize,
    clause_end: usize,
}

pub fn split_honors_tracks(entries: Vec<Education>) -> Vec<Education> {
    let mut out = Vec::with_capacity(entries.len() + 1);
    let existing: Vec<String> = entries
        .iter()
        .filter_map(|e| e.credential.as_deref())
        .map(str::to_lowercase)
        .collect();

    for mut entry in entries {
        let mention = entry
            .details
            .as_deref()
            .and_then(find_honors_mention)
            .filter(|m| !already_listed(&existing, &m.track));

        let Some(mention) = mention else {
            out.push(entry);
            continue;
        };

        debug!("Splitting honors track '{}' into its own education entry", mention.track);
        let synthetic = Education {
            credential: Some(format!("Honors in {}", mention.track)),
            institution: entry.institution.clone(),
            period: entry.period.clone(),
            details: mention.grade.clone(),
        };
        entry.details = entry
            .details
            .as_deref()
            .and_then(|d| remove_clause(d, mention.clause_start, mention.clause_end));
        out.push(entry);
        out.push(synthetic);
    }
    out
}

fn find_honors_mention(details: &str) -> Option<HonorsMention> {
    let caps = HONORS_TRACK.captures(details)?;
    let whole = caps.get(0)?;
    let raw_track = caps.get(1)?.as_str();
    let track = TRACK_TERMINATOR
        .splitn(raw_track, 2)
        .next()
        .unwrap_or(raw_track)
        .trim()
        .to_string();
    if track.is_empty() {
        return None;
    }

    let clause_start = details[..whole.start()]
        .rfind([';', '\n', ','])
        .map_or(0, |i| i + 1);
    let clause_end = CLAUSE_END
        .find_at(details, whole.end())
        .map_or(details.len(), |m| m.start());
    let clause = &details[whole.start()..clause_end];
    let grade = GRADE
        .captures(clause)
        .map(|g| format!("{}: {}", grade_label(&g[1]), g[2].trim()));

    Some(HonorsMention {
        track,
        grade,
        clause_start,
        clause_end,
    })
}

fn grade_label(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "cgpa" => "CGPA".to_string(),
        "gpa" => "GPA".to_string(),
        other => {
            let mut chars = other.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
    }
}

fn already_listed(existing_credentials: &[String], track: &str) -> bool {
    let track = track.to_lowercase();
    existing_credentials
        .iter()
        .any(|c| c.contains("hono") && c.contains(&track))
}

/// Removes `[start, end)` plus the separator that follows; `None` when nothing is left.
fn remove_clause(details: &str, start: usize, end: usize) -> Option<String> {
    let before = details[..start].trim_end().trim_end_matches([',', ';']).trim_end();
    let after = details[end..].trim_start_matches(['.', ';', ',', '\n']).trim();
    let joined = match (before.is_empty(), after.is_empty()) {
        (true, true) => return None,
        (false, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{before}. {after}"),
    };
    Some(joined)
}

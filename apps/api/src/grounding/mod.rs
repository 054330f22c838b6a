// Grounding: decides which generated values are drawn from the source document.
// Catalog-like fields get a provenance tag, links go through the allow-list,
// contact fields are shape-checked. Prose is copied through untagged.

pub mod honors;
pub mod provenance;
pub mod urls;

use tracing::{info, warn};

use crate::ingest::normalizer::SourceText;
use crate::models::{
    Identity, LinkKind, ProfileLink, ResumeDocument, Skills, VerifiedCertification,
    VerifiedIdentity, VerifiedProject, VerifiedResume, VerifiedSkills,
};
use provenance::{tag, tag_all};
use urls::validate_url;

#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions {
    pub split_honors_tracks: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            split_honors_tracks: true,
        }
    }
}

/// Builds the grounded copy of `doc`. Never fails: anything that cannot be
/// trusted is tagged `Added` or dropped.
pub fn verify(doc: &ResumeDocument, source: &SourceText, options: VerifyOptions) -> VerifiedResume {
    let mut rejected_links = 0usize;
    let mut check_link = |field: &str, candidate: Option<&str>| {
        let accepted = validate_url(candidate, source);
        if candidate.is_some() && accepted.is_none() {
            warn!("Dropping {field} link not found in source document");
            rejected_links += 1;
        }
        accepted
    };

    let identity = verify_identity(&doc.identity, &mut check_link);

    let skills = doc.skills.as_ref().map(|skills| match skills {
        Skills::Flat(items) => VerifiedSkills::Flat(tag_all(items, source)),
        Skills::Categorized(categories) => VerifiedSkills::Categorized(
            categories
                .iter()
                .map(|(category, items)| (category.clone(), tag_all(items, source)))
                .filter(|(_, items)| !items.is_empty())
                .collect(),
        ),
    });

    let projects = doc
        .projects
        .iter()
        .map(|p| VerifiedProject {
            name: p.name.as_deref().and_then(|n| tag(n, source)),
            url: check_link("project", p.url.as_deref()),
            description: p.description.clone(),
            technologies: tag_all(&p.technologies, source),
            highlights: p.highlights.clone(),
        })
        .collect();

    let certifications = doc
        .certifications
        .iter()
        .filter_map(|c| {
            Some(VerifiedCertification {
                name: tag(&c.name, source)?,
                url: check_link("certification", c.url.as_deref()),
            })
        })
        .collect();

    let extras = doc
        .extras
        .iter()
        .map(|(category, items)| (category.clone(), tag_all(items, source)))
        .filter(|(_, items)| !items.is_empty())
        .collect();

    let education = if options.split_honors_tracks {
        honors::split_honors_tracks(doc.education.clone())
    } else {
        doc.education.clone()
    };

    let verified = VerifiedResume {
        identity,
        summary: doc.summary.clone(),
        skills,
        experience: doc.experience.clone(),
        education,
        projects,
        certifications,
        extras,
    };

    info!(
        "Grounding complete: {} added values, {} links rejected",
        verified.added_count(),
        rejected_links
    );
    verified
}

fn verify_identity(
    identity: &Identity,
    check_link: &mut impl FnMut(&str, Option<&str>) -> Option<String>,
) -> VerifiedIdentity {
    let links = [
        (LinkKind::LinkedIn, identity.linkedin.as_deref()),
        (LinkKind::GitHub, identity.github.as_deref()),
        (LinkKind::Portfolio, identity.portfolio.as_deref()),
    ]
    .into_iter()
    .filter_map(|(kind, candidate)| {
        check_link(kind.label(), candidate).map(|url| ProfileLink { kind, url })
    })
    .collect();

    VerifiedIdentity {
        name: identity.name.clone(),
        email: identity.email.as_deref().filter(|e| is_email_shaped(e)).map(String::from),
        phone: identity.phone.as_deref().filter(|p| is_phone_shaped(p)).map(String::from),
        location: identity.location.clone(),
        links,
    }
}

/// Contact fields skip the allow-list; only their shape is checked.
fn is_email_shaped(email: &str) -> bool {
    email.contains('@') && !email.chars().any(char::is_whitespace)
}

fn is_phone_shaped(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' ' | '/'))
}

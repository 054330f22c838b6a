//! `VerifiedResume`: the grounded copy of a `ResumeDocument`.
//!
//! Produced once by `grounding::verify` and read-only afterwards. Catalog-like
//! fields carry a `Provenance`; prose fields are copied through untagged; every
//! link has already passed the allow-list (a rejected link is `None`).

use serde::Serialize;

use crate::models::resume::{Education, Experience};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Traceable to the source document.
    Verified,
    /// Introduced by the enhancement step; rendered highlighted.
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedText {
    pub text: String,
    pub provenance: Provenance,
}

impl TaggedText {
    pub fn is_added(&self) -> bool {
        self.provenance == Provenance::Added
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkKind {
    LinkedIn,
    GitHub,
    Portfolio,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::LinkedIn => "LinkedIn",
            LinkKind::GitHub => "GitHub",
            LinkKind::Portfolio => "Portfolio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileLink {
    pub kind: LinkKind,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerifiedIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    /// Accepted links only, in LinkedIn → GitHub → Portfolio order.
    pub links: Vec<ProfileLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VerifiedSkills {
    Flat(Vec<TaggedText>),
    Categorized(Vec<(String, Vec<TaggedText>)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedProject {
    pub name: Option<TaggedText>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub technologies: Vec<TaggedText>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedCertification {
    pub name: TaggedText,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerifiedResume {
    pub identity: VerifiedIdentity,
    pub summary: Option<String>,
    pub skills: Option<VerifiedSkills>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<VerifiedProject>,
    pub certifications: Vec<VerifiedCertification>,
    pub extras: Vec<(String, Vec<TaggedText>)>,
}

impl VerifiedResume {
    /// Every tagged value in document order.
    pub fn tagged_values(&self) -> impl Iterator<Item = &TaggedText> {
        let skills: Box<dyn Iterator<Item = &TaggedText>> = match &self.skills {
            Some(VerifiedSkills::Flat(items)) => Box::new(items.iter()),
            Some(VerifiedSkills::Categorized(categories)) => {
                Box::new(categories.iter().flat_map(|(_, items)| items.iter()))
            }
            None => Box::new(std::iter::empty()),
        };
        skills
            .chain(
                self.projects
                    .iter()
                    .flat_map(|p| p.name.iter().chain(p.technologies.iter())),
            )
            .chain(self.certifications.iter().map(|c| &c.name))
            .chain(self.extras.iter().flat_map(|(_, items)| items.iter()))
    }

    pub fn added_count(&self) -> usize {
        self.tagged_values().filter(|t| t.is_added()).count()
    }
}

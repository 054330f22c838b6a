//! Renderer: turns a `VerifiedResume` into an ordered list of `ContentBlock`s.
//!
//! Section order is fixed:
//! header → contact → links → summary → skills → experience → projects →
//! education → certifications → extras.
//!
//! Header, contact, summary and skills always render (with placeholders when
//! empty). Every other section is omitted entirely when it has no data.

use serde::Serialize;

use crate::models::{
    Education, Experience, Provenance, TaggedText, VerifiedCertification, VerifiedProject,
    VerifiedResume, VerifiedSkills,
};

pub const NAME_PLACEHOLDER: &str = "[Your Name]";
pub const EMAIL_PLACEHOLDER: &str = "[Email]";
pub const PHONE_PLACEHOLDER: &str = "[Phone]";
pub const LOCATION_PLACEHOLDER: &str = "[Location]";
pub const SUMMARY_PLACEHOLDER: &str = "[Professional summary]";
pub const SKILLS_PLACEHOLDER: &str = "[Key skills]";

const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Title,
    Subtitle,
    ContactLine,
    /// Hyperlink-run line under the contact details.
    LinkLine,
    Heading,
    Paragraph,
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// `None` for untagged prose and punctuation.
    pub provenance: Option<Provenance>,
    pub bold: bool,
    pub italic: bool,
    pub link: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: None,
            bold: false,
            italic: false,
            link: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    pub fn tagged(value: &TaggedText) -> Self {
        Self {
            provenance: Some(value.provenance),
            ..Self::plain(value.text.clone())
        }
    }

    pub fn with_link(self, link: Option<String>) -> Self {
        Self { link, ..self }
    }

    pub fn with_bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn is_highlighted(&self) -> bool {
        self.provenance == Some(Provenance::Added)
    }

    fn same_style(&self, other: &TextRun) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.link == other.link
            && self.is_highlighted() == other.is_highlighted()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub runs: Vec<TextRun>,
}

impl ContentBlock {
    fn new(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        Self { kind, runs }
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

pub fn render(doc: &VerifiedResume, role: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    render_header(doc, role, &mut blocks);

    heading(&mut blocks, "Professional Summary");
    let summary = doc.summary.as_deref().unwrap_or(SUMMARY_PLACEHOLDER);
    blocks.push(ContentBlock::new(BlockKind::Paragraph, vec![TextRun::plain(summary)]));

    heading(&mut blocks, "Skills");
    render_skills(doc.skills.as_ref(), &mut blocks);

    if !doc.experience.is_empty() {
        heading(&mut blocks, "Professional Experience");
        doc.experience.iter().for_each(|e| render_experience(e, &mut blocks));
    }

    if !doc.projects.is_empty() {
        heading(&mut blocks, "Projects");
        doc.projects.iter().for_each(|p| render_project(p, &mut blocks));
    }

    if !doc.education.is_empty() {
        heading(&mut blocks, "Education");
        doc.education.iter().for_each(|e| render_education(e, &mut blocks));
    }

    if !doc.certifications.is_empty() {
        heading(&mut blocks, "Certifications");
        doc.certifications.iter().for_each(|c| render_certification(c, &mut blocks));
    }

    if !doc.extras.is_empty() {
        heading(&mut blocks, "Additional Information");
        for (category, items) in &doc.extras {
            blocks.push(ContentBlock::new(
                BlockKind::Paragraph,
                catalog_runs(Some(category), items),
            ));
        }
    }

    blocks
}

fn heading(blocks: &mut Vec<ContentBlock>, title: &str) {
    blocks.push(ContentBlock::new(BlockKind::Heading, vec![TextRun::bold(title)]));
}

fn render_header(doc: &VerifiedResume, role: &str, blocks: &mut Vec<ContentBlock>) {
    let identity = &doc.identity;
    let name = identity.name.as_deref().unwrap_or(NAME_PLACEHOLDER);
    blocks.push(ContentBlock::new(BlockKind::Title, vec![TextRun::bold(name)]));

    let role = role.trim();
    if !role.is_empty() {
        blocks.push(ContentBlock::new(BlockKind::Subtitle, vec![TextRun::plain(role)]));
    }

    let contact = [
        identity.email.as_deref().unwrap_or(EMAIL_PLACEHOLDER),
        identity.phone.as_deref().unwrap_or(PHONE_PLACEHOLDER),
        identity.location.as_deref().unwrap_or(LOCATION_PLACEHOLDER),
    ]
    .join(SEPARATOR);
    blocks.push(ContentBlock::new(BlockKind::ContactLine, vec![TextRun::plain(contact)]));

    if identity.links.is_empty() {
        return;
    }
    let mut runs = Vec::new();
    for (i, link) in identity.links.iter().enumerate() {
        if i > 0 {
            runs.push(TextRun::plain(SEPARATOR));
        }
        runs.push(TextRun::plain(link.kind.label()).with_link(Some(link.url.clone())));
    }
    blocks.push(ContentBlock::new(BlockKind::LinkLine, runs));
}

fn render_skills(skills: Option<&VerifiedSkills>, blocks: &mut Vec<ContentBlock>) {
    match skills {
        Some(VerifiedSkills::Flat(items)) if !items.is_empty() => {
            blocks.push(ContentBlock::new(BlockKind::Paragraph, catalog_runs(None, items)));
        }
        Some(VerifiedSkills::Categorized(categories)) if !categories.is_empty() => {
            for (category, items) in categories {
                blocks.push(ContentBlock::new(
                    BlockKind::Paragraph,
                    catalog_runs(Some(category), items),
                ));
            }
        }
        _ => blocks.push(ContentBlock::new(
            BlockKind::Paragraph,
            vec![TextRun::plain(SKILLS_PLACEHOLDER)],
        )),
    }
}

fn render_experience(entry: &Experience, blocks: &mut Vec<ContentBlock>) {
    blocks.push(ContentBlock::new(
        BlockKind::Paragraph,
        entry_line(
            entry.title.as_deref().unwrap_or("[Position]"),
            entry.organization.as_deref(),
            entry.period.as_deref(),
        ),
    ));
    for achievement in &entry.achievements {
        blocks.push(ContentBlock::new(BlockKind::Bullet, vec![TextRun::plain(achievement)]));
    }
}

fn render_project(project: &VerifiedProject, blocks: &mut Vec<ContentBlock>) {
    let name = match &project.name {
        Some(name) => TextRun::tagged(name),
        None => TextRun::plain("[Project]"),
    };
    blocks.push(ContentBlock::new(
        BlockKind::Paragraph,
        vec![name.with_bold().with_link(project.url.clone())],
    ));

    if let Some(description) = &project.description {
        blocks.push(ContentBlock::new(BlockKind::Paragraph, vec![TextRun::plain(description)]));
    }
    if !project.technologies.is_empty() {
        blocks.push(ContentBlock::new(
            BlockKind::Paragraph,
            catalog_runs(Some("Technologies"), &project.technologies),
        ));
    }
    for highlight in &project.highlights {
        blocks.push(ContentBlock::new(BlockKind::Bullet, vec![TextRun::plain(highlight)]));
    }
}

fn render_education(entry: &Education, blocks: &mut Vec<ContentBlock>) {
    blocks.push(ContentBlock::new(
        BlockKind::Paragraph,
        entry_line(
            entry.credential.as_deref().unwrap_or("[Degree]"),
            entry.institution.as_deref(),
            entry.period.as_deref(),
        ),
    ));
    if let Some(details) = &entry.details {
        blocks.push(ContentBlock::new(BlockKind::Paragraph, vec![TextRun::plain(details)]));
    }
}

fn render_certification(cert: &VerifiedCertification, blocks: &mut Vec<ContentBlock>) {
    blocks.push(ContentBlock::new(
        BlockKind::Bullet,
        vec![TextRun::tagged(&cert.name).with_link(cert.url.clone())],
    ));
}

/// `Heading | Organization | Period`
fn entry_line(primary: &str, secondary: Option<&str>, period: Option<&str>) -> Vec<TextRun> {
    let mut runs = vec![TextRun::bold(primary)];
    if let Some(secondary) = secondary {
        runs.push(TextRun::plain(format!("{SEPARATOR}{secondary}")));
    }
    if let Some(period) = period {
        runs.push(TextRun::plain(SEPARATOR));
        runs.push(TextRun::italic(period));
    }
    runs
}

/// `Label: a, b, c` split into runs at provenance boundaries, so only added
/// items are highlighted. Separators take the default color.
fn catalog_runs(label: Option<&str>, items: &[TaggedText]) -> Vec<TextRun> {
    let mut runs = Vec::new();
    if let Some(label) = label {
        runs.push(TextRun::bold(format!("{label}: ")));
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            push_merged(&mut runs, TextRun::plain(", "));
        }
        push_merged(&mut runs, TextRun::tagged(item));
    }
    runs
}

fn push_merged(runs: &mut Vec<TextRun>, run: TextRun) {
    match runs.last_mut() {
        Some(last) if last.same_style(&run) => {
            last.text.push_str(&run.text);
            if last.provenance.is_none() {
                last.provenance = run.provenance;
            }
        }
        _ => runs.push(run),
    }
}

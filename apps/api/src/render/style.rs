//! Render-time style table. Sizes are in half-points and margins in twips,
//! the units WordprocessingML uses natively.

use crate::render::blocks::TextRun;

#[derive(Debug, Clone, Copy)]
pub struct StyleTable {
    pub font: &'static str,
    pub default_color: &'static str,
    /// Values introduced by the enhancement step.
    pub added_color: &'static str,
    pub link_color: &'static str,
    pub title_size: u32,
    pub subtitle_size: u32,
    pub heading_size: u32,
    pub body_size: u32,
    pub page_width: u32,
    pub page_height: u32,
    pub margin: u32,
    /// Space after a paragraph, in twips.
    pub paragraph_spacing: u32,
    pub bullet_indent: u32,
}

/// US letter, 0.6" margins, Calibri 10.5pt body.
pub const STYLE: StyleTable = StyleTable {
    font: "Calibri",
    default_color: "000000",
    added_color: "C00000",
    link_color: "0563C1",
    title_size: 40,
    subtitle_size: 24,
    heading_size: 24,
    body_size: 21,
    page_width: 12240,
    page_height: 15840,
    margin: 864,
    paragraph_spacing: 60,
    bullet_indent: 360,
};

impl StyleTable {
    /// Links always use the link color; otherwise added values are highlighted.
    pub fn run_color(&self, run: &TextRun) -> &'static str {
        if run.link.is_some() {
            self.link_color
        } else if run.is_highlighted() {
            self.added_color
        } else {
            self.default_color
        }
    }
}

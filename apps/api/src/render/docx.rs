//! Assembler: packages `ContentBlock`s as a WordprocessingML (.docx) file.
//!
//! The package is a zip of fixed parts plus `word/document.xml`, which is
//! generated from the blocks. Hyperlink targets become external relationships
//! in `word/_rels/document.xml.rels`. All text goes through `escape_xml`.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use anyhow::Context;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::AppError;
use crate::render::blocks::{BlockKind, ContentBlock, TextRun};
use crate::render::style::{StyleTable, STYLE};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn assemble(blocks: &[ContentBlock], role: &str) -> Result<DocumentArtifact, AppError> {
    let bytes = build_package(blocks, role)?;
    Ok(DocumentArtifact {
        filename: artifact_filename(role),
        content_type: DOCX_CONTENT_TYPE,
        bytes,
    })
}

/// `Ideal_Resume_<Role>.docx` with every non-alphanumeric character of the
/// role replaced by `_`.
pub fn artifact_filename(role: &str) -> String {
    let sanitized: String = role
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "Ideal_Resume.docx".to_string()
    } else {
        format!("Ideal_Resume_{sanitized}.docx")
    }
}

fn build_package(blocks: &[ContentBlock], role: &str) -> anyhow::Result<Vec<u8>> {
    let mut links = Vec::new();
    let document = document_xml(blocks, &STYLE, &mut links);

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(role)),
        ("word/document.xml", document),
        ("word/styles.xml", styles_xml(&STYLE)),
        ("word/numbering.xml", numbering_xml(&STYLE)),
        ("word/_rels/document.xml.rels", document_rels_xml(&links)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in parts {
        zip.start_file(name, options)
            .with_context(|| format!("starting docx part {name}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("writing docx part {name}"))?;
    }
    let cursor = zip.finish().context("finishing docx package")?;
    Ok(cursor.into_inner())
}

/// Escapes the five XML special characters and drops control characters
/// that XML 1.0 cannot carry.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

// ── document.xml ─────────────────────────────────────────────────────────────

/// Relationship ids 1 and 2 are styles and numbering; hyperlinks start at 3.
fn document_xml(blocks: &[ContentBlock], style: &StyleTable, links: &mut Vec<String>) -> String {
    let mut body = String::new();
    for block in blocks {
        write_paragraph(&mut body, block, style, links);
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            "<w:body>{body}",
            r#"<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="432" w:footer="432" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        body = body,
        w = style.page_width,
        h = style.page_height,
        m = style.margin,
    )
}

fn paragraph_style(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Title => "Title",
        BlockKind::Subtitle => "Subtitle",
        BlockKind::ContactLine | BlockKind::LinkLine => "Contact",
        BlockKind::Heading => "Heading1",
        BlockKind::Paragraph => "Normal",
        BlockKind::Bullet => "ListBullet",
    }
}

fn write_paragraph(
    out: &mut String,
    block: &ContentBlock,
    style: &StyleTable,
    links: &mut Vec<String>,
) {
    out.push_str("<w:p><w:pPr>");
    let _ = write!(out, r#"<w:pStyle w:val="{}"/>"#, paragraph_style(block.kind));
    if block.kind == BlockKind::Bullet {
        out.push_str(r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr>"#);
    }
    out.push_str("</w:pPr>");

    for run in &block.runs {
        match &run.link {
            Some(url) => {
                links.push(url.clone());
                let _ = write!(out, r#"<w:hyperlink r:id="rId{}" w:history="1">"#, links.len() + 2);
                write_run(out, run, style);
                out.push_str("</w:hyperlink>");
            }
            None => write_run(out, run, style),
        }
    }
    out.push_str("</w:p>");
}

fn write_run(out: &mut String, run: &TextRun, style: &StyleTable) {
    out.push_str("<w:r><w:rPr>");
    if run.bold {
        out.push_str("<w:b/>");
    }
    if run.italic {
        out.push_str("<w:i/>");
    }
    let _ = write!(out, r#"<w:color w:val="{}"/>"#, style.run_color(run));
    if run.link.is_some() {
        out.push_str(r#"<w:u w:val="single"/>"#);
    }
    out.push_str("</w:rPr>");

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        let _ = write!(out, r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(line));
    }
    out.push_str("</w:r>");
}

// ── package parts ────────────────────────────────────────────────────────────

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    "</Types>"
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    "</Relationships>"
);

fn core_xml(role: &str) -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>Ideal Resume - {title}</dc:title>",
            "<dc:creator>Ideal Resume</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            "</cp:coreProperties>"
        ),
        title = escape_xml(role.trim()),
        created = created,
    )
}

fn document_rels_xml(links: &[String]) -> String {
    let mut out = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#,
    ));
    for (i, url) in links.iter().enumerate() {
        let _ = write!(
            out,
            r#"<Relationship Id="rId{}" Type="{HYPERLINK_REL}" Target="{}" TargetMode="External"/>"#,
            i + 3,
            escape_xml(url)
        );
    }
    out.push_str("</Relationships>");
    out
}

fn styles_xml(style: &StyleTable) -> String {
    let paragraph = |id: &str, size: u32, bold: bool, centered: bool, extra: &str| {
        format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{id}"/>"#,
                r#"<w:basedOn w:val="Normal"/><w:qFormat/><w:pPr>{jc}{extra}</w:pPr>"#,
                r#"<w:rPr>{b}<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#
            ),
            id = id,
            jc = if centered { r#"<w:jc w:val="center"/>"# } else { "" },
            extra = extra,
            b = if bold { "<w:b/>" } else { "" },
            size = size,
        )
    };

    let heading_extra = format!(
        concat!(
            r#"<w:keepNext/><w:spacing w:before="200" w:after="{after}"/>"#,
            r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{color}"/></w:pBdr>"#
        ),
        after = style.paragraph_spacing,
        color = style.default_color,
    );

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#,
            r#"<w:color w:val="{color}"/><w:sz w:val="{body}"/><w:szCs w:val="{body}"/>"#,
            "</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr>",
            r#"<w:spacing w:after="{spacing}" w:line="252" w:lineRule="auto"/>"#,
            "</w:pPr></w:pPrDefault></w:docDefaults>",
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            "{title}{subtitle}{contact}{heading}{bullet}",
            "</w:styles>"
        ),
        font = style.font,
        color = style.default_color,
        body = style.body_size,
        spacing = style.paragraph_spacing,
        title = paragraph("Title", style.title_size, true, true, ""),
        subtitle = paragraph("Subtitle", style.subtitle_size, false, true, ""),
        contact = paragraph("Contact", style.body_size, false, true, ""),
        heading = paragraph("Heading1", style.heading_size, true, false, &heading_extra),
        bullet = paragraph("ListBullet", style.body_size, false, false, ""),
    )
}

fn numbering_xml(style: &StyleTable) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/>"#,
            "<w:lvlText w:val=\"\u{2022}\"/>",
            r#"<w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{indent}" w:hanging="{hanging}"/></w:pPr></w:lvl>"#,
            "</w:abstractNum>",
            r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#,
            "</w:numbering>"
        ),
        indent = style.bullet_indent,
        hanging = style.bullet_indent / 2,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;
    use crate::models::{Provenance, TaggedText};

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        contents
    }

    fn sample_blocks() -> Vec<ContentBlock> {
        vec![
            ContentBlock {
                kind: BlockKind::Title,
                runs: vec![TextRun::bold("Jane <Doe> & Co")],
            },
            ContentBlock {
                kind: BlockKind::LinkLine,
                runs: vec![TextRun::plain("GitHub").with_link(Some("https://github.com/jane?a=1&b=2".into()))],
            },
            ContentBlock {
                kind: BlockKind::Bullet,
                runs: vec![
                    TextRun::tagged(&TaggedText {
                        text: "Python, ".into(),
                        provenance: Provenance::Verified,
                    }),
                    TextRun::tagged(&TaggedText {
                        text: "Kubernetes".into(),
                        provenance: Provenance::Added,
                    }),
                ],
            },
        ]
    }

    #[test]
    fn test_filename_sanitized() {
        assert_eq!(artifact_filename("Data Engineer"), "Ideal_Resume_Data_Engineer.docx");
        assert_eq!(artifact_filename("C++/Rust Dev"), "Ideal_Resume_C___Rust_Dev.docx");
        assert_eq!(artifact_filename("  "), "Ideal_Resume.docx");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_package_contains_all_parts() {
        let artifact = assemble(&sample_blocks(), "Data Engineer").unwrap();
        assert_eq!(artifact.content_type, DOCX_CONTENT_TYPE);
        assert_eq!(artifact.filename, "Ideal_Resume_Data_Engineer.docx");

        let archive = ZipArchive::new(Cursor::new(artifact.bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert!(part(&artifact.bytes, "docProps/core.xml").contains("Ideal Resume - Data Engineer"));
    }

    #[test]
    fn test_document_text_escaped_and_colored() {
        let artifact = assemble(&sample_blocks(), "Engineer").unwrap();
        let document = part(&artifact.bytes, "word/document.xml");

        assert!(document.contains("Jane &lt;Doe&gt; &amp; Co"));
        assert!(!document.contains("<Doe>"));
        assert!(document.contains(&format!(
            r#"<w:color w:val="{}"/></w:rPr><w:t xml:space="preserve">Kubernetes</w:t>"#,
            STYLE.added_color
        )));
        assert!(document.contains(&format!(
            r#"<w:color w:val="{}"/></w:rPr><w:t xml:space="preserve">Python, </w:t>"#,
            STYLE.default_color
        )));
        assert!(document.contains(r#"<w:numId w:val="1"/>"#));
    }

    #[test]
    fn test_hyperlinks_become_external_relationships() {
        let artifact = assemble(&sample_blocks(), "Engineer").unwrap();
        let document = part(&artifact.bytes, "word/document.xml");
        let rels = part(&artifact.bytes, "word/_rels/document.xml.rels");

        assert!(document.contains(r#"<w:hyperlink r:id="rId3" w:history="1">"#));
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains(r#"Target="https://github.com/jane?a=1&amp;b=2" TargetMode="External""#));
    }

    #[test]
    fn test_multiline_run_uses_breaks() {
        let blocks = vec![ContentBlock {
            kind: BlockKind::Paragraph,
            runs: vec![TextRun::plain("CGPA: 9.1\nDean's list")],
        }];
        let artifact = assemble(&blocks, "Engineer").unwrap();
        let document = part(&artifact.bytes, "word/document.xml");
        assert!(document.contains("CGPA: 9.1</w:t><w:br/>"));
        assert!(document.contains("Dean&apos;s list"));
    }
}

//! Flow-document (DOCX) backend.
//!
//! Writes the OOXML package directly with the `zip` crate: content types,
//! relationships, `word/document.xml` and one `word/media/*.png` part per
//! chart. The document carries no page-break logic; the consuming word
//! processor reflows it. Assembly is all-or-nothing: any failed part fails
//! the whole export.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::report::{ChartKind, Report, SectionBody};

/// Fixed display width per chart kind, in EMUs (914,400 per inch). Heights
/// are derived from each bitmap's pixel aspect ratio so images are never
/// stretched anisotropically.
const BAR_WIDTH_EMU: u64 = 5_000_000;
const PIE_WIDTH_EMU: u64 = 4_000_000;

/// A4 page in twips, 1-inch margins.
const PAGE_W_TWIPS: u32 = 11_906;
const PAGE_H_TWIPS: u32 = 16_838;
const MARGIN_TWIPS: u32 = 1_440;

struct MediaImage {
    file_name: String,
    rel_id: String,
    png: Vec<u8>,
}

pub fn render(report: &Report) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();

    // Validate every chart bitmap by decoding it before any part is written.
    let mut media: Vec<MediaImage> = Vec::new();
    let mut body = String::new();

    push_paragraph(&mut body, &run(&report.title, 28, true, "000000"), 200, true);
    push_paragraph(&mut body, &run(&report.subtitle, 24, true, "000000"), 400, true);
    push_paragraph(&mut body, &run(&report.period_label, 20, false, "666666"), 600, true);

    for section in &report.sections {
        match &section.body {
            SectionBody::MetricsCards(cards) => {
                push_paragraph(&mut body, &run(section.title, 22, true, "000000"), 300, false);
                push_metrics_table(&mut body, cards);
                // Spacer paragraph after the table.
                body.push_str(r#"<w:p><w:pPr><w:spacing w:after="400"/></w:pPr></w:p>"#);
            }
            SectionBody::Chart(kind, bitmap) => {
                push_paragraph(&mut body, &run(section.title, 22, true, "000000"), 300, false);
                let decoded = image::load_from_memory(&bitmap.png)
                    .map_err(|e| Error::Encoding(format!("{}: {e}", section.title)))?;
                if decoded.width() != bitmap.width_px || decoded.height() != bitmap.height_px {
                    return Err(Error::Encoding(format!(
                        "{}: bitmap dimensions disagree with its PNG",
                        section.title
                    )));
                }
                let width_emu = match kind {
                    ChartKind::Bar => BAR_WIDTH_EMU,
                    ChartKind::Pie => PIE_WIDTH_EMU,
                };
                let height_emu =
                    (width_emu as f64 * bitmap.height_px as f64 / bitmap.width_px as f64) as u64;
                let index = media.len() + 1;
                let image = MediaImage {
                    file_name: format!("chart{index}.png"),
                    rel_id: format!("rId{}", index + 10),
                    png: bitmap.png.clone(),
                };
                push_image_paragraph(&mut body, &image, index, width_emu, height_emu);
                media.push(image);
            }
            SectionBody::Highlights { title, lifetime_views } => {
                push_paragraph(&mut body, &run(section.title, 22, true, "000000"), 300, false);
                push_paragraph(&mut body, &run(title, 20, true, "000000"), 200, false);
                push_paragraph(
                    &mut body,
                    &run(&format!("Lifetime Views: {lifetime_views}"), 18, false, "000000"),
                    400,
                    false,
                );
            }
            SectionBody::Insights(insights) => {
                push_paragraph(&mut body, &run(section.title, 22, true, "000000"), 300, false);
                for insight in insights {
                    push_paragraph(
                        &mut body,
                        &run(&format!("\u{2022} {insight}"), 18, false, "000000"),
                        300,
                        false,
                    );
                }
            }
        }
    }

    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document"#,
            r#" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            r#"<w:body>{body}"#,
            r#"<w:sectPr>"#,
            r#"<w:pgSz w:w="{pw}" w:h="{ph}" w:orient="portrait"/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}"/>"#,
            r#"</w:sectPr>"#,
            r#"</w:body></w:document>"#
        ),
        body = body,
        pw = PAGE_W_TWIPS,
        ph = PAGE_H_TWIPS,
        m = MARGIN_TWIPS,
    );

    let bytes = write_package(&document, &media)?;
    if bytes.is_empty() {
        return Err(Error::Assembly("empty DOCX output".into()));
    }

    log::info!(
        "DOCX render: {} section(s), {} image(s), {:.1}ms",
        report.sections.len(),
        media.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}

fn write_package(document: &str, media: &[MediaImage]) -> Result<Vec<u8>, Error> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types().as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1""#,
            r#" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument""#,
            r#" Target="word/document.xml"/>"#,
            r#"</Relationships>"#
        )
        .as_bytes(),
    )?;

    zip.start_file("word/_rels/document.xml.rels", options)?;
    let mut rels = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    ));
    for image in media {
        let _ = write!(
            rels,
            concat!(
                r#"<Relationship Id="{}""#,
                r#" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image""#,
                r#" Target="media/{}"/>"#
            ),
            image.rel_id, image.file_name,
        );
    }
    rels.push_str("</Relationships>");
    zip.write_all(rels.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;

    // PNGs are already compressed; store them as-is.
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for image in media {
        zip.start_file(format!("word/media/{}", image.file_name), stored)?;
        zip.write_all(&image.png)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn content_types() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Override PartName="/word/document.xml""#,
        r#" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"</Types>"#
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A single text run. `size` is in half-points, matching `w:sz`.
fn run(text: &str, size: u32, bold: bool, color: &str) -> String {
    format!(
        concat!(
            r#"<w:r><w:rPr>{bold}<w:color w:val="{color}"/><w:sz w:val="{size}"/></w:rPr>"#,
            r#"<w:t xml:space="preserve">{text}</w:t></w:r>"#
        ),
        bold = if bold { "<w:b/>" } else { "" },
        color = color,
        size = size,
        text = escape_xml(text),
    )
}

/// Paragraph wrapper with spacing-after in twentieths of a point.
fn push_paragraph(body: &mut String, run_xml: &str, spacing_after: u32, centered: bool) {
    let _ = write!(
        body,
        r#"<w:p><w:pPr>{jc}<w:spacing w:after="{after}"/></w:pPr>{run}</w:p>"#,
        jc = if centered { r#"<w:jc w:val="center"/>"# } else { "" },
        after = spacing_after,
        run = run_xml,
    );
}

fn push_metrics_table(body: &mut String, cards: &[crate::report::MetricEntry]) {
    body.push_str(concat!(
        r#"<w:tbl><w:tblPr>"#,
        r#"<w:tblW w:w="5000" w:type="pct"/>"#,
        r#"<w:tblBorders>"#,
        r#"<w:top w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"<w:left w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"<w:bottom w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"<w:right w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"<w:insideH w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"<w:insideV w:val="single" w:sz="4" w:color="auto"/>"#,
        r#"</w:tblBorders></w:tblPr><w:tr>"#
    ));
    let cell_pct = 5000 / cards.len().max(1) as u32;
    for card in cards {
        let _ = write!(
            body,
            concat!(
                r#"<w:tc><w:tcPr><w:tcW w:w="{pct}" w:type="pct"/></w:tcPr>"#,
                r#"<w:p>{label}</w:p><w:p>{value}</w:p></w:tc>"#
            ),
            pct = cell_pct,
            label = run(card.label, 18, false, "000000"),
            value = run(&card.value, 24, true, "000000"),
        );
    }
    body.push_str("</w:tr></w:tbl>");
}

fn push_image_paragraph(
    body: &mut String,
    image: &MediaImage,
    index: usize,
    width_emu: u64,
    height_emu: u64,
) {
    let _ = write!(
        body,
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="400"/></w:pPr>"#,
            r#"<w:r><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Chart {id}"/>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{file}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic>"#,
            r#"</wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = width_emu,
        cy = height_emu,
        id = index,
        file = image.file_name,
        rel = image.rel_id,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_escaping_covers_markup_chars() {
        assert_eq!(escape_xml("a & b < c > \"d\""), "a &amp; b &lt; c &gt; &quot;d&quot;");
    }

    #[test]
    fn run_sets_half_point_size_and_bold() {
        let xml = run("KEY METRICS", 22, true, "000000");
        assert!(xml.contains(r#"<w:sz w:val="22"/>"#));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("KEY METRICS"));
        assert!(!run("x", 18, false, "666666").contains("<w:b/>"));
    }

    #[test]
    fn emu_height_preserves_aspect_ratio() {
        // 700x400 bar chart at 5,000,000 EMU wide -> 2,857,142 EMU tall.
        let h = (BAR_WIDTH_EMU as f64 * 400.0 / 700.0) as u64;
        assert_eq!(h, 2_857_142);
        // 1120x400 pie at 4,000,000 EMU wide.
        let h = (PIE_WIDTH_EMU as f64 * 400.0 / 1120.0) as u64;
        assert_eq!(h, 1_428_571);
    }
}

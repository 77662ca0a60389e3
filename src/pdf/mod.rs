//! Fixed-page PDF backend.
//!
//! Layout runs in page units (mm on an A4 portrait page) with a single
//! downward cursor; coordinates are converted to PDF points (origin bottom
//! left) only at draw time. Every section calls `check_new_page` before
//! drawing so no section straddles a page boundary it did not plan for.

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::chart::surface::Rgb;
use crate::error::Error;
use crate::fonts::{FontEntry, register_font, to_winansi_bytes};
use crate::model::RenderSettings;
use crate::report::{Report, Section, SectionBody};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
const MM_TO_PT: f32 = 72.0 / 25.4;

const CARD_HEIGHT: f32 = 20.0;
const CARD_GAP: f32 = 3.0;
const CARD_CORNER: f32 = 2.0;
const HEADING_ADVANCE: f32 = 8.0;
const LINE_ADVANCE: f32 = 6.0;
const IMAGE_TRAILING_GAP: f32 = 10.0;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

struct Theme {
    primary: [f32; 3],
    background: [f32; 3],
    text: [f32; 3],
    border: [f32; 3],
}

fn channels(hex: &str) -> [f32; 3] {
    let Rgb(r, g, b) = Rgb::from_hex(hex);
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

/// One export's mutable layout state: the page list, the open content stream
/// and the downward cursor. Constructed per render call, never shared.
struct Engine<'a> {
    settings: &'a RenderSettings,
    theme: Theme,
    regular: FontEntry,
    bold: FontEntry,
    pages: Vec<Content>,
    content: Content,
    y: f32,
}

impl<'a> Engine<'a> {
    fn new(settings: &'a RenderSettings, regular: FontEntry, bold: FontEntry) -> Engine<'a> {
        let theme = Theme {
            primary: channels(&settings.primary_color),
            background: channels(&settings.background_color),
            text: channels(&settings.text_color),
            border: channels(&settings.border_color),
        };
        let mut content = Content::new();
        paint_background(&mut content, theme.background);
        Engine {
            settings,
            theme,
            regular,
            bold,
            pages: Vec::new(),
            content,
            y: settings.margin,
        }
    }

    fn margin(&self) -> f32 {
        self.settings.margin
    }

    fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * self.margin()
    }

    /// Break to a fresh page if `required` page units would overflow the
    /// bottom margin. Returns whether a break happened.
    fn check_new_page(&mut self, required: f32) -> bool {
        if self.y + required > PAGE_HEIGHT - self.margin() {
            let mut fresh = Content::new();
            paint_background(&mut fresh, self.theme.background);
            self.pages.push(std::mem::replace(&mut self.content, fresh));
            self.y = self.margin();
            true
        } else {
            false
        }
    }

    /// Draw `text` with its baseline at `y` page units from the page top.
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, bold: bool, color: [f32; 3], align: Align) {
        let font = if bold { &self.bold } else { &self.regular };
        let x = match align {
            Align::Left => x,
            Align::Center => x - font.text_width(text, size) / (2.0 * MM_TO_PT),
        };
        let bytes = to_winansi_bytes(text);
        self.content
            .set_fill_rgb(color[0], color[1], color[2])
            .begin_text()
            .set_font(Name(font.pdf_name.as_bytes()), size)
            .next_line(x * MM_TO_PT, (PAGE_HEIGHT - y) * MM_TO_PT)
            .show(Str(&bytes))
            .end_text();
    }

    /// Greedy word wrap against the metric tables, in page units.
    fn split_to_width(&self, text: &str, max_width: f32, size: f32) -> Vec<String> {
        let max_pt = max_width * MM_TO_PT;
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.regular.text_width(&candidate, size) <= max_pt || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Filled and stroked rounded rectangle, top-left anchored in page units.
    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32) {
        // Cubic Bézier circle-quadrant approximation.
        let k = 0.552_284_8 * r;
        let (x0, x1) = (x * MM_TO_PT, (x + w) * MM_TO_PT);
        let (y0, y1) = ((PAGE_HEIGHT - y - h) * MM_TO_PT, (PAGE_HEIGHT - y) * MM_TO_PT);
        let (r, k) = (r * MM_TO_PT, k * MM_TO_PT);
        let b = self.theme.border;
        self.content
            .set_fill_rgb(1.0, 1.0, 1.0)
            .set_stroke_rgb(b[0], b[1], b[2])
            .set_line_width(0.2 * MM_TO_PT)
            .move_to(x0 + r, y1)
            .line_to(x1 - r, y1)
            .cubic_to(x1 - r + k, y1, x1, y1 - r + k, x1, y1 - r)
            .line_to(x1, y0 + r)
            .cubic_to(x1, y0 + r - k, x1 - r + k, y0, x1 - r, y0)
            .line_to(x0 + r, y0)
            .cubic_to(x0 + r - k, y0, x0, y0 + r - k, x0, y0 + r)
            .line_to(x0, y1 - r)
            .cubic_to(x0, y1 - r + k, x0 + r - k, y1, x0 + r, y1)
            .close_path()
            .fill_nonzero_and_stroke();
    }

    fn section_heading(&mut self, title: &str) {
        let primary = self.theme.primary;
        self.text(
            title,
            self.margin(),
            self.y,
            self.settings.heading_font_size,
            true,
            primary,
            Align::Left,
        );
        self.y += HEADING_ADVANCE;
    }

    fn render_section(&mut self, section: &Section, image_name: Option<&str>) {
        match &section.body {
            SectionBody::MetricsCards(cards) => {
                self.check_new_page(CARD_HEIGHT + HEADING_ADVANCE + 5.0);
                self.section_heading(section.title);
                let gaps = (cards.len() as f32 - 1.0) * CARD_GAP;
                let card_w = (self.content_width() - gaps) / cards.len() as f32;
                let (text, primary) = (self.theme.text, self.theme.primary);
                let pad = self.settings.card_padding;
                for (i, card) in cards.iter().enumerate() {
                    let x = self.margin() + i as f32 * (card_w + CARD_GAP);
                    self.rounded_rect(x, self.y, card_w, CARD_HEIGHT, CARD_CORNER);
                    self.text(
                        card.label,
                        x + pad,
                        self.y + 5.0,
                        self.settings.body_font_size - 1.0,
                        false,
                        text,
                        Align::Left,
                    );
                    self.text(
                        &card.value,
                        x + pad,
                        self.y + 12.0,
                        self.settings.heading_font_size,
                        true,
                        primary,
                        Align::Left,
                    );
                }
                self.y += CARD_HEIGHT + 5.0;
            }
            SectionBody::Chart(_, bitmap) => {
                self.check_new_page(self.settings.chart_height + 20.0);
                self.y += section.gap_before;
                self.section_heading(section.title);
                let width = self.content_width();
                let height = width / bitmap.aspect_ratio() as f32;
                if let Some(name) = image_name {
                    let x = self.margin() * MM_TO_PT;
                    let y_bottom = (PAGE_HEIGHT - self.y - height) * MM_TO_PT;
                    self.content.save_state();
                    self.content.transform([
                        width * MM_TO_PT,
                        0.0,
                        0.0,
                        height * MM_TO_PT,
                        x,
                        y_bottom,
                    ]);
                    self.content.x_object(Name(name.as_bytes()));
                    self.content.restore_state();
                }
                self.y += height + IMAGE_TRAILING_GAP;
            }
            SectionBody::Highlights { title, lifetime_views } => {
                self.check_new_page(40.0);
                self.section_heading(section.title);
                let text = self.theme.text;
                let size = self.settings.body_font_size + 1.0;
                for line in self.split_to_width(title, self.content_width(), size) {
                    self.check_new_page(LINE_ADVANCE);
                    self.text(&line, self.margin(), self.y, size, false, text, Align::Left);
                    self.y += LINE_ADVANCE;
                }
                self.y += 3.0;
                self.text(
                    &format!("Lifetime Views: {lifetime_views}"),
                    self.margin(),
                    self.y,
                    self.settings.body_font_size,
                    false,
                    text,
                    Align::Left,
                );
                self.y += 10.0;
            }
            SectionBody::Insights(insights) => {
                self.check_new_page(50.0);
                self.section_heading(section.title);
                let text = self.theme.text;
                let size = self.settings.body_font_size;
                let wrap_width = self.content_width() - 5.0;
                for insight in insights {
                    for line in self.split_to_width(&format!("\u{2022} {insight}"), wrap_width, size)
                    {
                        self.check_new_page(LINE_ADVANCE);
                        self.text(&line, self.margin(), self.y, size, false, text, Align::Left);
                        self.y += LINE_ADVANCE;
                    }
                    self.y += 3.0;
                }
            }
        }
    }
}

fn paint_background(content: &mut Content, bg: [f32; 3]) {
    content
        .set_fill_rgb(bg[0], bg[1], bg[2])
        .rect(0.0, 0.0, PAGE_WIDTH * MM_TO_PT, PAGE_HEIGHT * MM_TO_PT)
        .fill_nonzero();
}

pub fn render(report: &Report, settings: &RenderSettings) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let regular = register_font(&mut pdf, settings.font_family, false, "F1".into(), alloc());
    let bold = register_font(&mut pdf, settings.font_family, true, "F2".into(), alloc());

    // Embed each chart bitmap as a FlateDecode RGB XObject before layout so
    // the content streams can reference them by name.
    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    let mut section_image_names: Vec<Option<String>> = Vec::new();
    for section in &report.sections {
        if let SectionBody::Chart(_, bitmap) = &section.body {
            let decoded = image::load_from_memory(&bitmap.png)
                .map_err(|e| Error::Encoding(e.to_string()))?
                .to_rgb8();
            let (w, h) = (decoded.width(), decoded.height());
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(decoded.as_raw(), 6);
            let xobj_ref = alloc();
            let pdf_name = format!("Im{}", image_xobjects.len() + 1);
            let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            drop(xobj);
            image_xobjects.push((pdf_name.clone(), xobj_ref));
            section_image_names.push(Some(pdf_name));
        } else {
            section_image_names.push(None);
        }
    }

    let t_images = t0.elapsed();

    let mut engine = Engine::new(settings, regular, bold);

    // Header block: title, subtitle at 0.8x, centered period line.
    let center = PAGE_WIDTH / 2.0;
    let (primary, text) = (engine.theme.primary, engine.theme.text);
    engine.text(
        &report.title,
        center,
        engine.y,
        settings.title_font_size,
        true,
        primary,
        Align::Center,
    );
    engine.y += 8.0;
    engine.text(
        &report.subtitle,
        center,
        engine.y,
        settings.title_font_size * 0.8,
        false,
        text,
        Align::Center,
    );
    engine.y += 10.0;
    engine.text(
        &report.period_label,
        center,
        engine.y,
        settings.body_font_size,
        false,
        text,
        Align::Center,
    );
    engine.y += 15.0;

    for (section, image_name) in report.sections.iter().zip(&section_image_names) {
        engine.render_section(section, image_name.as_deref());
    }

    let Engine {
        mut pages,
        content,
        regular,
        bold,
        ..
    } = engine;
    // The last, possibly partial page still counts; sections always draw
    // something after a break, so no empty trailing page can occur.
    pages.push(content);

    let t_layout = t0.elapsed();

    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in pages.into_iter().enumerate() {
        let raw = page.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(
            0.0,
            0.0,
            PAGE_WIDTH * MM_TO_PT,
            PAGE_HEIGHT * MM_TO_PT,
        ))
        .parent(pages_id)
        .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            fonts.pair(Name(regular.pdf_name.as_bytes()), regular.font_ref);
            fonts.pair(Name(bold.pdf_name.as_bytes()), bold.font_ref);
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let out = pdf.finish();
    if out.is_empty() {
        return Err(Error::Assembly("empty PDF output".into()));
    }

    log::info!(
        "PDF render: images={:.1}ms, layout={:.1}ms, assembly={:.1}ms, {} page(s)",
        t_images.as_secs_f64() * 1000.0,
        (t_layout - t_images).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_layout).as_secs_f64() * 1000.0,
        n,
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RenderSettings;

    fn probe() -> Engine<'static> {
        // Engine construction needs font entries; register against a scratch Pdf.
        let settings: &'static RenderSettings = Box::leak(Box::new(RenderSettings::default()));
        let mut pdf = Pdf::new();
        let regular = register_font(
            &mut pdf,
            settings.font_family,
            false,
            "F1".into(),
            Ref::new(1),
        );
        let bold = register_font(&mut pdf, settings.font_family, true, "F2".into(), Ref::new(2));
        Engine::new(settings, regular, bold)
    }

    #[test]
    fn cursor_breaks_exactly_at_bottom_margin() {
        let mut engine = probe();
        engine.y = PAGE_HEIGHT - engine.margin() - 30.0;
        assert!(!engine.check_new_page(30.0));
        assert_eq!(engine.pages.len(), 0);
        assert!(engine.check_new_page(31.0));
        assert_eq!(engine.pages.len(), 1);
        assert_eq!(engine.y, engine.margin());
    }

    #[test]
    fn split_to_width_wraps_and_preserves_words() {
        let engine = probe();
        let text = "The high traffic to the careers pages correlates strongly with the \
                    resumes received, indicating high intent among job seekers.";
        let lines = engine.split_to_width(text, 60.0, 9.0);
        assert!(lines.len() > 1);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
        // A word never exceeds the limit unless it is alone on its line.
        for line in &lines {
            if line.contains(' ') {
                assert!(engine.regular.text_width(line, 9.0) <= 60.0 * MM_TO_PT);
            }
        }
    }

    #[test]
    fn aspect_ratio_governs_placed_height() {
        // 700x400 bitmap into a 180-unit content width -> 102.857 units tall.
        let width = 180.0f32;
        let height = width / (700.0 / 400.0);
        assert!((height - 102.857).abs() < 0.01);
    }
}

//! Base-14 font registration for the PDF backend.
//!
//! Report text only needs the standard Helvetica/Times/Courier families, so
//! fonts are registered as non-embedded Type1 fonts with WinAnsiEncoding and
//! approximate width tables. Chart text never goes through here; it is
//! rasterized into the chart bitmaps.

use pdf_writer::{Name, Pdf, Ref};

use crate::model::FontFamily;

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    widths_1000: Vec<f32>,
}

impl FontEntry {
    /// Width of a single character in 1000-units of em.
    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    /// Width of `text` at `font_size` points.
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => {
                if bold {
                    722.0
                } else {
                    667.0
                }
            } // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Approximate Times widths at 1000 units/em for WinAnsi chars 32..=255.
fn times_widths(bold: bool) -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 250.0,
            33..=47 => 333.0,
            48..=57 => 500.0,
            58..=64 => 333.0,
            73 | 74 => 333.0,
            77 | 87 => 889.0, // M W
            65..=90 => {
                if bold {
                    722.0
                } else {
                    667.0
                }
            }
            91..=96 => 333.0,
            102 | 105 | 106 | 108 | 116 => 278.0,
            109 | 119 => 722.0, // m w
            97..=122 => {
                if bold {
                    500.0
                } else {
                    444.0
                }
            }
            _ => 500.0,
        })
        .collect()
}

/// Courier is monospaced: every glyph is 600 units wide.
fn courier_widths() -> Vec<f32> {
    vec![600.0; 224]
}

fn base_font_name(family: FontFamily, bold: bool) -> &'static [u8] {
    match (family, bold) {
        (FontFamily::Helvetica, false) => b"Helvetica",
        (FontFamily::Helvetica, true) => b"Helvetica-Bold",
        (FontFamily::Times, false) => b"Times-Roman",
        (FontFamily::Times, true) => b"Times-Bold",
        (FontFamily::Courier, false) => b"Courier",
        (FontFamily::Courier, true) => b"Courier-Bold",
    }
}

pub(crate) fn register_font(
    pdf: &mut Pdf,
    family: FontFamily,
    bold: bool,
    pdf_name: String,
    font_ref: Ref,
) -> FontEntry {
    pdf.type1_font(font_ref)
        .base_font(Name(base_font_name(family, bold)))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    let widths_1000 = match family {
        FontFamily::Helvetica => helvetica_widths(bold),
        FontFamily::Times => times_widths(bold),
        FontFamily::Courier => courier_widths(),
    };
    FontEntry {
        pdf_name,
        font_ref,
        widths_1000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winansi_maps_dash_and_bullet() {
        assert_eq!(to_winansi_bytes("a\u{2013}b"), vec![b'a', 0x96, b'b']);
        assert_eq!(to_winansi_bytes("\u{2022} x"), vec![0x95, b' ', b'x']);
        // Unmappable chars are dropped, not replaced.
        assert_eq!(to_winansi_bytes("a\u{4e2d}b"), vec![b'a', b'b']);
    }

    #[test]
    fn courier_is_monospaced() {
        let mut pdf = Pdf::new();
        let entry = register_font(
            &mut pdf,
            FontFamily::Courier,
            false,
            "F1".into(),
            Ref::new(1),
        );
        assert_eq!(
            entry.text_width("iii", 10.0),
            entry.text_width("MMM", 10.0)
        );
    }

    #[test]
    fn wide_text_is_wider() {
        let mut pdf = Pdf::new();
        let entry = register_font(
            &mut pdf,
            FontFamily::Helvetica,
            false,
            "F1".into(),
            Ref::new(1),
        );
        assert!(entry.text_width("MMM", 10.0) > entry.text_width("iii", 10.0));
    }
}

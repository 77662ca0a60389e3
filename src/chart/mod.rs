//! Chart rasterization: palette/scale utilities plus the bar and pie chart
//! renderers. Everything here is pure CPU work over in-memory structures;
//! the output is a PNG-encoded [`Bitmap`] consumed read-only by the two
//! document assemblers.

mod bar;
pub mod font;
mod pie;
pub mod surface;

pub use bar::render_bar_chart;
pub use pie::render_pie_chart;

use crate::chart::surface::Rgb;

/// A rasterized chart: PNG bytes plus the pixel dimensions the layout stages
/// need for aspect-ratio math. Produced once per chart, never mutated.
#[derive(Debug)]
pub struct Bitmap {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Bitmap {
    pub fn aspect_ratio(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

/// Cyclic palette lookup: entry `index` gets `palette[index % len]`.
/// Precondition (caller-enforced): `palette` is non-empty.
pub fn color_for(index: usize, palette: &[String]) -> Rgb {
    Rgb::from_hex(&palette[index % palette.len()])
}

/// Axis maximum with 10% headroom, rounded up to an integer.
/// An all-zero dataset yields 0; proportion math must guard with
/// [`axis_divisor`] instead of dividing by this directly.
pub fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(0.0f64, f64::max);
    (max * 1.1).ceil()
}

/// Divisor for bar/slice proportions: a flat axis (max 0) draws zero-height
/// bars instead of dividing by zero.
pub fn axis_divisor(axis_max: f64) -> f64 {
    if axis_max <= 0.0 { 1.0 } else { axis_max }
}

/// Truncate a category label for axis/legend display: anything longer than
/// 20 chars becomes its first 17 chars plus an ellipsis.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > 20 {
        let head: String = label.chars().take(17).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Locale-style number formatting: thousands-grouped integer part, with one
/// decimal kept for fractional values (e.g. `1180` → "1,180", `77.8` →
/// "77.8").
pub fn format_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let int_part = rounded.trunc() as i64;
    let frac = (rounded - rounded.trunc()).abs();
    let grouped = group_thousands(int_part);
    if frac >= 0.05 {
        format!("{grouped}.{}", (frac * 10.0).round() as u32)
    } else {
        grouped
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 { format!("-{out}") } else { out }
}

/// Percentage of `value` within `total`, rounded to one decimal place.
pub fn percentage(value: f64, total: f64) -> String {
    format!("{:.1}", value / total * 100.0)
}

//! Pie chart rasterizer with an inline legend.
//!
//! The bitmap is wider than it is tall: the pie occupies a square region on
//! the left and the legend fills the horizontal overflow, so the multiplier
//! passed by the caller controls how much room labels get.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::chart::surface::{Align, Rgb, Surface};
use crate::chart::{Bitmap, color_for, format_value, percentage, truncate_label};
use crate::error::Error;
use crate::model::DatasetEntry;

const BORDER_COLOR: Rgb = Rgb(0xE0, 0xE0, 0xE0);
const LEGEND_BOX_BORDER: Rgb = Rgb(0xCC, 0xCC, 0xCC);
const LEGEND_VALUE_COLOR: Rgb = Rgb(0x66, 0x66, 0x66);
const LEGEND_PITCH: f64 = 38.0;
const LEGEND_BOX_SIZE: i64 = 14;

/// Render `data` as a pie chart. The pie fits a `min(width, height)` square;
/// the full bitmap is that square stretched horizontally by
/// `width_multiplier` to hold the legend.
pub fn render_pie_chart(
    data: &[DatasetEntry],
    width: u32,
    height: u32,
    palette: &[String],
    width_multiplier: f64,
) -> Result<Bitmap, Error> {
    if data.is_empty() {
        return Err(Error::InvalidDataset("pie chart".into()));
    }
    let total: f64 = data.iter().map(|d| d.value).sum();
    if total <= 0.0 {
        return Err(Error::InvalidDataset("pie chart".into()));
    }

    let size = width.min(height) as f64;
    let canvas_width = (size * width_multiplier).round() as u32;
    let canvas_height = size as u32;
    let mut surface = Surface::new(canvas_width, canvas_height, Rgb::WHITE);
    surface.stroke_rect(0, 0, canvas_width as i64, canvas_height as i64, 2, BORDER_COLOR);

    let radius = size * 0.4;
    let center_x = size * 0.5;
    let center_y = size * 0.5;
    let legend_x = (size * 1.05) as i64;
    let legend_start_y = size * 0.15;

    // Slices start at twelve o'clock and proceed clockwise in dataset order.
    let mut current = -FRAC_PI_2;
    for (index, item) in data.iter().enumerate() {
        let sweep = item.value / total * TAU;
        surface.fill_slice(center_x, center_y, radius, current, sweep, color_for(index, palette));
        current += sweep;
    }

    // White separators over the shared slice edges and the rim.
    let mut current = -FRAC_PI_2;
    for item in data {
        let sweep = item.value / total * TAU;
        for edge in [current, current + sweep] {
            surface.line(
                center_x,
                center_y,
                center_x + edge.cos() * radius,
                center_y + edge.sin() * radius,
                3,
                Rgb::WHITE,
            );
        }
        surface.stroke_arc(center_x, center_y, radius, current, sweep, 3, Rgb::WHITE);
        current += sweep;
    }

    for (index, item) in data.iter().enumerate() {
        let legend_y = legend_start_y + index as f64 * LEGEND_PITCH;
        let box_top = legend_y as i64 - LEGEND_BOX_SIZE / 2;
        surface.fill_rect(
            legend_x,
            box_top,
            LEGEND_BOX_SIZE,
            LEGEND_BOX_SIZE,
            color_for(index, palette),
        );
        surface.stroke_rect(
            legend_x,
            box_top,
            LEGEND_BOX_SIZE,
            LEGEND_BOX_SIZE,
            1,
            LEGEND_BOX_BORDER,
        );

        let text_x = legend_x + LEGEND_BOX_SIZE + 8;
        surface.draw_text(
            &truncate_label(&item.label),
            text_x,
            legend_y as i64 - 6,
            2,
            Rgb::BLACK,
            Align::Left,
        );
        surface.draw_text(
            &format!(
                "{} ({}%)",
                format_value(item.value),
                percentage(item.value, total)
            ),
            text_x,
            legend_y as i64 + 8,
            1,
            LEGEND_VALUE_COLOR,
            Align::Left,
        );
    }

    Ok(Bitmap {
        png: surface.encode_png()?,
        width_px: canvas_width,
        height_px: canvas_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<DatasetEntry> {
        vec![
            DatasetEntry::new("Desktop", 1602.0),
            DatasetEntry::new("Mobile", 1080.0),
            DatasetEntry::new("Tablet", 33.0),
        ]
    }

    fn palette() -> Vec<String> {
        vec!["#4A90E2".into(), "#50C878".into(), "#FF6B6B".into()]
    }

    #[test]
    fn empty_and_zero_total_are_rejected() {
        assert!(matches!(
            render_pie_chart(&[], 400, 400, &palette(), 2.8),
            Err(Error::InvalidDataset(_))
        ));
        let zeros = vec![DatasetEntry::new("A", 0.0), DatasetEntry::new("B", 0.0)];
        assert!(matches!(
            render_pie_chart(&zeros, 400, 400, &palette(), 2.8),
            Err(Error::InvalidDataset(_))
        ));
    }

    #[test]
    fn canvas_is_widened_by_the_multiplier() {
        let bmp = render_pie_chart(&sample(), 400, 400, &palette(), 2.8).unwrap();
        assert_eq!((bmp.width_px, bmp.height_px), (1120, 400));
        let wider = render_pie_chart(&sample(), 400, 400, &palette(), 3.5).unwrap();
        assert_eq!(wider.width_px, 1400);
    }

    #[test]
    fn square_region_comes_from_the_smaller_axis() {
        let bmp = render_pie_chart(&sample(), 700, 400, &palette(), 2.8).unwrap();
        assert_eq!((bmp.width_px, bmp.height_px), (1120, 400));
    }

    #[test]
    fn first_slice_starts_at_twelve_o_clock() {
        // Desktop holds 59% of the total, so the pixel just below twelve
        // o'clock and slightly clockwise belongs to the first palette color.
        let bmp = render_pie_chart(&sample(), 400, 400, &palette(), 2.8).unwrap();
        let img = image::load_from_memory(&bmp.png).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(220, 100).0, [0x4A, 0x90, 0xE2]);
    }

    #[test]
    fn slice_sweeps_cover_the_full_circle() {
        let data = sample();
        let total: f64 = data.iter().map(|d| d.value).sum();
        let sum: f64 = data.iter().map(|d| d.value / total * TAU).sum();
        assert!((sum - TAU).abs() < 1e-9);
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_pie_chart(&sample(), 400, 400, &palette(), 2.8).unwrap();
        let b = render_pie_chart(&sample(), 400, 400, &palette(), 2.8).unwrap();
        assert_eq!(a.png, b.png);
    }
}

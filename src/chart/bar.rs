//! Vertical bar chart rasterizer.

use crate::chart::surface::{Align, Rgb, Surface};
use crate::chart::{Bitmap, axis_divisor, axis_max, color_for, format_value, truncate_label};
use crate::error::Error;
use crate::model::DatasetEntry;

const LEFT_PADDING: f64 = 70.0;
const RIGHT_PADDING: f64 = 30.0;
const TOP_PADDING: f64 = 50.0;
/// Leaves room for the rotated x-axis labels under the plot area.
const BOTTOM_PADDING: f64 = 100.0;
const BAR_SPACING: f64 = 15.0;
const MAX_BAR_WIDTH: f64 = 60.0;
const GRID_LINES: u32 = 5;

const GRID_COLOR: Rgb = Rgb(0xE5, 0xE7, 0xEB);
const BORDER_COLOR: Rgb = Rgb(0xE0, 0xE0, 0xE0);
const AXIS_LABEL_COLOR: Rgb = Rgb(0x66, 0x66, 0x66);
const CATEGORY_LABEL_COLOR: Rgb = Rgb(0x33, 0x33, 0x33);

/// Render `data` as a bar chart bitmap of `width`×`height` pixels. Bars are
/// drawn in dataset order, colored cyclically from `palette`.
pub fn render_bar_chart(
    data: &[DatasetEntry],
    width: u32,
    height: u32,
    palette: &[String],
) -> Result<Bitmap, Error> {
    if data.is_empty() {
        return Err(Error::InvalidDataset("bar chart".into()));
    }

    let mut surface = Surface::new(width, height, Rgb::WHITE);
    surface.stroke_rect(0, 0, width as i64, height as i64, 2, BORDER_COLOR);

    let chart_width = width as f64 - LEFT_PADDING - RIGHT_PADDING;
    let chart_height = height as f64 - TOP_PADDING - BOTTOM_PADDING;
    let values: Vec<f64> = data.iter().map(|d| d.value).collect();
    let rounded_max = axis_max(&values);
    let divisor = axis_divisor(rounded_max);
    let available = chart_width - (data.len() - 1) as f64 * BAR_SPACING;
    let bar_width = (available / data.len() as f64).min(MAX_BAR_WIDTH);

    // Gridlines with scale labels, bottom to top.
    for i in 0..=GRID_LINES {
        let y = TOP_PADDING + (chart_height / GRID_LINES as f64) * (GRID_LINES - i) as f64;
        let value = rounded_max / GRID_LINES as f64 * i as f64;
        surface.line(LEFT_PADDING, y, width as f64 - RIGHT_PADDING, y, 1, GRID_COLOR);
        surface.draw_text(
            &format_value(value),
            (LEFT_PADDING - 10.0) as i64,
            // Middle-baseline: center the glyph box on the gridline.
            y.round() as i64 - 3,
            1,
            AXIS_LABEL_COLOR,
            Align::Right,
        );
    }

    // Axes over the gridlines.
    let baseline = TOP_PADDING + chart_height;
    surface.line(
        LEFT_PADDING,
        baseline,
        width as f64 - RIGHT_PADDING,
        baseline,
        2,
        Rgb::BLACK,
    );
    surface.line(LEFT_PADDING, TOP_PADDING, LEFT_PADDING, baseline, 2, Rgb::BLACK);

    for (index, item) in data.iter().enumerate() {
        let bar_height = item.value / divisor * chart_height;
        let x = LEFT_PADDING + index as f64 * (bar_width + BAR_SPACING);
        let y = baseline - bar_height;
        let color = color_for(index, palette);

        surface.fill_rect(
            x.round() as i64,
            y.round() as i64,
            bar_width.round() as i64,
            bar_height.round() as i64,
            color,
        );
        if bar_height >= 1.0 {
            surface.stroke_rect(
                x.round() as i64,
                y.round() as i64,
                bar_width.round() as i64,
                bar_height.round() as i64,
                1,
                Rgb::WHITE,
            );
        }

        // Value label above the bar, but only where the bar is tall enough
        // that the label reads as belonging to it.
        if bar_height > 20.0 {
            let text = format_value(item.value);
            // Bottom of the glyph box sits 5px above the bar top.
            surface.draw_text(
                &text,
                (x + bar_width / 2.0).round() as i64,
                (y - 5.0).round() as i64 - 14,
                2,
                Rgb::BLACK,
                Align::Center,
            );
        }

        // Category label, rotated 45° counter-clockwise about a pivot 25px
        // below the axis so long labels fan out without overlapping.
        surface.draw_text_rotated(
            &truncate_label(&item.label),
            x + bar_width / 2.0,
            baseline + 25.0,
            -std::f64::consts::FRAC_PI_4,
            1,
            CATEGORY_LABEL_COLOR,
        );
    }

    Ok(Bitmap {
        png: surface.encode_png()?,
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<DatasetEntry> {
        vec![
            DatasetEntry::new("Homepage", 1180.0),
            DatasetEntry::new("About", 219.0),
            DatasetEntry::new("Vacancies", 188.0),
            DatasetEntry::new("Blog", 180.0),
            DatasetEntry::new("Contact", 146.0),
        ]
    }

    fn palette() -> Vec<String> {
        vec!["#4A90E2".into(), "#50C878".into(), "#FF6B6B".into()]
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(matches!(
            render_bar_chart(&[], 700, 400, &palette()),
            Err(Error::InvalidDataset(_))
        ));
    }

    #[test]
    fn output_has_requested_dimensions() {
        let bmp = render_bar_chart(&sample(), 700, 400, &palette()).unwrap();
        assert_eq!((bmp.width_px, bmp.height_px), (700, 400));
        let img = image::load_from_memory(&bmp.png).unwrap();
        assert_eq!((img.width(), img.height()), (700, 400));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_bar_chart(&sample(), 700, 400, &palette()).unwrap();
        let b = render_bar_chart(&sample(), 700, 400, &palette()).unwrap();
        assert_eq!(a.png, b.png);
    }

    #[test]
    fn tallest_bar_reaches_its_proportional_height() {
        // axis max is ceil(1180 * 1.1) = 1298; plot area is 400-50-100 = 250
        // tall, so the Homepage bar spans 1180/1298*250 ≈ 227 px upward from
        // the baseline at y = 50+250 = 300. Sample inside the first bar near
        // its top.
        let bmp = render_bar_chart(&sample(), 700, 400, &palette()).unwrap();
        let img = image::load_from_memory(&bmp.png).unwrap().to_rgb8();
        let top = 300.0 - 1180.0 / 1298.0 * 250.0;
        // First bar occupies x = 70..130 (5 entries, 540 available -> 60 wide).
        let inside = img.get_pixel(100, top as u32 + 5).0;
        assert_eq!(inside, [0x4A, 0x90, 0xE2]);
        let above = img.get_pixel(100, top as u32 - 30).0;
        assert_eq!(above, [255, 255, 255]);
    }

    #[test]
    fn value_labels_follow_the_bar_height_threshold() {
        // axis max is 1298, plot 250 tall: the first bar is ~227 px and gets
        // its value drawn above it, the second is ~9.6 px and stays bare.
        let data = vec![
            DatasetEntry::new("Tall", 1180.0),
            DatasetEntry::new("Short", 50.0),
        ];
        let bmp = render_bar_chart(&data, 700, 400, &palette()).unwrap();
        let img = image::load_from_memory(&bmp.png).unwrap().to_rgb8();
        let has_black = |x0: u32, x1: u32, y0: u32, y1: u32| {
            (y0..y1).any(|y| (x0..x1).any(|x| img.get_pixel(x, y).0 == [0, 0, 0]))
        };
        // Two bars, 60 px wide: x = 70..130 and x = 145..205. Scan starts
        // right of the 2 px y-axis stroke so only label glyphs can match.
        assert!(has_black(72, 130, 45, 72));
        assert!(!has_black(145, 205, 260, 290));
    }

    #[test]
    fn all_zero_values_draw_no_bars() {
        let data = vec![DatasetEntry::new("A", 0.0), DatasetEntry::new("B", 0.0)];
        let bmp = render_bar_chart(&data, 700, 400, &palette()).unwrap();
        let img = image::load_from_memory(&bmp.png).unwrap().to_rgb8();
        // Mid-plot (off the gridlines, which sit at multiples of 50) stays
        // background white.
        assert_eq!(img.get_pixel(300, 220).0, [255, 255, 255]);
    }
}

//! Raw RGB pixel surface the chart rasterizers draw onto.
//!
//! Geometry is computed in f64 and committed to integer pixels without
//! antialiasing, so identical inputs produce bit-identical buffers. The
//! surface knows nothing about charts; it only fills, strokes and blits.

use image::ImageEncoder;

use crate::chart::font;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#rrggbb` (leading `#` optional). Unparseable input falls back
    /// to black, matching the tolerant color handling of the settings layer.
    pub fn from_hex(hex: &str) -> Rgb {
        let h = hex.strip_prefix('#').unwrap_or(hex);
        if h.len() != 6 || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::warn!("unparseable color {hex:?}, using black");
            return Rgb::BLACK;
        }
        let byte = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).unwrap_or(0);
        Rgb(byte(0), byte(2), byte(4))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGB, row-major
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Rgb) -> Surface {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[background.0, background.1, background.2]);
        }
        Surface {
            width,
            height,
            pixels,
        }
    }

    pub fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.pixels[idx] = color.0;
        self.pixels[idx + 1] = color.1;
        self.pixels[idx + 2] = color.2;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb) {
        for py in y..y + h {
            for px in x..x + w {
                self.put(px, py, color);
            }
        }
    }

    /// Stroke a rectangle outline with the given line thickness, drawn inward
    /// from the rectangle edge.
    pub fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64, thickness: i64, color: Rgb) {
        self.fill_rect(x, y, w, thickness, color);
        self.fill_rect(x, y + h - thickness, w, thickness, color);
        self.fill_rect(x, y, thickness, h, color);
        self.fill_rect(x + w - thickness, y, thickness, h, color);
    }

    /// Straight line between two points, plotted as thickness×thickness
    /// blocks along the longer axis.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, thickness: u32, color: Rgb) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        let half = (thickness / 2) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let cx = (x0 + dx * t).round() as i64;
            let cy = (y0 + dy * t).round() as i64;
            for oy in -half..thickness as i64 - half {
                for ox in -half..thickness as i64 - half {
                    self.put(cx + ox, cy + oy, color);
                }
            }
        }
    }

    /// Fill a pie slice. Angles are in radians, measured clockwise from the
    /// positive x axis (screen coordinates, y down), matching canvas arcs.
    pub fn fill_slice(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        sweep: f64,
        color: Rgb,
    ) {
        let tau = std::f64::consts::TAU;
        let x_min = (cx - radius).floor() as i64;
        let x_max = (cx + radius).ceil() as i64;
        let y_min = (cy - radius).floor() as i64;
        let y_max = (cy + radius).ceil() as i64;
        for py in y_min..=y_max {
            for px in x_min..=x_max {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let angle = dy.atan2(dx);
                let rel = (angle - start).rem_euclid(tau);
                if rel < sweep {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Stroke an arc of the given thickness by marching along it in small
    /// angular steps.
    pub fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        sweep: f64,
        thickness: u32,
        color: Rgb,
    ) {
        let steps = ((radius * sweep).abs().ceil() as i64).max(1);
        let half = (thickness / 2) as i64;
        for i in 0..=steps {
            let a = start + sweep * i as f64 / steps as f64;
            let px = (cx + a.cos() * radius).round() as i64;
            let py = (cy + a.sin() * radius).round() as i64;
            for oy in -half..thickness as i64 - half {
                for ox in -half..thickness as i64 - half {
                    self.put(px + ox, py + oy, color);
                }
            }
        }
    }

    /// Blit text with the embedded 5×7 font. `y` is the top of the glyph box;
    /// `x` is interpreted per `align`.
    pub fn draw_text(&mut self, text: &str, x: i64, y: i64, scale: u32, color: Rgb, align: Align) {
        let width = font::text_width(text, scale) as i64;
        let origin_x = match align {
            Align::Left => x,
            Align::Center => x - width / 2,
            Align::Right => x - width,
        };
        let mut pen_x = origin_x;
        for ch in text.chars() {
            let cols = font::glyph(ch);
            for (ci, col) in cols.iter().enumerate() {
                for row in 0..font::GLYPH_HEIGHT {
                    if col & (1 << row) != 0 {
                        self.fill_rect(
                            pen_x + (ci as u32 * scale) as i64,
                            y + (row * scale) as i64,
                            scale as i64,
                            scale as i64,
                            color,
                        );
                    }
                }
            }
            pen_x += (font::ADVANCE * scale) as i64;
        }
    }

    /// Blit text rotated about a pivot point. The text is centered on the
    /// pivot horizontally with its glyph-box top on the pivot, then each font
    /// pixel is rotated by `angle` radians — the same transform a canvas
    /// translate/rotate/fill-text sequence produces for rotated axis labels.
    pub fn draw_text_rotated(
        &mut self,
        text: &str,
        pivot_x: f64,
        pivot_y: f64,
        angle: f64,
        scale: u32,
        color: Rgb,
    ) {
        let (sin, cos) = angle.sin_cos();
        let width = font::text_width(text, scale) as f64;
        let mut pen = -width / 2.0;
        for ch in text.chars() {
            let cols = font::glyph(ch);
            for (ci, col) in cols.iter().enumerate() {
                for row in 0..font::GLYPH_HEIGHT {
                    if col & (1 << row) == 0 {
                        continue;
                    }
                    // Draw each font pixel as a scale×scale block so the
                    // rotated glyph has no dropout holes.
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let lx = pen + (ci as u32 * scale + sx) as f64;
                            let ly = (row * scale + sy) as f64;
                            let rx = pivot_x + lx * cos - ly * sin;
                            let ry = pivot_y + lx * sin + ly * cos;
                            self.put(rx.round() as i64, ry.round() as i64, color);
                        }
                    }
                }
            }
            pen += (font::ADVANCE * scale) as f64;
        }
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#4A90E2"), Rgb(0x4A, 0x90, 0xE2));
        assert_eq!(Rgb::from_hex("e5e7eb"), Rgb(0xE5, 0xE7, 0xEB));
        assert_eq!(Rgb::from_hex("not-a-color"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#12345"), Rgb::BLACK);
    }

    #[test]
    fn put_clips_out_of_bounds() {
        let mut s = Surface::new(4, 4, Rgb::WHITE);
        s.put(-1, 0, Rgb::BLACK);
        s.put(0, 4, Rgb::BLACK);
        s.put(100, 100, Rgb::BLACK);
        // No panic and the surface is untouched.
        let png = s.encode_png().unwrap();
        assert!(!png.is_empty());
    }

    #[test]
    fn fill_slice_full_circle_covers_center_ring() {
        let mut s = Surface::new(50, 50, Rgb::WHITE);
        s.fill_slice(25.0, 25.0, 20.0, 0.0, std::f64::consts::TAU, Rgb::BLACK);
        let decoded = image::load_from_memory(&s.encode_png().unwrap())
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded.get_pixel(25, 25).0, [0, 0, 0]);
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn png_round_trip_preserves_dimensions() {
        let s = Surface::new(123, 45, Rgb::WHITE);
        let decoded = image::load_from_memory(&s.encode_png().unwrap()).unwrap();
        assert_eq!(decoded.width(), 123);
        assert_eq!(decoded.height(), 45);
    }
}

// THEORY:
// The `raster` module is the only place pixels are touched. It wraps an RGBA
// buffer with the handful of primitives the frame builder composes frames
// from: filled and alpha-blended rectangles, outlines, the two marker shapes
// (diamond and square), and a tiny built-in glyph font for frame titles.
// Every primitive clips against the buffer bounds, so callers can draw with
// signed coordinates without range checks.

use image::{Rgba, RgbaImage};

/// RGBA color, straight alpha.
pub type Color = [u8; 4];

pub const BLACK: Color = [0, 0, 0, 255];
pub const WHITE: Color = [255, 255, 255, 255];
pub const RED: Color = [255, 0, 0, 255];
pub const PANEL_GRAY: Color = [51, 51, 51, 255];
pub const GRID_GRAY: Color = [70, 70, 70, 255];

/// A drawing surface for one frame.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Allocate a canvas filled with a background color. Allocating fresh
    /// per frame is the pipeline's clear-and-redraw contract.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background)),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64 {
            self.image.put_pixel(x as u32, y as u32, Rgba(color));
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f64) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let under = self.image.get_pixel(x as u32, y as u32).0;
        let mix = |top: u8, bottom: u8| {
            (top as f64 * alpha + bottom as f64 * (1.0 - alpha)).round() as u8
        };
        let blended = [
            mix(color[0], under[0]),
            mix(color[1], under[1]),
            mix(color[2], under[2]),
            255,
        ];
        self.image.put_pixel(x as u32, y as u32, Rgba(blended));
    }

    /// Fill the half-open rectangle [x0, x1) x [y0, y1).
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, color);
            }
        }
    }

    /// Alpha-blend a rectangle over the existing contents.
    pub fn blend_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color, alpha: f64) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, alpha);
            }
        }
    }

    /// One-pixel rectangle outline on the half-open bounds.
    pub fn outline_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        for x in x0..x1 {
            self.put(x, y0, color);
            self.put(x, y1 - 1, color);
        }
        for y in y0..y1 {
            self.put(x0, y, color);
            self.put(x1 - 1, y, color);
        }
    }

    pub fn horizontal_line(&mut self, x0: i64, x1: i64, y: i64, color: Color) {
        for x in x0..x1 {
            self.put(x, y, color);
        }
    }

    pub fn vertical_line(&mut self, x: i64, y0: i64, y1: i64, color: Color) {
        for y in y0..y1 {
            self.put(x, y, color);
        }
    }

    /// Filled square marker centered on (cx, cy).
    pub fn draw_square(&mut self, cx: i64, cy: i64, half: i64, color: Color) {
        self.fill_rect(cx - half, cy - half, cx + half + 1, cy + half + 1, color);
    }

    /// Filled diamond marker centered on (cx, cy).
    pub fn draw_diamond(&mut self, cx: i64, cy: i64, half: i64, color: Color) {
        for dy in -half..=half {
            let span = half - dy.abs();
            for dx in -span..=span {
                self.put(cx + dx, cy + dy, color);
            }
        }
    }

    /// Draw a text line with the built-in glyph font at an integer scale.
    /// Returns the x coordinate just past the rendered text.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, scale: i64, color: Color) -> i64 {
        let mut cursor = x;
        for ch in text.chars() {
            let glyph = glyph_rows(ch.to_ascii_uppercase());
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..3i64 {
                    if (bits >> (2 - col)) & 1 == 1 {
                        self.fill_rect(
                            cursor + col * scale,
                            y + row as i64 * scale,
                            cursor + (col + 1) * scale,
                            y + (row as i64 + 1) * scale,
                            color,
                        );
                    }
                }
            }
            cursor += 4 * scale;
        }
        cursor
    }
}

/// Pixel width of a text line drawn by `Canvas::draw_text`.
pub fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * 4 * scale
}

// 3x5 glyphs, one byte per row, low three bits used. Covers what frame
// titles need: digits, the title letters, colon and space.
const fn glyph_rows(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b010, 0b010, 0b111],
    }
}

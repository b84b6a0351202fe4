use {
    crate::*,
    crates_image::{Rgb, RgbImage},
    font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts},
    rusttype::{Scale, point},
    std::{fmt, path::Path},
};

/// Default TrueType font for the overlay.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Default TrueType pixel height.
pub const DEFAULT_FONT_SIZE: f32 = 32.0;

/// Default magnification of the built-in 8x8 font.
pub const DEFAULT_BITMAP_SCALE: u32 = 3;

const GLYPH_SIZE: u32 = 8;

/// Pixel extents of a rendered line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
}

/// Font used to draw overlay text.
#[derive(Clone)]
pub enum Font {
    TrueType {
        font: rusttype::Font<'static>,
        scale: Scale,
    },
    /// Built-in 8x8 bitmap glyphs (ASCII and Latin-1), each pixel drawn as a
    /// `scale` x `scale` block.
    Bitmap { scale: u32 },
}

impl Font {
    /// Load a TrueType/OpenType font file at the given pixel height.
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| ImageError::Font(format!("{path:?}: {e}")))?;
        let font = rusttype::Font::try_from_vec(data)
            .ok_or_else(|| ImageError::Font(format!("{path:?}: not a usable font")))?;
        Ok(Font::TrueType {
            font,
            scale: Scale::uniform(size),
        })
    }

    /// Load a font file, falling back to the built-in bitmap font.
    pub fn load_or_builtin(path: impl AsRef<Path>, size: f32) -> Self {
        match Self::load(path, size) {
            Ok(font) => font,
            Err(error) => {
                log::warn!("overlay: {error}, using built-in font");
                Self::builtin(DEFAULT_BITMAP_SCALE)
            }
        }
    }

    pub fn builtin(scale: u32) -> Self {
        Font::Bitmap {
            scale: scale.max(1),
        }
    }

    /// Measure a single line of text.
    pub fn measure(&self, text: &str) -> TextSize {
        match self {
            Font::TrueType { font, scale } => {
                let v_metrics = font.v_metrics(*scale);
                let mut width = 0.0f32;
                for glyph in font.layout(text, *scale, point(0.0, v_metrics.ascent)) {
                    let advance = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
                    width = width.max(advance);
                    if let Some(bounds) = glyph.pixel_bounding_box() {
                        width = width.max(bounds.max.x as f32);
                    }
                }
                TextSize {
                    width: width.ceil() as u32,
                    height: (v_metrics.ascent - v_metrics.descent).ceil() as u32,
                }
            }
            Font::Bitmap { scale } => TextSize {
                width: text.chars().count() as u32 * GLYPH_SIZE * scale,
                height: GLYPH_SIZE * scale,
            },
        }
    }

    /// Draw a line of text with its top-left corner at `(x, y)`.
    ///
    /// Pixels outside the canvas are skipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match self {
            Font::TrueType { font, scale } => {
                let v_metrics = font.v_metrics(*scale);
                let origin = point(x as f32, y as f32 + v_metrics.ascent);
                for glyph in font.layout(text, *scale, origin) {
                    if let Some(bounds) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            blend(
                                canvas,
                                bounds.min.x + gx as i32,
                                bounds.min.y + gy as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                }
            }
            Font::Bitmap { scale } => {
                let scale = *scale as i32;
                let advance = GLYPH_SIZE as i32 * scale;
                for (i, c) in text.chars().enumerate() {
                    let Some(rows) = bitmap_glyph(c) else {
                        continue;
                    };
                    let left = x + i as i32 * advance;
                    for (row, bits) in rows.iter().enumerate() {
                        for col in 0..GLYPH_SIZE as i32 {
                            if bits & (1 << col) == 0 {
                                continue;
                            }
                            let px = left + col * scale;
                            let py = y + row as i32 * scale;
                            fill_rect(canvas, px, py, scale as u32, scale as u32, color);
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Font::TrueType { scale, .. } => write!(f, "Font::TrueType({}px)", scale.y),
            Font::Bitmap { scale } => write!(f, "Font::Bitmap(x{scale})"),
        }
    }
}

fn bitmap_glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

/// Fill a rectangle, clipped to the canvas.
pub(crate) fn fill_rect(canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x + width as i32).clamp(0, canvas.width() as i32) as u32;
    let y1 = (y + height as i32).clamp(0, canvas.height() as i32) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
    }
}

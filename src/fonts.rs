//! Bundled fonts, text measurement, and word wrapping.
//!
//! The rasterizer needs real glyph outlines, so the crate embeds DejaVu Sans
//! (regular + bold) and parses them with `ttf-parser`. Embedding keeps the
//! capture stage self-contained and deterministic across machines.

use ttf_parser::Face;

use crate::error::{FakturError, Result};

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
static DEJAVU_SANS_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// A parsed face plus the metrics the layout and raster stages need.
pub struct FontSlot {
    face: Face<'static>,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
}

impl FontSlot {
    fn parse(bytes: &'static [u8], name: &str) -> Result<Self> {
        let face = Face::parse(bytes, 0)
            .map_err(|e| FakturError::Font(format!("{name}: {e}")))?;
        Ok(Self {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            face,
        })
    }

    /// Scale factor from font units to pixels at `font_size`.
    pub fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em
    }

    pub fn face(&self) -> &Face<'static> {
        &self.face
    }
}

/// Holds the regular and bold faces used everywhere on the invoice sheet.
pub struct FontManager {
    regular: FontSlot,
    bold: FontSlot,
}

impl FontManager {
    /// Parse the bundled DejaVu Sans faces.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            regular: FontSlot::parse(DEJAVU_SANS, "DejaVuSans")?,
            bold: FontSlot::parse(DEJAVU_SANS_BOLD, "DejaVuSans-Bold")?,
        })
    }

    pub fn slot(&self, bold: bool) -> &FontSlot {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Measure the advance width of a string at `font_size` pixels.
    /// Characters without a glyph fall back to half an em.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let slot = self.slot(bold);
        let scale = slot.scale(font_size);
        let mut width = 0.0f32;
        for ch in text.chars() {
            match slot.face.glyph_index(ch) {
                Some(gid) => {
                    width += slot.face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                }
                None => width += font_size * 0.5,
            }
        }
        width
    }

    /// Baseline offset from the top of a text line, in pixels.
    pub fn ascender_px(&self, font_size: f32, bold: bool) -> f32 {
        let slot = self.slot(bold);
        slot.ascender * slot.scale(font_size)
    }

    /// Natural line height from the face metrics, in pixels.
    pub fn line_height_px(&self, font_size: f32, bold: bool) -> f32 {
        let slot = self.slot(bold);
        (slot.ascender - slot.descender) * slot.scale(font_size)
    }

    /// Word-wrap `text` to fit within `max_width` pixels.
    pub fn wrap_text(&self, text: &str, font_size: f32, bold: bool, max_width: f32) -> Vec<String> {
        if max_width <= 0.0 || text.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines: Vec<String> = Vec::new();
        for paragraph in text.split('\n') {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            for word in &words {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if self.measure_text_width(&candidate, font_size, bold) > max_width
                    && !current.is_empty()
                {
                    lines.push(current);
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_fonts_parse() {
        let fonts = FontManager::bundled().unwrap();
        assert!(fonts.ascender_px(14.0, false) > 0.0);
        assert!(fonts.ascender_px(14.0, true) > 0.0);
    }

    #[test]
    fn bold_runs_wider_than_regular() {
        let fonts = FontManager::bundled().unwrap();
        let regular = fonts.measure_text_width("Balance Due", 14.0, false);
        let bold = fonts.measure_text_width("Balance Due", 14.0, true);
        assert!(regular > 0.0);
        assert!(bold > regular);
    }

    #[test]
    fn wrap_splits_long_text() {
        let fonts = FontManager::bundled().unwrap();
        let lines = fonts.wrap_text(
            "Deluxe double room with garden view and breakfast",
            13.0,
            false,
            120.0,
        );
        assert!(lines.len() >= 2, "expected wrapping, got {lines:?}");
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        let fonts = FontManager::bundled().unwrap();
        let lines = fonts.wrap_text("Deluxe Room", 13.0, false, 400.0);
        assert_eq!(lines, vec!["Deluxe Room".to_string()]);
    }

    #[test]
    fn empty_text_yields_single_empty_line() {
        let fonts = FontManager::bundled().unwrap();
        assert_eq!(fonts.wrap_text("", 13.0, false, 100.0), vec![String::new()]);
    }
}

//! Sheet – the intermediate representation between the invoice template and
//! the rasterizer. A sheet is a flat, fully positioned list of boxes in
//! layout pixels (96 DPI, origin at the page's top-left); it is the
//! "frozen" off-screen document the capture stage consumes.

use serde::{Deserialize, Serialize};

/// A4 paper in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Layout resolution: CSS reference pixels.
pub const LAYOUT_DPI: f32 = 96.0;

/// Convert millimetres to layout pixels at 96 DPI.
pub fn mm_to_px(mm: f32) -> f32 {
    mm * LAYOUT_DPI / 25.4
}

/// A complete single-page document ready for capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    /// Page width in layout pixels.
    pub width: f32,
    /// Page height in layout pixels.
    pub height: f32,
    /// Draw-ordered boxes; later boxes paint over earlier ones.
    pub boxes: Vec<SheetBox>,
}

impl Sheet {
    /// Create an empty A4 sheet (793.7 × 1122.5 px at 96 DPI).
    pub fn a4() -> Self {
        Self {
            width: mm_to_px(A4_WIDTH_MM),
            height: mm_to_px(A4_HEIGHT_MM),
            boxes: Vec::new(),
        }
    }

    /// Serialize to JSON, for layout inspection and debugging.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// All text runs on the sheet, in draw order.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.boxes
            .iter()
            .filter_map(|b| b.text.as_ref().map(|t| t.text.as_str()))
    }
}

/// A positioned rectangle with optional fill, stroke, text, or image
/// content. Position and size are in layout pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<[f32; 3]>,
    pub stroke: Option<Stroke>,
    pub text: Option<TextRun>,
    pub image: Option<ImageRef>,
}

impl SheetBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: None,
            stroke: None,
            text: None,
            image: None,
        }
    }
}

/// Rectangle outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    pub color: [f32; 3],
}

/// Horizontal placement of a text run within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// A single line of text. The template pre-wraps long content, so a run
/// never spans multiple lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub align: TextAlign,
    pub color: [f32; 3],
}

/// An image slot. `src` is either a filesystem path or a base64
/// `data:` URI; resolution happens at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_sheet_dimensions() {
        let sheet = Sheet::a4();
        assert!((sheet.width - 793.7008).abs() < 0.01);
        assert!((sheet.height - 1122.5197).abs() < 0.01);
    }

    #[test]
    fn json_dump_is_parseable() {
        let mut sheet = Sheet::a4();
        let mut b = SheetBox::new(10.0, 20.0, 100.0, 30.0);
        b.text = Some(TextRun {
            text: "INVOICE".to_string(),
            font_size: 24.0,
            bold: true,
            align: TextAlign::Center,
            color: [0.0, 0.0, 0.0],
        });
        sheet.boxes.push(b);

        let json = sheet.to_json();
        let parsed: Sheet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.boxes.len(), 1);
        assert_eq!(parsed.text_runs().next(), Some("INVOICE"));
    }
}

//! Rasterizer – captures a [`Sheet`] as an RGBA bitmap at a fixed
//! supersampling factor. Rect fills and strokes are painted directly,
//! glyphs are filled from `ttf-parser` outlines with a non-zero-winding
//! scanline pass, and images are decoded, contain-fitted, and alpha-blended.
//!
//! The whole pass is synchronous: when it returns, every box has been
//! painted, so the packaging stage can never capture a partial sheet.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use ttf_parser::OutlineBuilder;

use crate::error::{FakturError, Result};
use crate::fonts::FontManager;
use crate::sheet::{Sheet, SheetBox, TextAlign, TextRun};

/// Default supersampling factor; doubles both pixel dimensions so text
/// stays crisp after the PDF viewer scales the page down.
pub const DEFAULT_SUPERSAMPLE: f32 = 2.0;

/// Hard cap on either canvas dimension.
const MAX_CANVAS_DIM: u32 = 8192;

const PAGE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Paint `sheet` into a fresh bitmap at `scale` device pixels per layout
/// pixel. Fails on a non-finite, non-positive, or oversized scale.
pub fn rasterize(sheet: &Sheet, fonts: &FontManager, scale: f32) -> Result<RgbaImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(FakturError::Raster(format!(
            "invalid supersampling factor {scale}"
        )));
    }
    let width = (sheet.width * scale).round() as i64;
    let height = (sheet.height * scale).round() as i64;
    if width < 1 || height < 1 || width > MAX_CANVAS_DIM as i64 || height > MAX_CANVAS_DIM as i64 {
        return Err(FakturError::Raster(format!(
            "canvas {width}x{height} out of range (max {MAX_CANVAS_DIM})"
        )));
    }

    let mut canvas = RgbaImage::from_pixel(width as u32, height as u32, PAGE_WHITE);
    for b in &sheet.boxes {
        paint_box(&mut canvas, fonts, b, scale);
    }
    Ok(canvas)
}

fn paint_box(canvas: &mut RgbaImage, fonts: &FontManager, b: &SheetBox, scale: f32) {
    if let Some(color) = b.fill {
        fill_rect(
            canvas,
            b.x * scale,
            b.y * scale,
            b.width * scale,
            b.height * scale,
            to_rgba(color),
        );
    }
    if let Some(stroke) = &b.stroke {
        stroke_rect(
            canvas,
            b.x * scale,
            b.y * scale,
            b.width * scale,
            b.height * scale,
            (stroke.width * scale).max(1.0),
            to_rgba(stroke.color),
        );
    }
    if let Some(img) = &b.image {
        draw_image(canvas, &img.src, b, scale);
    }
    if let Some(run) = &b.text {
        draw_text(canvas, fonts, b, run, scale);
    }
}

fn to_rgba(c: [f32; 3]) -> Rgba<u8> {
    Rgba([
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        255,
    ])
}

/// Opaque axis-aligned fill, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((y + h).ceil().max(0.0) as u32).min(canvas.height());
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Outline as four edge fills.
fn stroke_rect(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, sw: f32, color: Rgba<u8>) {
    fill_rect(canvas, x, y, w, sw, color);
    fill_rect(canvas, x, y + h - sw, w, sw, color);
    fill_rect(canvas, x, y, sw, h, color);
    fill_rect(canvas, x + w - sw, y, sw, h, color);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Decode and blit an image slot, contain-fitted and centered in its box.
/// Undecodable or missing sources are skipped with a warning, never a
/// failure — an invoice without its logo still exports.
fn draw_image(canvas: &mut RgbaImage, src: &str, b: &SheetBox, scale: f32) {
    let decoded = match load_image_source(src) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("skipping image {src:?}: {e}");
            return;
        }
    };

    let (iw, ih) = (decoded.width() as f32, decoded.height() as f32);
    if iw < 1.0 || ih < 1.0 {
        return;
    }
    let bw = b.width * scale;
    let bh = b.height * scale;
    let ratio = (bw / iw).min(bh / ih);
    let tw = ((iw * ratio).round() as u32).max(1);
    let th = ((ih * ratio).round() as u32).max(1);
    let ox = b.x * scale + (bw - tw as f32) / 2.0;
    let oy = b.y * scale + (bh - th as f32) / 2.0;

    let resized = imageops::resize(&decoded.to_rgba8(), tw, th, imageops::FilterType::Triangle);
    blend_over(canvas, &resized, ox.round() as i64, oy.round() as i64);
}

/// Resolve an image source: base64 `data:` URI or filesystem path.
fn load_image_source(src: &str) -> std::result::Result<DynamicImage, String> {
    let bytes = if src.starts_with("data:") {
        let comma = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing `,` separator".to_string())?;
        if !src[..comma].contains(";base64") {
            return Err("only base64-encoded data URIs are supported".to_string());
        }
        BASE64_STD
            .decode(src[comma + 1..].trim())
            .map_err(|e| format!("base64 decode error: {e}"))?
    } else {
        std::fs::read(src).map_err(|e| format!("read error: {e}"))?
    };
    image::load_from_memory(&bytes).map_err(|e| format!("decode error: {e}"))
}

/// Source-over composite of `src` onto `canvas` at (`ox`, `oy`).
fn blend_over(canvas: &mut RgbaImage, src: &RgbaImage, ox: i64, oy: i64) {
    for (sx, sy, &Rgba([r, g, b, a])) in src.enumerate_pixels() {
        if a == 0 {
            continue;
        }
        let px = ox + sx as i64;
        let py = oy + sy as i64;
        if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64 {
            continue;
        }
        let dst = canvas.get_pixel_mut(px as u32, py as u32);
        let alpha = a as u32;
        let inv = 255 - alpha;
        dst.0 = [
            ((r as u32 * alpha + dst.0[0] as u32 * inv) / 255) as u8,
            ((g as u32 * alpha + dst.0[1] as u32 * inv) / 255) as u8,
            ((b as u32 * alpha + dst.0[2] as u32 * inv) / 255) as u8,
            255,
        ];
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

fn draw_text(canvas: &mut RgbaImage, fonts: &FontManager, b: &SheetBox, run: &TextRun, scale: f32) {
    let text_width = fonts.measure_text_width(&run.text, run.font_size, run.bold);
    let start_x = match run.align {
        TextAlign::Left => b.x,
        TextAlign::Center => b.x + (b.width - text_width) / 2.0,
        TextAlign::Right => b.x + b.width - text_width,
    };
    let baseline = b.y + fonts.ascender_px(run.font_size, run.bold);

    let slot = fonts.slot(run.bold);
    let face = slot.face();
    // Font units → device pixels.
    let k = slot.scale(run.font_size) * scale;
    let color = to_rgba(run.color);

    let mut pen_x = start_x * scale;
    let baseline_y = baseline * scale;

    for ch in run.text.chars() {
        let Some(gid) = face.glyph_index(ch) else {
            pen_x += run.font_size * 0.5 * scale;
            continue;
        };
        let mut outline = GlyphOutline::new(pen_x, baseline_y, k);
        if face.outline_glyph(gid, &mut outline).is_some() {
            fill_contours(canvas, &outline.contours, color);
        }
        pen_x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * k;
    }
}

/// Collects a glyph outline as flattened device-space contours.
struct GlyphOutline {
    pen_x: f32,
    baseline_y: f32,
    k: f32,
    contours: Vec<Vec<(f32, f32)>>,
    current: Vec<(f32, f32)>,
}

impl GlyphOutline {
    fn new(pen_x: f32, baseline_y: f32, k: f32) -> Self {
        Self {
            pen_x,
            baseline_y,
            k,
            contours: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Font-unit point → device pixel (font y grows up, device y grows down).
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.pen_x + x * self.k, self.baseline_y - y * self.k)
    }

    fn last(&self) -> (f32, f32) {
        *self.current.last().unwrap_or(&(self.pen_x, self.baseline_y))
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.current.len() > 1 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c = self.map(x1, y1);
        let p1 = self.map(x, y);
        const STEPS: u32 = 8;
        for i in 1..=STEPS {
            let t = i as f32 / STEPS as f32;
            let u = 1.0 - t;
            let qx = u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0;
            let qy = u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1;
            self.current.push((qx, qy));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let p1 = self.map(x, y);
        const STEPS: u32 = 16;
        for i in 1..=STEPS {
            let t = i as f32 / STEPS as f32;
            let u = 1.0 - t;
            let cx = u * u * u * p0.0
                + 3.0 * u * u * t * c1.0
                + 3.0 * u * t * t * c2.0
                + t * t * t * p1.0;
            let cy = u * u * u * p0.1
                + 3.0 * u * u * t * c1.1
                + 3.0 * u * t * t * c2.1
                + t * t * t * p1.1;
            self.current.push((cx, cy));
        }
    }

    fn close(&mut self) {
        if self.current.len() > 1 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }
}

/// Non-zero-winding scanline fill over pixel centers.
fn fill_contours(canvas: &mut RgbaImage, contours: &[Vec<(f32, f32)>], color: Rgba<u8>) {
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for c in contours {
        for &(_, y) in c {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y > max_y {
        return;
    }

    let y_start = min_y.floor().max(0.0) as u32;
    let y_end = (max_y.ceil().max(0.0) as u32).min(canvas.height().saturating_sub(1));

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for py in y_start..=y_end {
        let sy = py as f32 + 0.5;
        crossings.clear();

        for contour in contours {
            let n = contour.len();
            for i in 0..n {
                let (x0, y0) = contour[i];
                let (x1, y1) = contour[(i + 1) % n];
                if (y0 <= sy) == (y1 <= sy) {
                    continue;
                }
                let t = (sy - y0) / (y1 - y0);
                let x = x0 + t * (x1 - x0);
                crossings.push((x, if y1 > y0 { 1 } else { -1 }));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0i32;
        let mut span_start = 0.0f32;
        for &(x, dir) in crossings.iter() {
            if winding == 0 {
                span_start = x;
            }
            winding += dir;
            if winding == 0 {
                // Fill pixels whose centers fall inside [span_start, x).
                let px0 = (span_start - 0.5).ceil().max(0.0) as u32;
                let px1 = (x - 0.5).floor().max(-1.0) as i64;
                let px1 = (px1.min(canvas.width() as i64 - 1)).max(-1);
                for px in px0 as i64..=px1 {
                    canvas.put_pixel(px as u32, py, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{ImageRef, SheetBox, Stroke};

    // 1×1 semi-transparent PNG for exercising the data-URI path.
    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    fn fonts() -> FontManager {
        FontManager::bundled().unwrap()
    }

    fn small_sheet() -> Sheet {
        Sheet {
            width: 100.0,
            height: 50.0,
            boxes: Vec::new(),
        }
    }

    #[test]
    fn canvas_has_supersampled_dimensions() {
        let canvas = rasterize(&small_sheet(), &fonts(), 2.0).unwrap();
        assert_eq!(canvas.dimensions(), (200, 100));
    }

    #[test]
    fn invalid_scale_is_an_error() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY, 1_000_000.0] {
            assert!(rasterize(&small_sheet(), &fonts(), bad).is_err(), "scale {bad}");
        }
    }

    #[test]
    fn fill_paints_pixels() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(10.0, 10.0, 20.0, 10.0);
        b.fill = Some([1.0, 0.0, 0.0]);
        sheet.boxes.push(b);
        let canvas = rasterize(&sheet, &fonts(), 1.0).unwrap();
        assert_eq!(canvas.get_pixel(15, 15).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn stroke_paints_edges_not_interior() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(10.0, 10.0, 30.0, 20.0);
        b.stroke = Some(Stroke {
            width: 1.0,
            color: [0.0, 0.0, 0.0],
        });
        sheet.boxes.push(b);
        let canvas = rasterize(&sheet, &fonts(), 1.0).unwrap();
        assert_eq!(canvas.get_pixel(10, 10).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(25, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn text_marks_the_canvas() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(5.0, 5.0, 90.0, 20.0);
        b.text = Some(TextRun {
            text: "INVOICE".to_string(),
            font_size: 14.0,
            bold: true,
            align: TextAlign::Left,
            color: [0.0, 0.0, 0.0],
        });
        sheet.boxes.push(b);
        let canvas = rasterize(&sheet, &fonts(), 2.0).unwrap();
        let dark = canvas.pixels().filter(|p| p.0[0] < 128).count();
        assert!(dark > 50, "expected glyph coverage, got {dark} dark pixels");
    }

    #[test]
    fn data_uri_image_is_blitted() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(0.0, 0.0, 10.0, 10.0);
        b.image = Some(ImageRef {
            src: PIXEL_PNG.to_string(),
        });
        sheet.boxes.push(b);
        let canvas = rasterize(&sheet, &fonts(), 1.0).unwrap();
        let dark = canvas.pixels().filter(|p| p.0[0] < 250).count();
        assert!(dark > 0, "expected the blitted pixel image to darken the canvas");
    }

    #[test]
    fn missing_image_source_is_skipped() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(0.0, 0.0, 10.0, 10.0);
        b.image = Some(ImageRef {
            src: "no/such/asset.png".to_string(),
        });
        sheet.boxes.push(b);
        // Skipped with a warning; the capture itself succeeds.
        let canvas = rasterize(&sheet, &fonts(), 1.0).unwrap();
        assert_eq!(canvas.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn bad_data_uri_is_skipped() {
        let mut sheet = small_sheet();
        let mut b = SheetBox::new(0.0, 0.0, 10.0, 10.0);
        b.image = Some(ImageRef {
            src: "data:image/png;base64,!!!not-base64!!!".to_string(),
        });
        sheet.boxes.push(b);
        assert!(rasterize(&sheet, &fonts(), 1.0).is_ok());
    }
}

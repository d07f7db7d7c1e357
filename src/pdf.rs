//! PDF packaging – embeds the captured bitmap into a single-page A4
//! document using `printpdf` (v0.8 ops-based API).

use std::io::Cursor;

use printpdf::*;

// The printpdf glob re-exports a private `image` module, so the image crate
// must be referenced through absolute paths here.
use ::image::RgbaImage;

use crate::error::{FakturError, Result};

/// A4 in PDF points (1 pt = 1/72 inch).
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// How the captured bitmap is placed on the A4 page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitPolicy {
    /// Scale preserving aspect ratio and center, letterboxing any remainder.
    #[default]
    Contain,
    /// Stretch both axes to fill the page exactly.
    Stretch,
}

/// Package `bitmap` as a one-page A4 PDF with `title` in the metadata.
pub fn package_pdf(bitmap: &RgbaImage, title: &str, fit: FitPolicy) -> Result<Vec<u8>> {
    // PNG-encode the canvas so printpdf can register it as an XObject.
    let mut png_bytes: Vec<u8> = Vec::new();
    ::image::DynamicImage::ImageRgba8(bitmap.clone())
        .write_to(&mut Cursor::new(&mut png_bytes), ::image::ImageFormat::Png)
        .map_err(|e| FakturError::Pdf(format!("PNG encode error: {e}")))?;

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let raw = RawImage::decode_from_bytes(&png_bytes, &mut warnings)
        .map_err(|e| FakturError::Pdf(format!("image embed error: {e}")))?;

    let mut doc = PdfDocument::new(title);
    let xobj_id = doc.add_image(&raw);

    // At dpi=72 printpdf renders 1 px = 1 pt, so the placement math is in
    // pixel units directly.
    let iw = bitmap.width() as f32;
    let ih = bitmap.height() as f32;
    let (scale_x, scale_y, tx, ty) = match fit {
        FitPolicy::Stretch => (A4_WIDTH_PT / iw, A4_HEIGHT_PT / ih, 0.0, 0.0),
        FitPolicy::Contain => {
            let ratio = (A4_WIDTH_PT / iw).min(A4_HEIGHT_PT / ih);
            (
                ratio,
                ratio,
                (A4_WIDTH_PT - iw * ratio) / 2.0,
                (A4_HEIGHT_PT - ih * ratio) / 2.0,
            )
        }
    };

    let ops = vec![Op::UseXobject {
        id: xobj_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(tx)),
            translate_y: Some(Pt(ty)),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    }];

    let page_w = Mm(A4_WIDTH_PT * 0.352778); // pt → mm
    let page_h = Mm(A4_HEIGHT_PT * 0.352778);
    let page = PdfPage::new(page_w, page_h, ops);
    doc.with_pages(vec![page]);

    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, ::image::Rgba([255, 255, 255, 255]))
    }

    fn assert_valid_pdf(bytes: &[u8]) {
        assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
        assert_eq!(&bytes[0..5], b"%PDF-", "missing PDF header");
    }

    #[test]
    fn contain_produces_valid_pdf() {
        let bytes = package_pdf(&bitmap(400, 566), "Invoice-TEST", FitPolicy::Contain).unwrap();
        assert_valid_pdf(&bytes);
    }

    #[test]
    fn stretch_produces_valid_pdf() {
        let bytes = package_pdf(&bitmap(400, 300), "Invoice-TEST", FitPolicy::Stretch).unwrap();
        assert_valid_pdf(&bytes);
    }

    #[test]
    fn default_fit_is_contain() {
        assert_eq!(FitPolicy::default(), FitPolicy::Contain);
    }
}

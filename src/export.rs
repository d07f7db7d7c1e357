//! Export pipeline – ties the stages together: invoice → sheet →
//! supersampled bitmap → single-page A4 PDF, plus the output file name.
//!
//! The pipeline walks Idle → Rendering → Capturing → Packaging → Idle; any
//! failure surfaces as an error and the exporter returns to Idle. A second
//! export triggered while one is running is rejected rather than allowed to
//! overlap.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FakturError, Result};
use crate::fonts::FontManager;
use crate::invoice::Invoice;
use crate::pdf::{package_pdf, FitPolicy};
use crate::raster::{rasterize, DEFAULT_SUPERSAMPLE};
use crate::sheet::Sheet;
use crate::template::{build_sheet, Letterhead};

/// Configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Bitmap placement on the A4 page.
    pub fit: FitPolicy,
    /// Supersampling factor for the capture stage.
    pub raster_scale: f32,
    /// Company block and image assets printed on the sheet.
    pub letterhead: Letterhead,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fit: FitPolicy::default(),
            raster_scale: DEFAULT_SUPERSAMPLE,
            letterhead: Letterhead::default(),
        }
    }
}

/// A finished export: the PDF bytes, the file name to offer, and the sheet
/// the bitmap was captured from (useful for inspection).
#[derive(Debug)]
pub struct ExportedInvoice {
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub sheet: Sheet,
}

/// Output file name: `Invoice-<number>.pdf`, or `Invoice-untitled.pdf` when
/// the invoice number is empty.
pub fn file_name(invoice: &Invoice) -> String {
    let number = &invoice.header.invoice_number;
    let stem = if number.is_empty() { "untitled" } else { number };
    format!("Invoice-{stem}.pdf")
}

/// Runs exports, one at a time.
#[derive(Default)]
pub struct Exporter {
    busy: AtomicBool,
}

/// Releases the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no export is running.
    pub fn is_idle(&self) -> bool {
        !self.busy.load(Ordering::SeqCst)
    }

    /// Run the full pipeline for `invoice`. Fails fast with
    /// [`FakturError::ExportInProgress`] if another export holds the guard.
    pub fn export(&self, invoice: &Invoice, config: &ExportConfig) -> Result<ExportedInvoice> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FakturError::ExportInProgress);
        }
        let _guard = BusyGuard(&self.busy);

        log::debug!("export: rendering sheet");
        let fonts = FontManager::bundled()?;
        let sheet = build_sheet(invoice, &config.letterhead, &fonts);

        log::debug!("export: capturing at {}x", config.raster_scale);
        let bitmap = rasterize(&sheet, &fonts, config.raster_scale)?;

        log::debug!("export: packaging PDF");
        let file_name = file_name(invoice);
        let title = file_name.trim_end_matches(".pdf").to_string();
        let pdf = package_pdf(&bitmap, &title, config.fit)?;

        log::debug!("export: done, {} bytes as {file_name}", pdf.len());
        Ok(ExportedInvoice {
            file_name,
            pdf,
            sheet,
        })
    }
}

/// Convenience: one-shot export with a fresh [`Exporter`].
pub fn export_invoice(invoice: &Invoice, config: &ExportConfig) -> Result<ExportedInvoice> {
    Exporter::new().export(invoice, config)
}

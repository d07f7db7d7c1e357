//! # faktur – hotel invoice form state → single-page A4 PDF
//!
//! This crate turns an in-memory invoice (customer info, ordered
//! room-booking line items, payment info) into a downloadable PDF. The
//! pipeline stages are:
//!
//! 1. **Model** – invoice aggregate with derived subtotal / balance due
//!    ([`invoice`])
//! 2. **Render** – build the fixed-geometry A4 sheet ([`template`], [`sheet`])
//! 3. **Capture** – rasterize the sheet at a 2× supersampling factor
//!    ([`raster`], [`fonts`])
//! 4. **Package** – embed the bitmap in a one-page A4 PDF and name the
//!    output file ([`pdf`], [`export`])
//!
//! Capturing is a synchronous function of the finished sheet, so a partial
//! render can never be exported; overlapping exports are rejected by the
//! [`export::Exporter`] guard.

pub mod error;
pub mod export;
pub mod fonts;
pub mod invoice;
pub mod money;
pub mod pdf;
pub mod raster;
pub mod sheet;
pub mod template;

// Re-exports for convenience
pub use error::{FakturError, Result};
pub use export::{export_invoice, ExportConfig, ExportedInvoice, Exporter};
pub use invoice::{Invoice, ItemField, LineItem};
pub use pdf::FitPolicy;

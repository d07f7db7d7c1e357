use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FakturError {
    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("failed to load bundled font: {0}")]
    Font(String),

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("failed to build PDF: {0}")]
    Pdf(String),

    #[error("failed to parse invoice file {path}: {source}")]
    InvoiceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FakturError>;

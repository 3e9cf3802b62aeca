use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// `page` is the 1-based page number, as printed in a viewer.
    #[error("cannot extract text from page {page}: {source}")]
    PageText {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("page index {index} out of range for a {total}-page document")]
    PageOutOfRange { index: usize, total: usize },
}

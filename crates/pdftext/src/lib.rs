//! Front and back page text extraction from PDFs.
//!
//! Long documents put most of what a reader needs to classify them (title, abstract,
//! conclusion, references) at either end. So we read the first ten pages and the last ten,
//! and mark the gap when there is one. No page is read twice, even when the two windows overlap.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let text = pdftext::extract_text_or_error(Path::new("paper.pdf"));
//! println!("{text}");
//! ```

use std::ops::Range;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

mod error;
mod source;

pub use crate::error::PdfError;
pub use crate::source::{LopdfSource, PageSource};

/// Pages read from the start of the document.
pub const FRONT_PAGES: usize = 10;
/// Pages read from the end of the document.
pub const BACK_PAGES: usize = 10;
/// Documents longer than this get an elision marker between the two windows.
pub const ELIDE_THRESHOLD: usize = FRONT_PAGES + BACK_PAGES;
/// Inserted between the front and back windows of a long document.
pub const ELISION_MARKER: &str = "\n... (middle pages omitted) ...\n\n";

/// Which pages to read for a document of a given length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    pub front: Range<usize>,
    pub elide: bool,
    /// Starts no earlier than `front.end`, so the windows never overlap.
    pub back: Range<usize>,
}

impl PagePlan {
    pub fn for_total(total: usize) -> Self {
        let front_end = total.min(FRONT_PAGES);
        let back_start = front_end.max(total.saturating_sub(BACK_PAGES));
        Self {
            front: 0..front_end,
            elide: total > ELIDE_THRESHOLD,
            back: back_start..total,
        }
    }

    /// Every page index the plan touches, in reading order.
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        self.front.clone().chain(self.back.clone())
    }
}

/// Reads the planned pages from `source`, each followed by a newline.
pub fn extract_front_and_back<S: PageSource + ?Sized>(source: &S) -> Result<String, PdfError> {
    let plan = PagePlan::for_total(source.page_count());
    let mut text = String::new();

    for index in plan.front.clone() {
        text.push_str(&source.page_text(index)?);
        text.push('\n');
    }
    if plan.elide {
        text.push_str(ELISION_MARKER);
    }
    for index in plan.back.clone() {
        text.push_str(&source.page_text(index)?);
        text.push('\n');
    }

    Ok(text)
}

/// Opens `path` and extracts its front and back pages.
pub fn extract_text_from_pdf(path: &Path) -> Result<String, PdfError> {
    let start = Instant::now();
    let result = LopdfSource::open(path).and_then(|source| {
        let pages = source.page_count();
        extract_front_and_back(&source).map(|text| (pages, text))
    });

    match result {
        Ok((pages, text)) => {
            info!(
                path = %path.display(),
                pages,
                text_len = text.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "pdf_extract_success"
            );
            Ok(text)
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "pdf_extract_failure"
            );
            Err(err)
        }
    }
}

/// Same as [`extract_text_from_pdf`], with failures rendered as `"Error: <message>"`.
pub fn extract_text_or_error(path: &Path) -> String {
    extract_text_from_pdf(path).unwrap_or_else(|err| format!("Error: {err}"))
}

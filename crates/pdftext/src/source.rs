use std::path::Path;

use lopdf::Document;

use crate::PdfError;

/// Random access to per-page text, addressed by 0-based index.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> Result<String, PdfError>;
}

/// [`PageSource`] backed by a parsed `lopdf` document.
pub struct LopdfSource {
    doc: Document,
    /// 1-based page numbers in document order.
    page_numbers: Vec<u32>,
}

impl LopdfSource {
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let doc = Document::load(path).map_err(|source| PdfError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        // BTreeMap keys come out sorted.
        let page_numbers = doc.get_pages().into_keys().collect();
        Self { doc, page_numbers }
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let page = *self
            .page_numbers
            .get(index)
            .ok_or(PdfError::PageOutOfRange {
                index,
                total: self.page_numbers.len(),
            })?;
        self.doc
            .extract_text(&[page])
            .map_err(|source| PdfError::PageText { page, source })
    }
}

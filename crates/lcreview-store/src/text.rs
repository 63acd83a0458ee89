//! Plain-text extraction from PDF attachments.
//!
//! Extraction never fails outright: on error the returned text is a
//! sentinel beginning with [`PDF_ERROR_PREFIX`], so downstream reasoning
//! always has something to work with.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Prefix of the text returned when a PDF cannot be read.
pub const PDF_ERROR_PREFIX: &str = "ERROR_READING_PDF:";

/// Extract all page text from a PDF, concatenated in page order.
pub fn read_pdf_text(path: &Path) -> String {
    // pdf-extract panics on some malformed inputs.
    let result = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)));
    match result {
        Ok(Ok(text)) => {
            debug!(path = %path.display(), chars = text.len(), "extracted pdf text");
            text
        }
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "pdf text extraction failed");
            format!("{PDF_ERROR_PREFIX} {e}")
        }
        Err(_) => {
            warn!(path = %path.display(), "pdf text extraction panicked");
            format!("{PDF_ERROR_PREFIX} unreadable document")
        }
    }
}

/// [`read_pdf_text`] on the blocking thread pool.
pub async fn read_pdf_text_async(path: PathBuf) -> String {
    let path_str = path.display().to_string();
    match tokio::task::spawn_blocking(move || read_pdf_text(&path)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path_str, error = %e, "pdf extraction task failed");
            format!("{PDF_ERROR_PREFIX} {e}")
        }
    }
}

/// True when `text` is the extraction-failure sentinel.
pub fn is_extraction_error(text: &str) -> bool {
    text.starts_with(PDF_ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_sentinel() {
        let text = read_pdf_text(Path::new("/nonexistent/credit.pdf"));
        assert!(is_extraction_error(&text), "got: {text}");
    }

    #[test]
    fn non_pdf_yields_sentinel() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not a pdf").unwrap();
        let text = read_pdf_text(file.path());
        assert!(is_extraction_error(&text), "got: {text}");
    }

    #[tokio::test]
    async fn async_variant_yields_sentinel() {
        let text = read_pdf_text_async(PathBuf::from("/nonexistent/invoice.pdf")).await;
        assert!(is_extraction_error(&text));
    }

    #[test]
    fn sentinel_detection() {
        assert!(is_extraction_error("ERROR_READING_PDF: bad xref"));
        assert!(!is_extraction_error("IRREVOCABLE DOCUMENTARY CREDIT"));
    }
}

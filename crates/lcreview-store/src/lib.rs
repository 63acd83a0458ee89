//! Storage layer: PDF text extraction and the LanceDB UCP passage index.

mod error;
pub mod text;

pub use error::StoreError;
pub use text::{PDF_ERROR_PREFIX, is_extraction_error, read_pdf_text, read_pdf_text_async};

#[cfg(feature = "lancedb")]
mod ucp;
#[cfg(feature = "lancedb")]
pub use ucp::{UCP_TABLE, UcpIndex};

//! Attachments and their role in a review.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What an attachment is to the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    /// The letter of credit itself.
    Credit,
    /// Invoice, bill of lading, certificate, etc.
    Supporting,
}

/// A file attached to an LC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub path: PathBuf,
    /// Explicit role. When absent the filename heuristic decides.
    #[serde(default)]
    pub role: Option<DocumentRole>,
}

impl Attachment {
    /// Attachment with no explicit role, named after the path's file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            file_name,
            path,
            role: None,
        }
    }

    pub fn with_role(mut self, role: DocumentRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Resolved role: the explicit tag, else the filename heuristic.
    pub fn effective_role(&self) -> DocumentRole {
        match self.role {
            Some(role) => role,
            None if looks_like_credit(&self.file_name, &self.path) => DocumentRole::Credit,
            None => DocumentRole::Supporting,
        }
    }
}

/// Legacy heuristic: a filename containing "lc" (any case) on a `.pdf` path
/// is taken to be the credit itself.
///
/// This also catches supporting files such as `invoice_lc_copy.pdf`; tag
/// those explicitly with [`DocumentRole::Supporting`].
pub fn looks_like_credit(file_name: &str, path: &Path) -> bool {
    file_name.to_lowercase().contains("lc") && path.to_string_lossy().ends_with(".pdf")
}

/// Attachments to process as supporting documents, in input order.
pub fn supporting_documents(attachments: &[Attachment]) -> Vec<&Attachment> {
    attachments
        .iter()
        .filter(|a| {
            let role = a.effective_role();
            if role == DocumentRole::Credit {
                tracing::debug!(
                    file = %a.file_name,
                    explicit = a.role.is_some(),
                    "skipping credit attachment"
                );
            }
            role == DocumentRole::Supporting
        })
        .collect()
}

//! Core types and deterministic rules for LC review: field maps, discrepancy
//! tables, compliance projections, verdicts, and document roles.

pub mod chunk;
pub mod discrepancy;
pub mod document;
pub mod field_map;
pub mod limits;
pub mod parse;
pub mod summary;
pub mod verdict;
pub mod view;

pub use discrepancy::{ComparisonRow, DiscrepancyTable, RowStatus, classify, compare_fields};
pub use document::{Attachment, DocumentRole, supporting_documents};
pub use field_map::{FieldMap, RAW_OUTPUT_KEY, SupportingDocument};
pub use limits::ReviewLimits;
pub use parse::ParseResult;
pub use summary::summarize;
pub use verdict::{ComplianceOutcome, ComplianceVerdict, OverallStatus, ValidationRecord};
pub use view::{ComplianceView, project};

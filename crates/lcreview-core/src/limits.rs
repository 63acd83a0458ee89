//! Bounds that keep compliance prompts small.

use serde::{Deserialize, Serialize};

/// Truncation limits injected into the summariser and compliance evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLimits {
    /// Passages requested from the UCP context provider.
    pub ucp_top_k: usize,
    /// Maximum characters kept from the best-matching UCP passage.
    pub ucp_context_chars: usize,
    /// Hard cap on discrepancy summary entries across all documents.
    pub max_discrepancies: usize,
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self {
            ucp_top_k: 1,
            ucp_context_chars: 800,
            max_discrepancies: 10,
        }
    }
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = ReviewLimits::default();
        assert_eq!(limits.ucp_top_k, 1);
        assert_eq!(limits.ucp_context_chars, 800);
        assert_eq!(limits.max_discrepancies, 10);
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("Article 14", 800), "Article 14");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("€€€€", 2), "€€");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}

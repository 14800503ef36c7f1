//! Citation deduplication for display.

use crate::types::{Citation, SourceRef};
use std::collections::HashSet;

/// Collapse citations to one source reference per URI.
///
/// The first citation for a URI wins and backend order is preserved.
/// Citations without a URI cannot be shown as provenance and are skipped.
pub fn dedupe_citations(citations: &[Citation], max_snippet: usize) -> Vec<SourceRef> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for citation in citations {
        let Some(uri) = citation.uri.as_deref().map(str::trim) else {
            continue;
        };
        if uri.is_empty() || !seen.insert(uri.to_string()) {
            continue;
        }

        sources.push(SourceRef {
            uri: uri.to_string(),
            snippet: truncate_snippet(citation.excerpt.trim(), max_snippet),
        });
    }

    sources
}

/// Truncate to at most `max_chars` characters, preferring a word boundary.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) if last_space > 0 => format!("{}...", truncated[..last_space].trim_end()),
        _ => format!("{}...", truncated),
    }
}

//! Deterministic rendering of retrieved chunks into a tagged context block.

use std::fmt::Write;

use crate::types::RetrievedChunk;

/// Render chunks as citation-tagged blocks in rank order.
///
/// Pure: the same slice always yields a byte-identical string. An empty
/// slice renders as an empty string; the prompt builder handles the
/// no-context case.
#[must_use]
pub fn format_as_context(chunks: &[RetrievedChunk]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "[DOC_{}] (source: {})", chunk.rank, chunk.source);
        out.push_str(&chunk.content);
        out.push('\n');
    }
    out
}

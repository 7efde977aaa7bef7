//! Natural-boundary text splitting with overlap carry-over.
//!
//! Text is partitioned into pieces at paragraph breaks and sentence endings;
//! pieces still larger than the chunk size are re-split at word boundaries and
//! finally at a hard character cut. Pieces are then merged greedily into
//! chunks no larger than `chunk_size`, carrying trailing pieces of up to
//! `chunk_overlap` characters into the next chunk so boundary information is
//! not lost. Splitting is fully deterministic.

use crate::error::{RagError, Result};
use crate::types::{Chunk, Document};

#[derive(Debug, Clone, Copy)]
pub struct SplitterConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] when `chunk_size` is zero or the
    /// overlap is not strictly smaller than the chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidArgument("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidArgument(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Split a document into ordered chunks of at most `chunk_size`
    /// characters. An empty document yields no chunks; a document shorter
    /// than `chunk_size` yields exactly one.
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        if document.content.is_empty() {
            return Vec::new();
        }

        let pieces = split_pieces(
            &document.content,
            self.config.chunk_size,
            self.config.chunk_overlap,
        );
        let merged = merge_pieces(&pieces, self.config.chunk_size, self.config.chunk_overlap);

        merged
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content,
                source: document.source.clone(),
                chunk_index: i,
            })
            .collect()
    }
}

/// Partition `text` at natural boundaries, then cut any piece still larger
/// than `max` down to size.
fn split_pieces(text: &str, max: usize, overlap: usize) -> Vec<String> {
    let mut out = Vec::new();
    for piece in split_natural(text) {
        if piece.chars().count() <= max {
            out.push(piece);
        } else {
            split_words(&piece, max, overlap, &mut out);
        }
    }
    out
}

/// Split on paragraph breaks and sentence endings. Pieces partition the
/// input: every character lands in exactly one piece, in order.
fn split_natural(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);

        // Split on paragraph breaks
        if chars[i] == '\n' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            current.push(chars[i + 1]);
            i += 1;
            if !current.trim().is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
        }
        // Split on sentence endings followed by space
        else if (chars[i] == '.' || chars[i] == '?' || chars[i] == '!')
            && i + 1 < chars.len()
            && chars[i + 1] == ' '
            && !current.trim().is_empty()
        {
            pieces.push(std::mem::take(&mut current));
        }

        i += 1;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Cut an oversized piece at word boundaries; a single word longer than
/// `max` falls back to overlapping character slices.
fn split_words(text: &str, max: usize, overlap: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0usize;

    for unit in word_units(text) {
        let unit_len = unit.chars().count();

        if unit_len > max {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            out.extend(split_chars(&unit, max, overlap));
            continue;
        }

        if current_len + unit_len > max && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(&unit);
        current_len += unit_len;
    }

    if !current.is_empty() {
        out.push(current);
    }
}

/// Units partition the text: each is a run of non-whitespace characters plus
/// the whitespace run that follows it.
fn word_units(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut in_trailing_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            in_trailing_space = true;
        } else if in_trailing_space {
            units.push(std::mem::take(&mut current));
            in_trailing_space = false;
        }
        current.push(c);
    }

    if !current.is_empty() {
        units.push(current);
    }

    units
}

/// Hard cut into `size`-character slices stepping `size - overlap`, so
/// consecutive slices share exactly `overlap` characters.
fn split_chars(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Merge pieces into chunks of at most `chunk_size` characters, carrying
/// trailing pieces of up to `chunk_overlap` characters into the next chunk.
fn merge_pieces(pieces: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let lens: Vec<usize> = pieces.iter().map(|p| p.chars().count()).collect();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    // Sliding window: only pieces in [window_start, idx) may carry over.
    let mut window_start = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        if !current.is_empty() && current_len + lens[idx] > chunk_size {
            chunks.push(std::mem::take(&mut current));

            // Walk backwards collecting overlap, bounded by both the overlap
            // budget and the room the incoming piece leaves in the chunk.
            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start..idx).rev() {
                let grown = overlap_len + lens[i];
                if grown > chunk_overlap || grown + lens[idx] > chunk_size {
                    break;
                }
                overlap_len = grown;
                overlap_start = i;
            }
            for p in &pieces[overlap_start..idx] {
                current.push_str(p);
            }
            current_len = overlap_len;
            window_start = overlap_start;
        }

        current.push_str(piece);
        current_len += lens[idx];
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

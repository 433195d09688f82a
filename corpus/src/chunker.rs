//! Fixed-window document chunking.
//!
//! Long text is split into overlapping windows sized for the embedding model.
//! Windows are counted in characters, never splitting a code point, and every
//! emitted chunk is trimmed of surrounding whitespace.

use serde::Serialize;

use crate::error::{CorpusError, Result};

/// Default window size in characters.
pub const DEFAULT_MAX_LEN: usize = 800;

/// Default overlap between consecutive windows, in characters.
pub const DEFAULT_OVERLAP: usize = 100;

/// A contiguous, trimmed slice of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk<'a> {
    /// The trimmed window content. Never empty.
    pub text: &'a str,

    /// Byte offset of `text` in the source.
    pub start: usize,

    /// Byte offset one past the end of `text` in the source.
    pub end: usize,
}

/// Splits text into overlapping fixed-length windows.
///
/// The splitter is pure: [`Chunker::split`] borrows the input and can be
/// called any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_len: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        // DEFAULT_OVERLAP < DEFAULT_MAX_LEN, so the invariant holds by
        // construction.
        Self {
            max_len: DEFAULT_MAX_LEN,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl Chunker {
    /// Create a chunker with the given window size and overlap, both in
    /// characters.
    ///
    /// Requires `max_len > 0` and `overlap < max_len`; otherwise the cursor
    /// could never advance.
    pub fn new(max_len: usize, overlap: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(CorpusError::InvalidChunking(
                "max_len must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_len {
            return Err(CorpusError::InvalidChunking(format!(
                "overlap ({overlap}) must be smaller than max_len ({max_len})"
            )));
        }
        Ok(Self { max_len, overlap })
    }

    /// Window size in characters.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Overlap between consecutive windows, in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text` into chunks.
    ///
    /// Each window covers `max_len` characters; consecutive windows share
    /// `overlap` characters; the final window may be shorter. Windows that
    /// are empty after trimming are skipped.
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            cursor: 0,
            max_len: self.max_len,
            step: self.max_len - self.overlap,
            done: text.is_empty(),
        }
    }
}

/// Iterator over the chunks of one input, produced by [`Chunker::split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    /// Byte offset of the current window start; always a char boundary.
    cursor: usize,
    max_len: usize,
    /// Characters to advance between windows (`max_len - overlap`, >= 1).
    step: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Byte offset `n` characters past `self.cursor`, saturating at the end
    /// of the text. Also reports whether the end was reached.
    fn advance_chars(&self, n: usize) -> (usize, bool) {
        let rest = &self.text[self.cursor..];
        match rest.char_indices().nth(n) {
            Some((offset, _)) => (self.cursor + offset, false),
            None => (self.text.len(), true),
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        while !self.done {
            let (end, reached_end) = self.advance_chars(self.max_len);
            let window = &self.text[self.cursor..end];
            let trimmed = window.trim();

            let chunk = if trimmed.is_empty() {
                None
            } else {
                // Offset of the trimmed slice within the original text.
                let leading = window.len() - window.trim_start().len();
                let start = self.cursor + leading;
                Some(Chunk {
                    text: trimmed,
                    start,
                    end: start + trimmed.len(),
                })
            };

            if reached_end {
                self.done = true;
            } else {
                let (next_cursor, hit_end) = self.advance_chars(self.step);
                self.cursor = next_cursor;
                self.done = hit_end;
            }

            if chunk.is_some() {
                return chunk;
            }
        }
        None
    }
}

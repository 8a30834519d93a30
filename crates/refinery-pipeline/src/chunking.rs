//! Text chunking strategies for large documents
//!
//! Chunk offsets are byte offsets that always land on character boundaries,
//! and every chunk's text is exactly `content[start_offset..end_offset]`.

use crate::config::ChunkConfig;
use refinery_domain::TextChunk;

/// Splits content into chunks
pub trait ChunkingStrategy: Send + Sync {
    /// Chunk the given content
    fn chunk(&self, content: &str) -> Vec<TextChunk>;

    /// Check a chunk produced by this strategy
    fn validate(&self, chunk: &TextChunk) -> bool {
        chunk.is_valid()
    }
}

/// Options for [`DelimiterChunker`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOptions {
    /// Maximum chunk size (bytes)
    pub max_size: usize,
    /// Bytes repeated at the start of the next chunk
    pub overlap: usize,
    /// Preferred cut point
    pub delimiter: String,
    /// Keep the delimiter at the end of the chunk it closes
    pub preserve_delimiter: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        ChunkOptions::from(&ChunkConfig::default())
    }
}

impl From<&ChunkConfig> for ChunkOptions {
    fn from(config: &ChunkConfig) -> Self {
        Self {
            max_size: config.max_size,
            overlap: config.overlap,
            delimiter: config.delimiter.clone(),
            preserve_delimiter: config.preserve_delimiter,
        }
    }
}

/// Fixed-window chunker that prefers to cut at a delimiter
///
/// Each window is `max_size` bytes. The cut goes after the last delimiter in
/// the window (before it when `preserve_delimiter` is off), or at the window
/// end when the window has none. The next chunk starts `overlap` bytes
/// before the cut.
#[derive(Debug, Clone, Default)]
pub struct DelimiterChunker {
    options: ChunkOptions,
}

impl DelimiterChunker {
    /// Create a new delimiter chunker
    pub fn new(options: ChunkOptions) -> Self {
        Self {
            options: ChunkOptions {
                max_size: options.max_size.max(1),
                ..options
            },
        }
    }

    /// Get the options
    pub fn options(&self) -> &ChunkOptions {
        &self.options
    }

    fn find_cut(&self, content: &str, offset: usize) -> usize {
        let window_end = floor_boundary(content, offset + self.options.max_size);
        if window_end <= offset {
            // Window narrower than one character
            return ceil_boundary(content, offset + 1);
        }

        let delimiter = self.options.delimiter.as_str();
        if delimiter.is_empty() {
            return window_end;
        }

        match content[offset..window_end].rfind(delimiter) {
            Some(pos) => {
                let cut = if self.options.preserve_delimiter {
                    offset + pos + delimiter.len()
                } else {
                    offset + pos
                };
                if cut > offset {
                    cut
                } else {
                    window_end
                }
            }
            None => window_end,
        }
    }
}

impl ChunkingStrategy for DelimiterChunker {
    fn chunk(&self, content: &str) -> Vec<TextChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let len = content.len();
        let mut chunks = Vec::new();
        let mut offset = 0;

        while offset < len {
            let cut = if offset + self.options.max_size >= len {
                len
            } else {
                self.find_cut(content, offset)
            };

            chunks.push(TextChunk::new(
                chunks.len(),
                &content[offset..cut],
                offset,
                cut,
            ));
            if cut >= len {
                break;
            }

            let next = floor_boundary(content, cut.saturating_sub(self.options.overlap));
            offset = if next > offset { next } else { cut };
        }

        chunks
    }
}

/// Sentence-packing chunker
///
/// Splits after `.`, `!` and `?`, packs whole sentences until the next one
/// would push the chunk's new material past `budget` bytes, and opens every
/// following chunk with the last `overlap_words` words of the previous one.
/// Sentences longer than the budget are hard-split.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    budget: usize,
    overlap_words: usize,
}

impl Default for SentenceChunker {
    fn default() -> Self {
        SentenceChunker::from(&ChunkConfig::default())
    }
}

impl From<&ChunkConfig> for SentenceChunker {
    fn from(config: &ChunkConfig) -> Self {
        Self::new(config.sentence_budget, config.overlap_words)
    }
}

impl SentenceChunker {
    /// Create a new sentence chunker
    pub fn new(budget: usize, overlap_words: usize) -> Self {
        Self {
            budget: budget.max(1),
            overlap_words,
        }
    }

    /// Sentence spans, with oversized sentences hard-split
    fn pieces(&self, content: &str) -> Vec<(usize, usize)> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for (idx, c) in content.char_indices() {
            if matches!(c, '.' | '!' | '?') {
                let end = idx + c.len_utf8();
                sentences.push((start, end));
                start = end;
            }
        }
        if start < content.len() {
            sentences.push((start, content.len()));
        }

        let mut pieces = Vec::with_capacity(sentences.len());
        for (start, end) in sentences {
            let mut from = start;
            while end - from > self.budget {
                let mut to = floor_boundary(content, from + self.budget);
                if to <= from {
                    to = ceil_boundary(content, from + 1);
                }
                pieces.push((from, to));
                from = to;
            }
            pieces.push((from, end));
        }
        pieces
    }

    /// Start of the lead-in for the chunk following `[start, end)`
    fn lead_in_start(&self, content: &str, start: usize, end: usize) -> usize {
        if self.overlap_words == 0 {
            return end;
        }

        let mut word_starts = Vec::new();
        let mut in_word = false;
        for (idx, c) in content[start..end].char_indices() {
            if c.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                word_starts.push(start + idx);
            }
        }

        // Never repeat the whole chunk
        let keep = self.overlap_words.min(word_starts.len().saturating_sub(1));
        if keep == 0 {
            return end;
        }
        word_starts[word_starts.len() - keep]
    }
}

impl ChunkingStrategy for SentenceChunker {
    fn chunk(&self, content: &str) -> Vec<TextChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut chunk_start = 0;
        let mut body_start = 0;
        let mut body_end = 0;

        for (start, end) in self.pieces(content) {
            if body_end > body_start && end - body_start > self.budget {
                chunks.push(TextChunk::new(
                    chunks.len(),
                    &content[chunk_start..body_end],
                    chunk_start,
                    body_end,
                ));
                chunk_start = self.lead_in_start(content, chunk_start, body_end);
                body_start = start;
            }
            body_end = end;
        }

        if body_end > chunk_start {
            chunks.push(TextChunk::new(
                chunks.len(),
                &content[chunk_start..body_end],
                chunk_start,
                body_end,
            ));
        }

        chunks
    }
}

fn floor_boundary(content: &str, index: usize) -> usize {
    let mut index = index.min(content.len());
    while !content.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(content: &str, index: usize) -> usize {
    let mut index = index.min(content.len());
    while !content.is_char_boundary(index) {
        index += 1;
    }
    index
}

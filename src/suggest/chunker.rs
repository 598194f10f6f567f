//! Document chunking for analysis input.
//!
//! Splits prose into chunks of roughly `target_words` words. Paragraphs are
//! accumulated whole; a paragraph is only broken on sentence boundaries when
//! it exceeds the target on its own, so a chunk never ends mid-sentence.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default chunk size in words.
pub const DEFAULT_TARGET_WORDS: usize = 200;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));

/// Sentence boundary: terminal punctuation, optional closing quotes or
/// brackets, followed by whitespace.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["')\]]*\s+"#).expect("sentence regex is valid"));

/// A contiguous slice of the input document, the unit of comparison
/// against catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk's prose.
    pub text: String,
    /// Position among chunks of the same document, 0-based.
    pub index: usize,
}

/// Split a document into chunks of roughly [`DEFAULT_TARGET_WORDS`] words.
pub fn chunk(document: &str) -> Vec<Chunk> {
    chunk_with_target(document, DEFAULT_TARGET_WORDS)
}

/// Split a document into chunks of roughly `target_words` words.
///
/// Empty or whitespace-only input yields no chunks.
pub fn chunk_with_target(document: &str, target_words: usize) -> Vec<Chunk> {
    let target_words = target_words.max(1);

    let mut builder = ChunkBuilder::new(target_words);

    for paragraph in PARAGRAPH_BREAK.split(document) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if word_count(paragraph) > target_words {
            // Oversized paragraph: close the running chunk and split the
            // paragraph on sentence boundaries instead.
            builder.flush();
            for sentence in split_sentences(paragraph) {
                builder.push(sentence, " ");
            }
            builder.flush();
        } else {
            builder.push(paragraph, "\n\n");
        }
    }

    builder.finish()
}

struct ChunkBuilder {
    target_words: usize,
    current: String,
    current_words: usize,
    chunks: Vec<Chunk>,
}

impl ChunkBuilder {
    fn new(target_words: usize) -> Self {
        Self {
            target_words,
            current: String::new(),
            current_words: 0,
            chunks: Vec::new(),
        }
    }

    /// Append a piece to the running chunk, starting a new chunk first if
    /// the piece would push the word count past the target.
    fn push(&mut self, piece: &str, separator: &str) {
        let words = word_count(piece);
        if self.current_words > 0 && self.current_words + words > self.target_words {
            self.flush();
        }
        if !self.current.is_empty() {
            self.current.push_str(separator);
        }
        self.current.push_str(piece);
        self.current_words += words;
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        self.chunks.push(Chunk {
            text,
            index: self.chunks.len(),
        });
        self.current_words = 0;
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }
}

/// Split a paragraph into sentences, preserving terminal punctuation.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BREAK.find_iter(paragraph) {
        let sentence = paragraph[start..boundary.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }

    let tail = paragraph[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

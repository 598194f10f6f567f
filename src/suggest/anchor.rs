//! Anchor text selection for a matched chunk/record pair.
//!
//! Priority order:
//! 1. The record's h1 appearing verbatim (case-insensitive) in the chunk,
//!    then any h2 entry (longest match wins).
//! 2. The longest run of at least two consecutive significant words shared
//!    between the chunk and the record's title/h1/h2, spelled as it appears
//!    in the chunk.
//! 3. The record's title verbatim (h1 when the title is empty).
//!
//! The result is empty only when the record has neither title nor h1; the
//! ranker drops such pairs before they become suggestions.

use crate::catalog::CatalogRecord;
use crate::suggest::chunker::Chunk;
use crate::suggest::scoring::is_stop_word;

/// Pick the anchor text for linking `record` from within `chunk`.
pub fn select_anchor(chunk: &Chunk, record: &CatalogRecord) -> String {
    // 1. Verbatim heading matches, h1 first.
    if let Some((start, end)) = find_case_insensitive(&chunk.text, record.h1.trim()) {
        return chunk.text[start..end].to_string();
    }

    let mut best_h2: Option<(usize, usize)> = None;
    for h2 in &record.h2 {
        if let Some((start, end)) = find_case_insensitive(&chunk.text, h2.trim()) {
            let longer = best_h2.map_or(true, |(s, e)| end - start > e - s);
            if longer {
                best_h2 = Some((start, end));
            }
        }
    }
    if let Some((start, end)) = best_h2 {
        return chunk.text[start..end].to_string();
    }

    // 2. Longest shared significant-word run, preserving chunk spelling.
    let mut sources: Vec<&str> = vec![&record.title, &record.h1];
    sources.extend(record.h2.iter().map(String::as_str));
    if let Some((start, end)) = longest_shared_run(&chunk.text, &sources) {
        return chunk.text[start..end].to_string();
    }

    // 3. Fall back to catalog metadata; not drawn from the chunk.
    let title = record.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    record.h1.trim().to_string()
}

/// Case-insensitive substring search returning the byte range of the match
/// in `haystack`. Comparison is char-by-char over full Unicode lowercasing,
/// so multi-char expansions (e.g. 'İ' lowering to "i\u{307}") line up
/// correctly and the returned range stays valid in the original haystack.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    'starts: for (start, _) in haystack.char_indices() {
        let mut matched = 0;

        for (offset, c) in haystack[start..].char_indices() {
            for lc in c.to_lowercase() {
                // A haystack char whose expansion straddles the end of the
                // needle cannot complete a match at this start.
                if matched == needle_lower.len() || lc != needle_lower[matched] {
                    continue 'starts;
                }
                matched += 1;
            }

            if matched == needle_lower.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
    }

    None
}

/// A word token with its byte span in the source text.
struct Token {
    lower: String,
    start: usize,
    end: usize,
    significant: bool,
}

fn tokens_with_spans(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if c.is_alphanumeric() {
            word_start.get_or_insert(idx);
        } else if let Some(start) = word_start.take() {
            tokens.push(make_token(text, start, idx));
        }
    }
    if let Some(start) = word_start {
        tokens.push(make_token(text, start, text.len()));
    }

    tokens
}

fn make_token(text: &str, start: usize, end: usize) -> Token {
    let lower = text[start..end].to_lowercase();
    let significant = lower.len() > 1 && !is_stop_word(&lower);
    Token {
        lower,
        start,
        end,
        significant,
    }
}

/// Longest run of consecutive tokens shared (case-insensitive) between the
/// chunk and any source string, requiring at least two significant tokens in
/// the run. Returns the byte range of the run within the chunk.
///
/// Ties prefer the earliest source and the earliest chunk position.
fn longest_shared_run(chunk_text: &str, sources: &[&str]) -> Option<(usize, usize)> {
    let chunk_tokens = tokens_with_spans(chunk_text);
    if chunk_tokens.len() < 2 {
        return None;
    }

    // Prefix sums of significant-token counts for O(1) run checks.
    let mut significant_before = vec![0usize; chunk_tokens.len() + 1];
    for (i, token) in chunk_tokens.iter().enumerate() {
        significant_before[i + 1] = significant_before[i] + usize::from(token.significant);
    }

    let mut best: Option<(usize, usize, usize)> = None; // (run length, start idx, end idx)

    for source in sources {
        let source_tokens: Vec<String> = tokens_with_spans(source)
            .into_iter()
            .map(|t| t.lower)
            .collect();
        if source_tokens.len() < 2 {
            continue;
        }

        // Longest common token substring, one DP row at a time.
        let mut prev = vec![0usize; source_tokens.len() + 1];
        for (i, chunk_token) in chunk_tokens.iter().enumerate() {
            let mut curr = vec![0usize; source_tokens.len() + 1];
            for (j, source_token) in source_tokens.iter().enumerate() {
                if chunk_token.lower != *source_token {
                    continue;
                }
                let run = prev[j] + 1;
                curr[j + 1] = run;

                let start_idx = i + 1 - run;
                let significant = significant_before[i + 1] - significant_before[start_idx];
                if significant < 2 {
                    continue;
                }
                if best.map_or(true, |(len, _, _)| run > len) {
                    best = Some((run, start_idx, i));
                }
            }
            prev = curr;
        }
    }

    best.map(|(_, start_idx, end_idx)| (chunk_tokens[start_idx].start, chunk_tokens[end_idx].end))
}

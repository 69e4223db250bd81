//! Recursive character splitting
//!
//! Text is split on the first separator in the list that occurs in it
//! (`"\n\n"`, `"\n"`, `" "`, then single characters). Pieces that still
//! exceed `chunk_size` are split again with the remaining separators, and
//! small pieces are merged back into windows of at most `chunk_size`
//! characters, carrying up to `chunk_overlap` characters into the next
//! window. Sizes are counted in characters, not bytes.

use std::collections::VecDeque;

use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    separators: Vec<String>,
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveCharacterSplitter {
    pub fn new() -> Self {
        Self::with_separators(DEFAULT_SEPARATORS)
    }

    pub fn with_separators<I, S>(separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            separators: separators.into_iter().map(Into::into).collect(),
        }
    }

    fn split_recursive(&self, text: &str, separators: &[String], config: &ChunkingConfig) -> Vec<String> {
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));

        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut small = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < config.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(merge_pieces(&small, config));
                small.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining, config));
            }
        }

        if !small.is_empty() {
            chunks.extend(merge_pieces(&small, config));
        }

        chunks
    }
}

impl ChunkingStrategy for RecursiveCharacterSplitter {
    fn split(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.split_recursive(content, &self.separators, config))
    }

    fn name(&self) -> &'static str {
        "recursive_character"
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, attaching each separator to the piece that follows it
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }

    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Greedily merge pieces into windows, keeping a tail of up to
/// `chunk_overlap` characters as the start of the next window
fn merge_pieces(pieces: &[String], config: &ChunkingConfig) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);

        if total + len > config.chunk_size && !current.is_empty() {
            push_window(&mut windows, &current);

            while total > config.chunk_overlap || (total + len > config.chunk_size && total > 0) {
                match current.pop_front() {
                    Some(front) => total -= char_len(front),
                    None => break,
                }
            }
        }

        current.push_back(piece);
        total += len;
    }

    push_window(&mut windows, &current);
    windows
}

fn push_window(windows: &mut Vec<String>, current: &VecDeque<&str>) {
    let joined: String = current.iter().copied().collect();
    let trimmed = joined.trim();

    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(size, overlap)
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new();
        let chunks = splitter.split("  役男出國規定  ", &config(512, 200)).unwrap();

        assert_eq!(chunks, vec!["役男出國規定".to_string()]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        let splitter = RecursiveCharacterSplitter::new();
        assert!(splitter.split(" \n\n ", &config(10, 2)).unwrap().is_empty());
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveCharacterSplitter::new();
        let text = "first paragraph\n\nsecond paragraph\n\nthird paragraph";

        let chunks = splitter.split(text, &config(20, 0)).unwrap();

        assert_eq!(
            chunks,
            vec!["first paragraph", "second paragraph", "third paragraph"]
        );
    }

    #[test]
    fn test_chunks_respect_size_in_chars() {
        let splitter = RecursiveCharacterSplitter::new();
        let text = "替代役可以申請延期嗎？".repeat(30);

        let chunks = splitter.split(&text, &config(50, 10)).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "{} chars", chunk.chars().count());
        }
    }

    #[test]
    fn test_overlap_carries_words_forward() {
        let splitter = RecursiveCharacterSplitter::new();
        let text = "one two three four five six seven eight nine ten";

        let chunks = splitter.split(text, &config(20, 10)).unwrap();

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(pair[1].contains(last_word), "{:?}", pair);
        }
    }

    #[test]
    fn test_no_overlap_covers_every_word_once() {
        let splitter = RecursiveCharacterSplitter::new();
        let text = "alpha beta gamma delta epsilon zeta eta theta";

        let chunks = splitter.split(text, &config(12, 0)).unwrap();
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();

        assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let splitter = RecursiveCharacterSplitter::new();
        assert!(splitter.split("text", &config(10, 10)).is_err());
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }
}

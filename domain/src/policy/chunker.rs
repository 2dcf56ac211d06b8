//! Sliding-window chunking of policy documents
//!
//! Sizes are expressed in tokens and converted at a fixed 4 chars per token.
//! All offsets are char offsets, so multi-byte text never splits mid-codepoint.

use super::entities::PolicyChunk;
use regex::Regex;
use std::sync::LazyLock;

const CHARS_PER_TOKEN: usize = 4;
const TARGET_TOKENS: usize = 512;
const OVERLAP_TOKENS: usize = 64;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6}\s+(.+)$").expect("HEADING is a compile-time constant")
});

/// Window sizes in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub target_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_chars: TARGET_TOKENS * CHARS_PER_TOKEN,
            overlap_chars: OVERLAP_TOKENS * CHARS_PER_TOKEN,
        }
    }
}

/// Chunk a policy document with the default ~512-token window.
pub fn chunk_policy(source_file: &str, text: &str) -> Vec<PolicyChunk> {
    chunk_policy_with(ChunkerConfig::default(), source_file, text)
}

/// Chunk a policy document.
///
/// A window that does not reach the end of the text is cut back to its last
/// paragraph break when that break lies past the window's midpoint. The
/// cursor then moves forward by the slice length minus the overlap, and by at
/// least one character.
pub fn chunk_policy_with(config: ChunkerConfig, source_file: &str, text: &str) -> Vec<PolicyChunk> {
    let chars: Vec<char> = text.chars().collect();
    let target = config.target_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + target).min(chars.len());
        let mut slice_len = end - start;

        if end < chars.len()
            && let Some(brk) = last_paragraph_break(&chars[start..end])
            && brk * 2 > target
        {
            slice_len = brk;
        }

        let slice: String = chars[start..start + slice_len].iter().collect();
        let content = slice.trim();
        if !content.is_empty() {
            chunks.push(PolicyChunk {
                source_file: source_file.to_string(),
                chunk_index: chunks.len(),
                content: content.to_string(),
                sections: extract_sections(&slice),
                embedding: Vec::new(),
            });
        }

        if end == chars.len() {
            break;
        }
        start += slice_len.saturating_sub(config.overlap_chars).max(1);
    }

    chunks
}

fn last_paragraph_break(window: &[char]) -> Option<usize> {
    window
        .windows(2)
        .rposition(|pair| pair[0] == '\n' && pair[1] == '\n')
}

fn extract_sections(text: &str) -> Vec<String> {
    HEADING
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

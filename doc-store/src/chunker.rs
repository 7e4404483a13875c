//! Sliding-window character splitter.

use crate::config::ChunkingConfig;

/// Splits `text` into overlapping windows of at most `chunk_size` characters.
///
/// Consecutive windows share exactly `chunk_overlap` characters; the last one
/// may be shorter. Windows are cut on `char` boundaries, never inside a UTF-8
/// sequence. Returns `(char_offset, window)` pairs.
///
/// `cfg` must already be validated (`chunk_overlap < chunk_size`).
pub fn split(text: &str, cfg: &ChunkingConfig) -> Vec<(usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut out = Vec::new();
    if n == 0 || cfg.chunk_size == 0 || cfg.chunk_overlap >= cfg.chunk_size {
        return out;
    }

    let mut start = 0usize;
    loop {
        let end = (start + cfg.chunk_size).min(n);
        out.push((start, chars[start..end].iter().collect()));
        if end == n {
            break;
        }
        start = end - cfg.chunk_overlap;
    }
    out
}

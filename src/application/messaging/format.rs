//! Reply formatting helpers

use crate::domain::entities::MAX_CHARACTERS;

/// Split text into pieces of at most `size` characters
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Chunks sized for a single chat message
pub fn message_chunks(text: &str) -> Vec<String> {
    chunk_text(text, MAX_CHARACTERS)
}

/// Cut text to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

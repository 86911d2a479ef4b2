use serde::{Deserialize, Serialize};

/// Counts that are always worth announcing, regardless of digits
const SEQUENTIAL_GETS: [u64; 7] = [123, 1234, 12345, 123456, 1234567, 12345678, 123456789];

/// A tracked keyword: how often it has been seen and what to react with.
///
/// Stored under the normalized keyword in the scope's keyword store as
/// `{"reactions": [...], "count": N}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    #[serde(default)]
    pub reactions: Vec<String>,
    #[serde(default)]
    pub count: u64,
}

impl KeywordEntry {
    pub fn with_reaction(reaction: impl Into<String>) -> Self {
        Self {
            reactions: vec![reaction.into()],
            count: 0,
        }
    }
}

/// Whether a keyword count is a "get" worth announcing.
///
/// True for the sequential numbers 123 through 123456789, and for any number
/// of two or more digits whose last two digits are equal (22, 100, 1233).
pub fn is_get(count: u64) -> bool {
    if SEQUENTIAL_GETS.contains(&count) {
        return true;
    }
    count >= 10 && count % 10 == (count / 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_gets() {
        assert!(is_get(123));
        assert!(is_get(12345));
        assert!(is_get(1234567));
        assert!(is_get(123456789));
        assert!(!is_get(124));
    }

    #[test]
    fn test_repeated_last_digits() {
        assert!(is_get(22));
        assert!(is_get(333));
        assert!(is_get(1233));
        assert!(is_get(55555));
        assert!(is_get(100));
        assert!(is_get(1440044));
    }

    #[test]
    fn test_single_digits_are_not_gets() {
        for n in 0..10 {
            assert!(!is_get(n), "{} should not be a get", n);
        }
        assert!(!is_get(10));
        assert!(!is_get(21));
    }

    #[test]
    fn test_entry_deserializes_with_missing_fields() {
        let entry: KeywordEntry = serde_json::from_str(r#"{"count": 4}"#).unwrap();
        assert_eq!(entry.count, 4);
        assert!(entry.reactions.is_empty());
    }
}

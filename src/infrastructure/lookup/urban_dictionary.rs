//! Urban Dictionary definitions through RapidAPI

use serde::Deserialize;

use crate::application::errors::LookupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub word: String,
    pub permalink: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrbanResult {
    Found(Definition),
    NoResults,
    /// The response had no result list at all
    NotFound,
}

#[derive(Deserialize)]
struct DefineResponse {
    list: Option<Vec<Entry>>,
}

#[derive(Deserialize)]
struct Entry {
    word: String,
    #[serde(default)]
    permalink: String,
    definition: String,
    #[serde(default)]
    thumbs_up: i64,
    #[serde(default)]
    thumbs_down: i64,
}

/// Pick the best-rated definition, with link brackets removed
pub fn parse_response(body: &str) -> Result<UrbanResult, LookupError> {
    let response: DefineResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let Some(list) = response.list else {
        return Ok(UrbanResult::NotFound);
    };

    // Ties go to the earliest entry
    let best = list
        .into_iter()
        .rev()
        .max_by_key(|entry| entry.thumbs_up - entry.thumbs_down);

    Ok(match best {
        Some(entry) => UrbanResult::Found(Definition {
            word: entry.word,
            permalink: entry.permalink,
            definition: entry.definition.replace(['[', ']'], ""),
        }),
        None => UrbanResult::NoResults,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_definition_wins() {
        let body = r#"{"list": [
            {"word": "yeet", "permalink": "https://ud/1", "definition": "meh", "thumbs_up": 10, "thumbs_down": 9},
            {"word": "yeet", "permalink": "https://ud/2", "definition": "to [throw] hard", "thumbs_up": 50, "thumbs_down": 5},
            {"word": "yeet", "permalink": "https://ud/3", "definition": "popular but hated", "thumbs_up": 90, "thumbs_down": 80}
        ]}"#;

        let result = parse_response(body).unwrap();

        assert_eq!(
            result,
            UrbanResult::Found(Definition {
                word: "yeet".to_string(),
                permalink: "https://ud/2".to_string(),
                definition: "to throw hard".to_string(),
            })
        );
    }

    #[test]
    fn test_ties_keep_first_entry() {
        let body = r#"{"list": [
            {"word": "a", "permalink": "1", "definition": "first", "thumbs_up": 1, "thumbs_down": 0},
            {"word": "a", "permalink": "2", "definition": "second", "thumbs_up": 1, "thumbs_down": 0}
        ]}"#;

        match parse_response(body).unwrap() {
            UrbanResult::Found(definition) => assert_eq!(definition.definition, "first"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_missing_lists() {
        assert_eq!(parse_response(r#"{"list": []}"#).unwrap(), UrbanResult::NoResults);
        assert_eq!(parse_response(r#"{"message": "nope"}"#).unwrap(), UrbanResult::NotFound);
        assert!(parse_response("not json").is_err());
    }
}

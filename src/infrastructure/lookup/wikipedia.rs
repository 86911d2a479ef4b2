//! Wikipedia article extracts through the MediaWiki query API

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::application::errors::LookupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub extract: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiResult {
    Pages(Vec<WikiPage>),
    NotFound,
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    fullurl: String,
}

/// Intro extract in plain text plus the page URL, following redirects
pub fn query_params(title: &str) -> Vec<(&'static str, String)> {
    vec![
        ("format", "json".to_string()),
        ("action", "query".to_string()),
        ("prop", "extracts|info".to_string()),
        ("inprop", "url".to_string()),
        ("exintro", String::new()),
        ("explaintext", String::new()),
        ("redirects", "1".to_string()),
        ("titles", title.to_string()),
    ]
}

pub fn parse_response(body: &str) -> Result<WikiResult, LookupError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;

    let pages = match response.query {
        Some(query) if !query.pages.is_empty() && !query.pages.contains_key("-1") => query.pages,
        _ => return Ok(WikiResult::NotFound),
    };

    Ok(WikiResult::Pages(
        pages
            .into_values()
            .map(|page| WikiPage {
                title: page.title,
                extract: page.extract.replace('\n', "\n\n"),
                url: page.fullurl,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_page() {
        let body = r#"{"batchcomplete": "", "query": {"pages": {"25458": {
            "pageid": 25458, "title": "Rust (programming language)",
            "extract": "Rust is a language.\nIt is fast.",
            "fullurl": "https://en.wikipedia.org/wiki/Rust_(programming_language)"
        }}}}"#;

        let result = parse_response(body).unwrap();

        assert_eq!(
            result,
            WikiResult::Pages(vec![WikiPage {
                title: "Rust (programming language)".to_string(),
                extract: "Rust is a language.\n\nIt is fast.".to_string(),
                url: "https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string(),
            }])
        );
    }

    #[test]
    fn test_missing_page() {
        let body = r#"{"query": {"pages": {"-1": {"ns": 0, "title": "Zzzxq", "missing": ""}}}}"#;
        assert_eq!(parse_response(body).unwrap(), WikiResult::NotFound);
        assert_eq!(parse_response("{}").unwrap(), WikiResult::NotFound);
    }

    #[test]
    fn test_query_params_carry_title() {
        let params = query_params("Ferris");
        assert!(params.contains(&("titles", "Ferris".to_string())));
        assert!(params.contains(&("redirects", "1".to_string())));
    }
}

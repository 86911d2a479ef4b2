//! Insults: a local list for hints and a scraped generator for `insult`

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex_lite::Regex;
use reqwest::Client;
use std::time::Duration;

use super::check_status;
use crate::application::errors::LookupError;
use crate::application::messaging::RateLimiter;
use crate::infrastructure::config::{InsultConfig, DEFAULT_INSULT};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WRAP_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<[^>]*class\s*=\s*["']wrap["'][^>]*>"#).unwrap());

const RATE_LIMIT_KEY: &str = "insult";

pub struct InsultService {
    client: Client,
    url: String,
    insults: Vec<String>,
    limiter: RateLimiter,
}

impl InsultService {
    pub fn new(client: Client, config: &InsultConfig) -> Self {
        Self {
            client,
            url: config.service_url.clone(),
            insults: config.insults.clone(),
            limiter: RateLimiter::new(Duration::from_secs(config.rate_limit_seconds)),
        }
    }

    /// An insult from the configured list, for misused commands
    pub fn random_insult(&self) -> String {
        self.insults
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_INSULT.to_string())
    }

    /// Scrape a fresh insult; fails fast when called too often
    pub async fn fetch(&self) -> Result<String, LookupError> {
        self.limiter.check(RATE_LIMIT_KEY)?;

        let response = self.client.get(&self.url).send().await?;
        let body = check_status(response)?.text().await?;

        parse_insult(&body).ok_or_else(|| LookupError::Parse("no insult in page".to_string()))
    }
}

/// Text of the first `class="wrap"` element, up to its closing `</div>`
pub fn parse_insult(html: &str) -> Option<String> {
    let open = WRAP_OPEN.find(html)?;
    let rest = &html[open.end()..];
    let inner = match rest.find("</div>") {
        Some(end) => &rest[..end],
        None => rest,
    };
    let text = decode_entities(&TAG.replace_all(inner, ""));
    let text = text.trim().replace('\n', "");
    (!text.is_empty()).then_some(text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

//! External lookup services
//!
//! Each service is a thin async wrapper over a shared `reqwest::Client`
//! plus a pure function turning the response body into a typed result, so
//! the parsing can be tested without the network.

pub mod insult;
pub mod urban_dictionary;
pub mod wikipedia;
pub mod wolfram;

use reqwest::{Client, Response};
use std::time::Duration;

use crate::application::errors::LookupError;
use crate::infrastructure::config::LookupConfig;

pub use insult::InsultService;
pub use urban_dictionary::{Definition, UrbanResult};
pub use wikipedia::{WikiPage, WikiResult};
pub use wolfram::WolframAnswer;

/// Build the HTTP client shared by every lookup
pub fn http_client(timeout: Duration) -> Result<Client, LookupError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dragon-bot/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Dictionary, encyclopedia and question-answering lookups
pub struct LookupClient {
    client: Client,
    config: LookupConfig,
    bot_name: String,
}

impl LookupClient {
    pub fn new(client: Client, config: LookupConfig, bot_name: impl Into<String>) -> Self {
        Self {
            client,
            config,
            bot_name: bot_name.into(),
        }
    }

    pub async fn urban_dictionary(&self, term: &str) -> Result<UrbanResult, LookupError> {
        let key = self
            .config
            .rapidapi_key
            .as_deref()
            .ok_or(LookupError::NotConfigured("RapidAPI key"))?;
        let host = self
            .config
            .rapidapi_host
            .as_deref()
            .ok_or(LookupError::NotConfigured("RapidAPI host"))?;

        let response = self
            .client
            .get(&self.config.urban_dictionary_url)
            .query(&[("term", term)])
            .header("x-rapidapi-key", key)
            .header("x-rapidapi-host", host)
            .send()
            .await?;
        let body = check_status(response)?.text().await?;

        urban_dictionary::parse_response(&body)
    }

    pub async fn wikipedia(&self, title: &str) -> Result<WikiResult, LookupError> {
        let response = self
            .client
            .get(&self.config.wikipedia_url)
            .query(&wikipedia::query_params(title))
            .send()
            .await?;
        let body = check_status(response)?.text().await?;

        wikipedia::parse_response(&body)
    }

    pub async fn wolfram_short_answer(&self, question: &str) -> Result<WolframAnswer, LookupError> {
        let app_id = self
            .config
            .wolfram_app_id
            .as_deref()
            .ok_or(LookupError::NotConfigured("Wolfram Alpha app id"))?;

        let response = self
            .client
            .get(&self.config.wolfram_url)
            .query(&[("appid", app_id), ("i", question)])
            .send()
            .await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        wolfram::interpret(status, &body, &self.bot_name).ok_or(LookupError::Status { status, url })
    }
}

/// Turn 4xx/5xx into `LookupError::Status`, logging the failure
fn check_status(response: Response) -> Result<Response, LookupError> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!("Error making GET request on {}: {}", response.url(), status);
        return Err(LookupError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

//! Configuration management
//!
//! Layering, lowest to highest precedence: built-in defaults, an optional
//! YAML file, then command-line flags (which fall back to `DRAGONBOT_*`
//! environment variables).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;
use crate::domain::entities::UserId;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_EMOTE_PREFIX: &str = "@";
/// Used when no insult list is configured
pub const DEFAULT_INSULT: &str = "you dummy";

const HIDDEN: &str = "<hidden>";

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub insults: InsultConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub token: Option<String>,
    pub owner_id: Option<UserId>,
    pub command_prefix: String,
    pub emote_prefix: String,
    pub read_only: bool,
    /// Reply to unknown commands instead of ignoring them
    pub unknown_command_message: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "DragonBot".to_string(),
            token: None,
            owner_id: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            emote_prefix: DEFAULT_EMOTE_PREFIX.to_string(),
            read_only: false,
            unknown_command_message: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    /// Flat-file storage root
    pub directory: Option<PathBuf>,
    /// SQLite database file
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InsultConfig {
    /// Insults used when a command is misused
    pub insults: Vec<String>,
    pub service_url: String,
    /// Minimum seconds between insult service calls
    pub rate_limit_seconds: u64,
}

impl Default for InsultConfig {
    fn default() -> Self {
        Self {
            insults: Vec::new(),
            service_url: "http://insultgenerator.org".to_string(),
            rate_limit_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LookupConfig {
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: Option<String>,
    pub wolfram_app_id: Option<String>,
    pub urban_dictionary_url: String,
    pub wikipedia_url: String,
    pub wolfram_url: String,
    pub timeout_seconds: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            rapidapi_key: None,
            rapidapi_host: None,
            wolfram_app_id: None,
            urban_dictionary_url: "https://mashape-community-urban-dictionary.p.rapidapi.com/define".to_string(),
            wikipedia_url: "https://en.wikipedia.org/w/api.php".to_string(),
            wolfram_url: "https://api.wolframalpha.com/v1/result".to_string(),
            timeout_seconds: 15,
        }
    }
}

/// Where the keyed stores live; exactly one must be configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Directory(PathBuf),
    Database(PathBuf),
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub owner_id: Option<u64>,
    pub read_only: bool,
    pub storage_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub command_prefix: Option<String>,
    pub emote_prefix: Option<String>,
    pub unknown_command_message: bool,
    pub insults_file: Option<PathBuf>,
    pub insult_rate_limit_seconds: Option<u64>,
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: Option<String>,
    pub wolfram_app_id: Option<String>,
}

/// Insults file layout: `{"encoding": "rot_13", "insults": [...]}`
#[derive(Debug, Deserialize)]
struct InsultsFile {
    encoding: Option<String>,
    insults: Vec<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config {}: {}", path.display(), e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Apply command-line and environment values on top of the file
    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if overrides.token.is_some() {
            self.bot.token = overrides.token;
        }
        if let Some(owner) = overrides.owner_id {
            self.bot.owner_id = Some(UserId(owner));
        }
        self.bot.read_only |= overrides.read_only;
        self.bot.unknown_command_message |= overrides.unknown_command_message;
        if let Some(prefix) = overrides.command_prefix {
            self.bot.command_prefix = prefix;
        }
        if let Some(prefix) = overrides.emote_prefix {
            self.bot.emote_prefix = prefix;
        }
        if overrides.storage_dir.is_some() {
            self.storage.directory = overrides.storage_dir;
        }
        if overrides.database.is_some() {
            self.storage.database = overrides.database;
        }
        if let Some(path) = overrides.insults_file {
            self.insults.insults = load_insults(&path)?;
        }
        if let Some(seconds) = overrides.insult_rate_limit_seconds {
            self.insults.rate_limit_seconds = seconds;
        }
        if overrides.rapidapi_key.is_some() {
            self.lookup.rapidapi_key = overrides.rapidapi_key;
        }
        if overrides.rapidapi_host.is_some() {
            self.lookup.rapidapi_host = overrides.rapidapi_host;
        }
        if overrides.wolfram_app_id.is_some() {
            self.lookup.wolfram_app_id = overrides.wolfram_app_id;
        }
        Ok(())
    }

    pub fn owner_id(&self) -> Result<UserId, ConfigError> {
        self.bot
            .owner_id
            .ok_or_else(|| ConfigError::MissingField("owner-id".to_string()))
    }

    pub fn storage_target(&self) -> Result<StorageTarget, ConfigError> {
        match (&self.storage.directory, &self.storage.database) {
            (Some(_), Some(_)) => Err(ConfigError::Conflict(
                "give either a storage directory or a database, not both".to_string(),
            )),
            (Some(dir), None) => Ok(StorageTarget::Directory(dir.clone())),
            (None, Some(db)) => Ok(StorageTarget::Database(db.clone())),
            (None, None) => Err(ConfigError::MissingField(
                "storage-dir or database".to_string(),
            )),
        }
    }

    /// Check everything the bot needs before it starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.owner_id()?;
        self.storage_target()?;
        if self.bot.command_prefix.is_empty() {
            return Err(ConfigError::InvalidValue("command prefix may not be empty".to_string()));
        }
        if self.bot.emote_prefix.is_empty() {
            return Err(ConfigError::InvalidValue("emote prefix may not be empty".to_string()));
        }
        if self.bot.command_prefix == self.bot.emote_prefix {
            return Err(ConfigError::Conflict("command and emote prefixes must differ".to_string()));
        }
        Ok(())
    }

    /// A copy safe to show: tokens and API keys replaced
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        let hide = |value: &mut Option<String>| {
            if value.is_some() {
                *value = Some(HIDDEN.to_string());
            }
        };
        hide(&mut config.bot.token);
        hide(&mut config.lookup.rapidapi_key);
        hide(&mut config.lookup.wolfram_app_id);
        config.insults.insults = vec![HIDDEN.to_string()];
        config
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Read an insults file, decoding obfuscated entries
pub fn load_insults(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Parse(format!("Failed to read insults {}: {}", path.display(), e)))?;
    parse_insults(&content)
}

pub fn parse_insults(content: &str) -> Result<Vec<String>, ConfigError> {
    let file: InsultsFile = serde_json::from_str(content)
        .map_err(|e| ConfigError::Parse(format!("Malformed insults object: {}", e)))?;
    match file.encoding.as_deref() {
        None => Ok(file.insults),
        Some("rot_13") | Some("rot13") => Ok(file.insults.iter().map(|s| rot13(s)).collect()),
        Some(other) => Err(ConfigError::InvalidValue(format!("unsupported insult encoding \"{}\"", other))),
    }
}

fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

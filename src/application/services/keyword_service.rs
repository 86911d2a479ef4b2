//! Keyword counting and reactions
//!
//! Each scope has a keyword store and an automaton built from its keys.
//! Lock order is store first, then the automata table.

use aho_corasick::AhoCorasick;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::{BotError, TransportError};
use crate::domain::entities::{is_get, KeywordEntry, Message, ScopeId};
use crate::domain::traits::{Bot, Persistence, StoreKind};
use crate::infrastructure::storage::{KeyedStore, ScopedStores};

/// What one message did to the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// `(keyword, new count)` in order of first occurrence
    pub counted: Vec<(String, u64)>,
    pub announced: Vec<String>,
    pub reactions_added: usize,
    /// Set when the platform refused further reactions
    pub reaction_limit_hit: bool,
}

/// A keyword hit whose count is already committed
struct Hit {
    keyword: String,
    count: u64,
    reactions: Vec<String>,
}

/// The compiled key set of one scope's store
pub struct KeywordAutomaton {
    searcher: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordAutomaton {
    pub fn build<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<Self, BotError> {
        let keywords: Vec<String> = keys
            .into_iter()
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        let searcher = AhoCorasick::new(&keywords)
            .map_err(|e| BotError::Internal(format!("failed to build keyword automaton: {}", e)))?;
        Ok(Self { searcher, keywords })
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Every keyword found in `text` once, in order of first match end
    pub fn distinct_matches(&self, text: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.searcher
            .find_overlapping_iter(text)
            .filter(|m| seen.insert(m.pattern()))
            .map(|m| self.keywords[m.pattern().as_usize()].as_str())
            .collect()
    }
}

pub struct KeywordMatcher {
    stores: ScopedStores,
    automata: RwLock<HashMap<ScopeId, Arc<KeywordAutomaton>>>,
}

impl KeywordMatcher {
    pub fn new(backend: Arc<dyn Persistence>) -> Self {
        Self {
            stores: ScopedStores::new(StoreKind::Keywords, backend),
            automata: RwLock::new(HashMap::new()),
        }
    }

    pub fn stores(&self) -> &ScopedStores {
        &self.stores
    }

    /// Load the scope's keywords and build its automaton
    pub async fn add_scope(&self, scope: ScopeId) -> Result<(), BotError> {
        let store = self.stores.open(scope).await?;
        let store = store.lock().await;
        tracing::info!("[{}] Loaded {} keyword(s)", scope, store.len());
        self.rebuild_locked(&store).await?;
        Ok(())
    }

    /// Rebuild the scope's automaton from its current keys
    pub async fn rebuild(&self, scope: ScopeId) -> Result<(), BotError> {
        let store = self.stores.open(scope).await?;
        let store = store.lock().await;
        self.rebuild_locked(&store).await?;
        Ok(())
    }

    /// Rebuild while the caller already holds the store lock
    pub async fn rebuild_locked(&self, store: &KeyedStore) -> Result<Arc<KeywordAutomaton>, BotError> {
        let automaton = Arc::new(KeywordAutomaton::build(store.keys())?);
        tracing::debug!("[{}] Updated automaton with {} keyword(s)", store.scope(), automaton.len());
        self.automata.write().await.insert(store.scope(), automaton.clone());
        Ok(automaton)
    }

    /// Reload the scope's store from persistence, then rebuild
    pub async fn reload(&self, scope: ScopeId) -> Result<usize, BotError> {
        let store = self.stores.open(scope).await?;
        let mut store = store.lock().await;
        let loaded = store.load().await?;
        self.rebuild_locked(&store).await?;
        Ok(loaded)
    }

    pub async fn count_keywords(&self) -> usize {
        self.stores.total_entries().await
    }

    /// Count every distinct keyword in the message, announce gets and react.
    ///
    /// Counts are committed (and saved on a get) under the store lock before
    /// any outbound call. Reactions go out in keyword order then stored order;
    /// a `Forbidden` reaction ends all reactions for the message.
    pub async fn handle(&self, bot: &dyn Bot, message: &Message) -> Result<MatchReport, BotError> {
        let Some(scope) = message.scope else {
            return Ok(MatchReport::default());
        };
        let store = self.stores.get(scope).await.ok_or_else(|| {
            BotError::Internal(format!("keywords for scope {} were never initialized", scope))
        })?;

        let (hits, save_needed) = {
            let mut store = store.lock().await;
            if store.is_empty() {
                return Ok(MatchReport::default());
            }

            let existing = self.automata.read().await.get(&scope).cloned();
            let automaton = match existing {
                Some(automaton) => automaton,
                None => self.rebuild_locked(&store).await?,
            };

            let content = message.clean_content.to_lowercase();
            let mut hits = Vec::new();
            let mut save_needed = false;
            for keyword in automaton.distinct_matches(&content) {
                let mut entry: KeywordEntry = match store.get_as(keyword) {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("[{}] Skipping keyword \"{}\": {}", scope, keyword, e);
                        continue;
                    }
                };
                entry.count += 1;
                store.set_as(keyword, &entry)?;
                tracing::info!("{} incremented count of \"{}\" to {}", message.author, keyword, entry.count);
                save_needed |= is_get(entry.count);
                hits.push(Hit {
                    keyword: keyword.to_string(),
                    count: entry.count,
                    reactions: entry.reactions,
                });
            }

            if save_needed {
                store.save().await?;
            }
            (hits, save_needed)
        };

        let mut report = MatchReport::default();
        if save_needed {
            tracing::debug!("[{}] Saved keyword counts after a get", scope);
        }
        for hit in hits {
            report.counted.push((hit.keyword.clone(), hit.count));

            if is_get(hit.count) {
                let announcement = format!("{} #{}", hit.keyword, hit.count);
                if let Err(e) = bot.send_message(message.channel_id, &announcement).await {
                    tracing::error!("Failed to announce \"{}\": {}", announcement, e);
                }
                report.announced.push(announcement);
            }

            if report.reaction_limit_hit {
                continue;
            }
            tracing::debug!("Got reactions [{}] for keyword \"{}\"", hit.reactions.join(", "), hit.keyword);
            for reaction in &hit.reactions {
                tracing::info!("Reacting with \"{}\"", reaction);
                match bot.add_reaction(message.channel_id, &message.id, reaction).await {
                    Ok(()) => report.reactions_added += 1,
                    Err(TransportError::Forbidden(_)) => {
                        tracing::info!("Reached max number of reactions");
                        report.reaction_limit_hit = true;
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Error reacting to keyword \"{}\" with \"{}\": {}", hit.keyword, reaction, e);
                    }
                }
            }
        }

        Ok(report)
    }
}

//! Keyed stores and the flat-file persistence backend
//!
//! A `KeyedStore` maps normalized string keys to JSON values for one
//! (kind, scope) pair. Keys are trimmed and lower-cased on every access, so
//! `" Foo "` and `"foo"` name the same entry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::application::errors::StorageError;
use crate::domain::entities::ScopeId;
use crate::domain::traits::{Persistence, StoreKind};

/// Trim and case-fold a key
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Mutable mapping for one (kind, scope) pair
pub struct KeyedStore {
    kind: StoreKind,
    scope: ScopeId,
    backend: Arc<dyn Persistence>,
    entries: Map<String, Value>,
}

impl KeyedStore {
    /// An empty, unloaded store
    pub fn new(kind: StoreKind, scope: ScopeId, backend: Arc<dyn Persistence>) -> Self {
        Self {
            kind,
            scope,
            backend,
            entries: Map::new(),
        }
    }

    /// Create and load in one step
    pub async fn open(kind: StoreKind, scope: ScopeId, backend: Arc<dyn Persistence>) -> Result<Self, StorageError> {
        let mut store = Self::new(kind, scope, backend);
        store.load().await?;
        Ok(store)
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Replace the in-memory contents with what is persisted
    pub async fn load(&mut self) -> Result<usize, StorageError> {
        let loaded = self.backend.load(self.kind, self.scope).await?;
        self.entries = loaded
            .into_iter()
            .map(|(key, value)| (normalize_key(&key), value))
            .collect();
        tracing::info!(
            "[{}] Loaded {} {} from {}",
            self.scope,
            self.entries.len(),
            self.kind,
            self.backend.describe(self.kind, self.scope)
        );
        Ok(self.entries.len())
    }

    /// Persist the current contents.
    ///
    /// Returns `Ok(false)` without writing when the store is empty and the
    /// backend already holds data: an empty store usually means a failed
    /// load, not a deliberate wipe.
    pub async fn save(&self) -> Result<bool, StorageError> {
        if self.entries.is_empty() && self.backend.has_data(self.kind, self.scope).await? {
            tracing::warn!(
                "Refusing to overwrite {} with empty {} store",
                self.backend.describe(self.kind, self.scope),
                self.kind
            );
            return Ok(false);
        }
        tracing::info!("Saving {} for {}", self.kind, self.scope);
        self.backend.save(self.kind, self.scope, &self.entries).await?;
        Ok(true)
    }

    /// Insert or overwrite
    pub fn set(&mut self, key: &str, value: Value) -> Option<Value> {
        let key = normalize_key(key);
        tracing::debug!("Set \"{}\" to {}", key, value);
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_some() {
            tracing::debug!("Overwrote \"{}\" in {} for {}", key, self.kind, self.scope);
        }
        previous
    }

    /// Insert, failing if the key is already present
    pub fn add(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let key = normalize_key(key);
        if self.entries.contains_key(&key) {
            return Err(StorageError::KeyExists(key));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<Value, StorageError> {
        let key = normalize_key(key);
        match self.entries.remove(&key) {
            Some(value) => {
                tracing::info!("Deleted \"{}\"", key);
                Ok(value)
            }
            None => Err(StorageError::KeyNotFound(key)),
        }
    }

    pub fn get(&self, key: &str) -> Result<&Value, StorageError> {
        let key = normalize_key(key);
        self.entries.get(&key).ok_or(StorageError::KeyNotFound(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value, StorageError> {
        let key = normalize_key(key);
        match self.entries.get_mut(&key) {
            Some(value) => Ok(value),
            None => Err(StorageError::KeyNotFound(key)),
        }
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let value = self.get(key)?;
        Ok(T::deserialize(value)?)
    }

    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Normalized keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, sorted, joined for display
    pub fn as_sorted_text_list(&self) -> String {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys.join(", ")
    }
}

/// Lazily created stores of one kind, one per scope
pub struct ScopedStores {
    kind: StoreKind,
    backend: Arc<dyn Persistence>,
    stores: RwLock<HashMap<ScopeId, Arc<Mutex<KeyedStore>>>>,
}

impl ScopedStores {
    pub fn new(kind: StoreKind, backend: Arc<dyn Persistence>) -> Self {
        Self {
            kind,
            backend,
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// The scope's store, loading it on first reference
    pub async fn open(&self, scope: ScopeId) -> Result<Arc<Mutex<KeyedStore>>, StorageError> {
        if let Some(store) = self.get(scope).await {
            return Ok(store);
        }
        let mut stores = self.stores.write().await;
        if let Some(store) = stores.get(&scope) {
            return Ok(store.clone());
        }
        let store = KeyedStore::open(self.kind, scope, self.backend.clone()).await?;
        let store = Arc::new(Mutex::new(store));
        stores.insert(scope, store.clone());
        Ok(store)
    }

    /// The scope's store if it has been opened
    pub async fn get(&self, scope: ScopeId) -> Option<Arc<Mutex<KeyedStore>>> {
        self.stores.read().await.get(&scope).cloned()
    }

    pub async fn scopes(&self) -> Vec<ScopeId> {
        let mut scopes: Vec<ScopeId> = self.stores.read().await.keys().copied().collect();
        scopes.sort();
        scopes
    }

    /// Entries across every open scope
    pub async fn total_entries(&self) -> usize {
        let stores: Vec<Arc<Mutex<KeyedStore>>> = self.stores.read().await.values().cloned().collect();
        let mut total = 0;
        for store in stores {
            total += store.lock().await.len();
        }
        total
    }

    /// Save every open store, as on shutdown
    pub async fn save_all(&self) -> Result<(), StorageError> {
        let stores: Vec<Arc<Mutex<KeyedStore>>> = self.stores.read().await.values().cloned().collect();
        for store in stores {
            store.lock().await.save().await?;
        }
        Ok(())
    }
}

/// JSON file-based persistence: `<base>/<scope>/<kind>.json`
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        tracing::info!("Creating storage directory {}", self.base_path.display());
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    pub fn path_for(&self, kind: StoreKind, scope: ScopeId) -> PathBuf {
        self.base_path
            .join(scope.to_string())
            .join(format!("{}.json", kind.as_str()))
    }
}

/// Layout of the data files: four-space indentation, `"key" : value`
/// pairs and ASCII-only text with `\uXXXX` escapes
struct StoreFormatter {
    pretty: PrettyFormatter<'static>,
}

impl StoreFormatter {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for StoreFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize in the data file layout; `Map` keeps keys sorted
fn to_pretty_json(entries: &Map<String, Value>) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, StoreFormatter::new());
    entries.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl Persistence for FileBackend {
    async fn load(&self, kind: StoreKind, scope: ScopeId) -> Result<Map<String, Value>, StorageError> {
        let path = self.path_for(kind, scope);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Creating new entries file \"{}\"", path.display());
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, b"{}").await?;
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(entries) => Ok(entries),
            other => Err(StorageError::InvalidDocument {
                location: path.display().to_string(),
                reason: format!("expected a JSON object, found {}", other),
            }),
        }
    }

    async fn save(&self, kind: StoreKind, scope: ScopeId, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let path = self.path_for(kind, scope);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, to_pretty_json(entries)?).await?;
        Ok(())
    }

    async fn has_data(&self, kind: StoreKind, scope: ScopeId) -> Result<bool, StorageError> {
        match tokio::fs::metadata(self.path_for(kind, scope)).await {
            Ok(meta) => Ok(meta.len() >= 2),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self, kind: StoreKind, scope: ScopeId) -> String {
        format!("\"{}\"", self.path_for(kind, scope).display())
    }
}

#[cfg(test)]
mod tests;

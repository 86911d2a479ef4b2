//! SQLite document persistence
//!
//! Each (kind, scope) pair is one row whose body is the store's JSON object,
//! the relational equivalent of one document per guild per collection.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::entities::ScopeId;
use crate::domain::traits::{Persistence, StoreKind};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let label = path.as_ref().display().to_string();
        let conn = Connection::open(path)?;
        Self::with_connection(conn, label)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, label: String) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label,
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StorageError::Task("Lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

fn init_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            kind TEXT NOT NULL,
            scope TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '{}',
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (kind, scope)
        )",
        [],
    )?;
    Ok(())
}

fn read_body(conn: &Connection, kind: &str, scope: &str) -> Result<Option<String>, StorageError> {
    let body = conn
        .query_row(
            "SELECT body FROM documents WHERE kind = ?1 AND scope = ?2",
            [kind, scope],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(body)
}

fn parse_body(body: &str, location: String) -> Result<Map<String, Value>, StorageError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(entries) => Ok(entries),
        other => Err(StorageError::InvalidDocument {
            location,
            reason: format!("expected a JSON object, found {}", other),
        }),
    }
}

#[async_trait]
impl Persistence for Database {
    async fn load(&self, kind: StoreKind, scope: ScopeId) -> Result<Map<String, Value>, StorageError> {
        let location = self.describe(kind, scope);
        self.with_conn(move |conn| {
            let (kind, scope) = (kind.as_str(), scope.to_string());
            match read_body(conn, kind, &scope)? {
                Some(body) => parse_body(&body, location),
                None => {
                    tracing::info!("No document found for {}, creating one", location);
                    conn.execute(
                        "INSERT INTO documents (kind, scope, body) VALUES (?1, ?2, '{}')",
                        [kind, scope.as_str()],
                    )?;
                    Ok(Map::new())
                }
            }
        })
        .await
    }

    async fn save(&self, kind: StoreKind, scope: ScopeId, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let body = serde_json::to_string(entries)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO documents (kind, scope, body, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT (kind, scope) DO UPDATE
                 SET body = excluded.body, updated_at = excluded.updated_at",
                [kind.as_str(), scope.to_string().as_str(), body.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn has_data(&self, kind: StoreKind, scope: ScopeId) -> Result<bool, StorageError> {
        let location = self.describe(kind, scope);
        self.with_conn(move |conn| match read_body(conn, kind.as_str(), &scope.to_string())? {
            Some(body) => Ok(!parse_body(&body, location)?.is_empty()),
            None => Ok(false),
        })
        .await
    }

    fn describe(&self, kind: StoreKind, scope: ScopeId) -> String {
        format!("{}:{}/{}", self.label, kind, scope)
    }
}

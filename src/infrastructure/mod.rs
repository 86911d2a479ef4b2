//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage and Database: Data persistence
//! - Lookup: HTTP clients for external services
//! - Adapters: Transport integrations

pub mod adapters;
pub mod config;
pub mod database;
pub mod lookup;
pub mod storage;

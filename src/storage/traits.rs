//! Storage traits and error types
//!
//! This module defines the trait interface for content store backends and
//! associated error types.

use crate::storage::{NewAccount, NewPost, PostVariant, ProfileRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during content store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Object key already exists: {0}")]
    DuplicateKey(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for content store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for content store backends
///
/// These are typed versions of the store's logical operations: lookups and
/// inserts against the profile, post and post-variant tables, plus an object
/// storage sub-interface for images.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // ===== Identity =====

    /// Finds the profile id registered under `username`, if any
    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<String>>;

    /// Creates a confirmed service account and returns its id
    async fn create_account(&self, account: &NewAccount) -> StoreResult<String>;

    /// Inserts the profile row for an existing account
    async fn insert_profile(&self, profile: &ProfileRecord) -> StoreResult<()>;

    // ===== Posts =====

    /// Inserts a parent post, returning its identifier when the store reports one
    async fn insert_post(&self, post: &NewPost) -> StoreResult<Option<String>>;

    /// Inserts size variants for a post, returning how many rows were written
    async fn insert_variants(&self, variants: &[PostVariant]) -> StoreResult<usize>;

    // ===== Object Storage =====

    /// Stores `bytes` under `key`
    async fn upload_object(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> StoreResult<()>;

    /// Durable public reference for an uploaded object
    fn public_url(&self, key: &str) -> String;
}

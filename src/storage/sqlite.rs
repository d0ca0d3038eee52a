//! SQLite content store implementation
//!
//! This module provides a SQLite-backed implementation of the ContentStore
//! trait. Uploaded objects are kept as blobs; public references are built from
//! a configured base URL.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ContentStore, StoreError, StoreResult};
use crate::storage::{NewAccount, NewPost, PostVariant, ProfileRecord};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// SQLite content store backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
    public_base_url: String,
    bucket: String,
}

impl SqliteStore {
    /// Opens (or creates) a store at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `public_base_url` - Base URL object references are built from
    /// * `bucket` - Bucket name objects are filed under
    pub fn new(path: &Path, public_base_url: &str, bucket: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, public_base_url, bucket)
    }

    /// Creates an in-memory store
    pub fn new_in_memory(public_base_url: &str, bucket: &str) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, public_base_url, bucket)
    }

    fn with_connection(conn: Connection, public_base_url: &str, bucket: &str) -> StoreResult<Self> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    // ===== Inspection =====

    /// Number of accounts registered under `email`
    pub fn count_accounts(&self, email: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Ids of all posts, oldest first
    pub fn post_ids(&self) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM posts ORDER BY created_at, rowid")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Total number of variant rows across all posts
    pub fn count_variants(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM post_variants", [], |row| {
            row.get(0)
        })?;
        Ok(count as u64)
    }

    /// Variant rows of one post, in insertion order
    pub fn variants_for_post(&self, post_id: &str) -> StoreResult<Vec<PostVariant>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT post_id, brand, product_name, size, category, description, purchase_link
             FROM post_variants WHERE post_id = ?1 ORDER BY id",
        )?;

        let variants = stmt
            .query_map(params![post_id], |row| {
                Ok(PostVariant {
                    post_id: row.get(0)?,
                    brand: row.get(1)?,
                    product_name: row.get(2)?,
                    size: row.get(3)?,
                    category: row.get(4)?,
                    description: row.get(5)?,
                    purchase_link: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(variants)
    }

    /// Fetches a post's author, image reference and description
    pub fn get_post(&self, post_id: &str) -> StoreResult<Option<NewPost>> {
        let conn = self.lock()?;
        let post = conn
            .query_row(
                "SELECT user_id, image_url, publisher_height, publisher_size, description
                 FROM posts WHERE id = ?1",
                params![post_id],
                |row| {
                    Ok(NewPost {
                        user_id: row.get(0)?,
                        image_url: row.get(1)?,
                        publisher_height: row.get(2)?,
                        publisher_size: row.get(3)?,
                        description: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(post)
    }

    /// Content type and bytes of a stored object
    pub fn get_object(&self, key: &str) -> StoreResult<Option<(String, Vec<u8>)>> {
        let conn = self.lock()?;
        let object = conn
            .query_row(
                "SELECT content_type, bytes FROM storage_objects WHERE bucket = ?1 AND key = ?2",
                params![self.bucket, key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(object)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl ContentStore for SqliteStore {
    // ===== Identity =====

    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM profiles WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    async fn create_account(&self, account: &NewAccount) -> StoreResult<String> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO accounts (id, email, display_name, email_confirmed, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![id, account.email, account.display_name, Utc::now().to_rfc3339()],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::ConstraintViolation(format!(
                    "account {} already exists",
                    account.email
                ))
            } else {
                StoreError::Sqlite(e)
            }
        })?;
        Ok(id)
    }

    async fn insert_profile(&self, profile: &ProfileRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO profiles (id, username, height, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                profile.id,
                profile.username,
                profile.height,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    // ===== Posts =====

    async fn insert_post(&self, post: &NewPost) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO posts (id, user_id, image_url, publisher_height, publisher_size,
             description, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                post.user_id,
                post.image_url,
                post.publisher_height,
                post.publisher_size,
                post.description,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(Some(id))
    }

    async fn insert_variants(&self, variants: &[PostVariant]) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO post_variants (post_id, brand, product_name, size, category,
                 description, purchase_link) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for v in variants {
                stmt.execute(params![
                    v.post_id,
                    v.brand,
                    v.product_name,
                    v.size,
                    v.category,
                    v.description,
                    v.purchase_link
                ])?;
            }
        }
        tx.commit()?;
        Ok(variants.len())
    }

    // ===== Object Storage =====

    async fn upload_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO storage_objects (bucket, key, content_type, bytes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.bucket, key, content_type, bytes, Utc::now().to_rfc3339()],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::DuplicateKey(key.to_string())
            } else {
                StoreError::Sqlite(e)
            }
        })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, key)
    }
}

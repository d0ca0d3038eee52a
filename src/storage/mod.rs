//! Storage module for the destination content store
//!
//! The content store is an external collaborator: it persists the bot
//! identity, published posts and their size variants, and hosts uploaded
//! images. Two adapters implement the `ContentStore` trait:
//! - `SqliteStore`: a local SQLite database (objects stored as blobs)
//! - `SupabaseStore`: a Supabase project over its REST, auth and storage APIs

mod schema;
mod sqlite;
mod supabase;
mod traits;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;
pub use traits::{ContentStore, StoreError, StoreResult};

use crate::config::{load_credentials, StoreBackend, StoreConfig};
use crate::ShelfError;
use std::path::Path;
use std::sync::Arc;

/// Content type every uploaded image is stored with
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Opens the content store selected by the configuration
///
/// The Supabase backend reads its credentials from the environment; missing
/// credentials surface as a configuration error before any network activity.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ContentStore>, ShelfError> {
    match config.backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::new(
                Path::new(&config.database_path),
                &config.public_base_url,
                &config.bucket,
            )?;
            Ok(Arc::new(store))
        }
        StoreBackend::Supabase => {
            let credentials = load_credentials()?;
            let store = SupabaseStore::new(&credentials, &config.bucket)?;
            Ok(Arc::new(store))
        }
    }
}

/// A new service account to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    /// Display name stored in the account metadata
    pub display_name: String,
}

/// Profile row owned by an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Same identifier as the backing account
    pub id: String,
    pub username: String,
    pub height: u32,
}

/// Parent record of a published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: String,
    pub image_url: String,
    pub publisher_height: u32,
    pub publisher_size: String,
    pub description: String,
}

/// One size variant attached to a published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostVariant {
    pub post_id: String,
    pub brand: String,
    pub product_name: String,
    pub size: String,
    pub category: String,
    pub description: String,
    pub purchase_link: String,
}

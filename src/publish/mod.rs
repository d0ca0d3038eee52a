//! Publishing module
//!
//! Resolves the bot author once per run and turns product records into
//! posts in the content store.

mod identity;
mod publisher;

pub use identity::{BotIdentity, IdentityResolver};
pub use publisher::{
    post_description, storage_key, variants_for, AssetPublisher, IMAGE_DOWNLOAD_TIMEOUT,
};

//! Asset publishing
//!
//! Re-hosts product images in the content store and writes one post per
//! product: a parent record, then one variant per size. Variants are only
//! written once the parent exists and its identifier is known.

use crate::crawler::ProductRecord;
use crate::publish::BotIdentity;
use crate::storage::{ContentStore, NewPost, PostVariant, IMAGE_CONTENT_TYPE};
use crate::{PublishError, PublishResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Timeout for one image download
pub const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of characters of the product name kept in a storage key
const SLUG_MAX_CHARS: usize = 50;

/// Publishes product records as posts
pub struct AssetPublisher {
    store: Arc<dyn ContentStore>,
    client: Client,
}

impl AssetPublisher {
    /// Creates a publisher downloading images with `client`
    pub fn new(store: Arc<dyn ContentStore>, client: Client) -> Self {
        Self { store, client }
    }

    /// Downloads an image and re-hosts it in the content store
    ///
    /// # Arguments
    ///
    /// * `image_url` - Source image address
    /// * `product_name` - Used to build a readable storage key
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Public URL of the stored copy
    /// * `Err(PublishError)` - Download or upload failed
    pub async fn upload_image(&self, image_url: &str, product_name: &str) -> PublishResult<String> {
        let response = self
            .client
            .get(image_url)
            .timeout(IMAGE_DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|source| PublishError::ImageDownload {
                url: image_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::ImageStatus {
                url: image_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| PublishError::ImageDownload {
                url: image_url.to_string(),
                source,
            })?;

        let key = storage_key(product_name, image_url, Utc::now());
        tracing::debug!("Uploading {} bytes as {}", bytes.len(), key);
        self.store
            .upload_object(&key, bytes.to_vec(), IMAGE_CONTENT_TYPE)
            .await?;

        Ok(self.store.public_url(&key))
    }

    /// Publishes one product as a post authored by `bot`
    ///
    /// Returns the new post identifier, or `None` if any step failed. Failures
    /// are logged here and never propagate.
    pub async fn publish(&self, record: &ProductRecord, bot: &BotIdentity) -> Option<String> {
        match self.try_publish(record, bot).await {
            Ok(post_id) => {
                tracing::info!("Published {} as post {}", record.name, post_id);
                Some(post_id)
            }
            Err(e) => {
                tracing::error!("Failed to publish {}: {}", record.name, e);
                None
            }
        }
    }

    /// Publishes one product, reporting the first failure
    pub async fn try_publish(
        &self,
        record: &ProductRecord,
        bot: &BotIdentity,
    ) -> PublishResult<String> {
        // No image, no post
        let image_url = self.upload_image(&record.image_url, &record.name).await?;

        let post = NewPost {
            user_id: bot.id.clone(),
            image_url,
            publisher_height: bot.height,
            publisher_size: bot.size.clone(),
            description: post_description(record),
        };

        let post_id = self
            .store
            .insert_post(&post)
            .await?
            .ok_or(PublishError::MissingPostId)?;

        let variants = variants_for(record, &post_id);
        let inserted = self.store.insert_variants(&variants).await?;
        tracing::debug!("Inserted {} variants for post {}", inserted, post_id);

        Ok(post_id)
    }
}

/// Text of a post: name and price, a blank line, then the product description
pub fn post_description(record: &ProductRecord) -> String {
    format!(
        "{} - {}\n\n{}",
        record.name, record.price, record.description
    )
}

/// One variant per size, in size order
pub fn variants_for(record: &ProductRecord, post_id: &str) -> Vec<PostVariant> {
    record
        .sizes
        .iter()
        .map(|size| PostVariant {
            post_id: post_id.to_string(),
            brand: record.brand.clone(),
            product_name: record.name.clone(),
            size: size.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            purchase_link: record.product_url.clone(),
        })
        .collect()
}

/// Storage key for a re-hosted image
///
/// `scraped/{unix seconds}-{slug}-{hash}.jpg`, where the hash is the first 8
/// hex digits of the SHA-256 of the source image URL. Two products with the
/// same name scraped in the same second still get distinct keys.
///
/// The slug is the lower cased product name cut to 50 characters. Every
/// character other than an ASCII letter or digit becomes a hyphen, not just
/// spaces: a `/` in a name must not open a sub-folder under `scraped/`, and
/// accented letters are not valid in object keys. "Jean 50/50 Été" slugs to
/// `jean-50-50--t-`.
pub fn storage_key(product_name: &str, image_url: &str, at: DateTime<Utc>) -> String {
    let slug: String = product_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .take(SLUG_MAX_CHARS)
        .collect();

    let digest = hex::encode(Sha256::digest(image_url.as_bytes()));

    format!("scraped/{}-{}-{}.jpg", at.timestamp(), slug, &digest[..8])
}

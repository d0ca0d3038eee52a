//! Supabase content store implementation
//!
//! Talks to a Supabase project through three of its HTTP surfaces:
//! - PostgREST (`/rest/v1`) for the profile, post and variant tables
//! - GoTrue admin (`/auth/v1/admin/users`) to create the bot account
//! - Storage (`/storage/v1/object`) for image uploads

use crate::config::Credentials;
use crate::storage::traits::{ContentStore, StoreError, StoreResult};
use crate::storage::{NewAccount, NewPost, PostVariant, ProfileRecord};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PROFILES_TABLE: &str = "profiles";
const POSTS_TABLE: &str = "outfits";
const VARIANTS_TABLE: &str = "clothing_pieces";

/// Row shape returned when only the id is selected
#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

/// Admin user creation responses carry the user either bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedUser {
    Wrapped { user: IdRow },
    Bare(IdRow),
}

/// Supabase content store backend
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    bucket: String,
}

impl SupabaseStore {
    /// Builds a store client authenticated with the service role key
    pub fn new(credentials: &Credentials, bucket: &str) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&credentials.service_key)
            .map_err(|e| StoreError::Decode(format!("invalid service key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.service_key))
            .map_err(|e| StoreError::Decode(format!("invalid service key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// Inserts rows into a table without asking for them back
    async fn insert_minimal(&self, table: &str, body: serde_json::Value) -> StoreResult<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into a StoreError carrying the body
async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 409 {
        return Err(StoreError::ConstraintViolation(body));
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ContentStore for SupabaseStore {
    async fn find_profile_by_username(&self, username: &str) -> StoreResult<Option<String>> {
        let filter = format!("eq.{}", username);
        let response = self
            .client
            .get(self.table_url(PROFILES_TABLE))
            .query(&[("select", "id"), ("username", filter.as_str())])
            .send()
            .await?;

        let rows: Vec<IdRow> = ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    async fn create_account(&self, account: &NewAccount) -> StoreResult<String> {
        let response = self
            .client
            .post(format!("{}/auth/v1/admin/users", self.base_url))
            .json(&json!({
                "email": account.email,
                "email_confirm": true,
                "user_metadata": { "username": account.display_name },
            }))
            .send()
            .await?;

        let created: CreatedUser = ensure_success(response).await?.json().await?;
        Ok(match created {
            CreatedUser::Wrapped { user } => user.id,
            CreatedUser::Bare(user) => user.id,
        })
    }

    async fn insert_profile(&self, profile: &ProfileRecord) -> StoreResult<()> {
        self.insert_minimal(
            PROFILES_TABLE,
            json!({
                "id": profile.id,
                "username": profile.username,
                "height": profile.height,
            }),
        )
        .await
    }

    async fn insert_post(&self, post: &NewPost) -> StoreResult<Option<String>> {
        let response = self
            .client
            .post(self.table_url(POSTS_TABLE))
            .header("Prefer", "return=representation")
            .json(&json!({
                "user_id": post.user_id,
                "image_url": post.image_url,
                "publisher_height": post.publisher_height,
                "publisher_size": post.publisher_size,
                "description": post.description,
            }))
            .send()
            .await?;

        let rows: Vec<IdRow> = ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    async fn insert_variants(&self, variants: &[PostVariant]) -> StoreResult<usize> {
        if variants.is_empty() {
            return Ok(0);
        }

        let rows: Vec<serde_json::Value> = variants
            .iter()
            .map(|v| {
                json!({
                    "outfit_id": v.post_id,
                    "brand": v.brand,
                    "product_name": v.product_name,
                    "size": v.size,
                    "category": v.category,
                    "description": v.description,
                    "purchase_link": v.purchase_link,
                })
            })
            .collect();

        self.insert_minimal(VARIANTS_TABLE, serde_json::Value::Array(rows))
            .await?;
        Ok(variants.len())
    }

    async fn upload_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<()> {
        let response = self
            .client
            .post(self.object_url(key))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        match ensure_success(response).await {
            Ok(_) => Ok(()),
            Err(StoreError::ConstraintViolation(_)) => Err(StoreError::DuplicateKey(key.to_string())),
            Err(e) => Err(e),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

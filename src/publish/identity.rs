//! Bot identity resolution
//!
//! Every post is authored by one service-owned bot. Resolution looks the
//! bot up by display name and creates it when absent: first the backing
//! account, then the profile that shares its identifier.

use crate::config::BotConfig;
use crate::state::BootstrapState;
use crate::storage::{ContentStore, NewAccount, ProfileRecord};
use crate::{PublishError, PublishResult};
use std::sync::Arc;

/// The resolved bot author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: String,
    pub display_name: String,
    /// Fixed height attached to every post
    pub height: u32,
    /// Fixed size attached to every post
    pub size: String,
}

/// Looks up or bootstraps the bot identity
pub struct IdentityResolver {
    store: Arc<dyn ContentStore>,
    bot: BotConfig,
    state: BootstrapState,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn ContentStore>, bot: BotConfig) -> Self {
        Self {
            store,
            bot,
            state: BootstrapState::Pending,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.bot.display_name
    }

    /// How far the last resolution got
    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Returns the bot identity, creating it on first use
    ///
    /// Repeated calls against the same store yield the same identifier and
    /// create at most one account. If the account is created but the profile
    /// insert fails, the account is left in place and
    /// `PublishError::IdentityIncomplete` names it.
    pub async fn resolve(&mut self) -> PublishResult<BotIdentity> {
        if let Some(identity) = self.lookup().await? {
            return Ok(identity);
        }

        tracing::info!("Creating bot account {}", self.bot.email);
        let account_id = self
            .store
            .create_account(&NewAccount {
                email: self.bot.email.clone(),
                display_name: self.bot.display_name.clone(),
            })
            .await?;
        self.state = BootstrapState::AccountCreated {
            account_id: account_id.clone(),
        };

        let profile = ProfileRecord {
            id: account_id.clone(),
            username: self.bot.display_name.clone(),
            height: self.bot.height,
        };
        if let Err(source) = self.store.insert_profile(&profile).await {
            tracing::error!(
                "Bot account {} created but its profile was not: {}",
                account_id,
                source
            );
            return Err(PublishError::IdentityIncomplete { account_id, source });
        }

        tracing::info!("Created bot profile {}", account_id);
        self.state = BootstrapState::ProfileCreated {
            id: account_id.clone(),
        };
        Ok(self.identity(account_id))
    }

    /// Finds the bot profile without creating anything
    pub async fn lookup(&mut self) -> PublishResult<Option<BotIdentity>> {
        let found = self
            .store
            .find_profile_by_username(&self.bot.display_name)
            .await?;

        let Some(id) = found else {
            return Ok(None);
        };

        tracing::info!("Found existing bot profile {}", id);
        self.state = BootstrapState::Existing { id: id.clone() };
        Ok(Some(self.identity(id)))
    }

    fn identity(&self, id: String) -> BotIdentity {
        BotIdentity {
            id,
            display_name: self.bot.display_name.clone(),
            height: self.bot.height,
            size: self.bot.size.clone(),
        }
    }
}

/// Progress of the two-phase bot identity bootstrap
///
/// Creating the bot is not atomic: the backing account is created first and
/// the profile second. Nothing is rolled back if the second phase fails, so
/// the tag records exactly how far creation got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// No lookup or creation has been attempted
    Pending,

    /// The profile already existed and was found by display name
    Existing { id: String },

    /// The account exists but its profile has not been created
    AccountCreated { account_id: String },

    /// Both account and profile exist
    ProfileCreated { id: String },
}

impl BootstrapState {
    /// Identifier usable as a post author, once the bootstrap is complete
    pub fn author_id(&self) -> Option<&str> {
        match self {
            Self::Existing { id } | Self::ProfileCreated { id } => Some(id),
            Self::Pending | Self::AccountCreated { .. } => None,
        }
    }

    /// Returns true if an account was created without its profile
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::AccountCreated { .. })
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::Pending
    }
}

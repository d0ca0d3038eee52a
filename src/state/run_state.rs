/// Run state definitions for tracking pipeline progress
///
/// A run moves strictly forward through these states. The only shortcut is a
/// failed fetch, which jumps from `Fetching` straight to `Reporting`.
use std::fmt;
use thiserror::Error;

/// Represents the current stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Nothing has happened yet
    Idle,

    /// The bot account id is known
    IdentityResolved,

    /// The listing page is being retrieved
    Fetching,

    /// Product cards are being extracted from the page
    Extracting,

    /// Extracted records are being published (or counted, under dry-run)
    Publishing,

    /// The summary is being reported
    Reporting,

    /// The run is finished
    Done,
}

/// A transition the run state machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid run state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::IdentityResolved)
                | (Self::IdentityResolved, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Reporting)
                | (Self::Extracting, Self::Publishing)
                | (Self::Publishing, Self::Reporting)
                | (Self::Reporting, Self::Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: RunState) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(next) {
            return Err(InvalidTransition { from: *self, to: next });
        }
        tracing::trace!("Run state {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::IdentityResolved => "identity_resolved",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Publishing => "publishing",
            Self::Reporting => "reporting",
            Self::Done => "done",
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Fixed pacing between pipeline steps
//!
//! The source site gets one pause after every card extraction and the
//! content store one pause after every publish. There is no adaptive
//! backoff.

use crate::config::PacingConfig;
use std::time::Duration;

/// Fixed inter-step delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    card_delay: Duration,
    publish_delay: Duration,
}

impl Pacer {
    pub fn new(card_delay: Duration, publish_delay: Duration) -> Self {
        Self {
            card_delay,
            publish_delay,
        }
    }

    pub fn from_config(pacing: &PacingConfig) -> Self {
        Self::new(
            Duration::from_millis(pacing.card_delay_ms),
            Duration::from_millis(pacing.publish_delay_ms),
        )
    }

    pub fn card_delay(&self) -> Duration {
        self.card_delay
    }

    pub fn publish_delay(&self) -> Duration {
        self.publish_delay
    }

    /// Pause after one card has been extracted
    pub async fn after_card(&self) {
        pause(self.card_delay).await;
    }

    /// Pause after one publish attempt
    pub async fn after_publish(&self) {
        pause(self.publish_delay).await;
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

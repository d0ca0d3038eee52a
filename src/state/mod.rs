//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: The stage a pipeline run is in (identity, fetch, extract, publish, report)
//! - `BootstrapState`: How far the non-atomic bot identity creation got

mod bootstrap_state;
mod run_state;

// Re-export main types
pub use bootstrap_state::BootstrapState;
pub use run_state::{InvalidTransition, RunState};

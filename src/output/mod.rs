//! Output module for run progress and summaries
//!
//! This module handles:
//! - Counting per-product outcomes
//! - Printing progress and the final summary

mod reporter;
pub mod stats;

pub use reporter::{Reporter, RunBanner};
pub use stats::RunSummary;

//! Dashboard metric aggregation.
//!
//! This module turns row subsets of the merged measurement table into
//! per-metric summaries, breaks them down by vendor and band, and classifies
//! the resulting values for card display.

pub mod aggregate;
pub mod badge;
pub mod bands;
pub mod types;
pub mod utility;

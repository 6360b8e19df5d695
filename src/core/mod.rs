//! Core selection logic for slackpack.
//!
//! This module contains:
//! - [`filter`] - Channel and date-range selection from a filter file
//!
//! # Quick Start
//!
//! ```rust
//! use slackpack::core::{FilterSpec, apply_filters};
//!
//! # fn main() -> slackpack::Result<()> {
//! let spec = FilterSpec::from_yaml_str("general:")?;
//! assert!(spec.includes("general"));
//! # Ok(())
//! # }
//! ```

pub mod filter;

// Re-export main types for convenience
pub use filter::{DateRange, FilterSpec, apply_filters};

// Re-export the channel model from the crate root
pub use crate::{Channel, Message};

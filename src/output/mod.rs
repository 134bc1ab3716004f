//! Output formatting and writers for aggregation results.
//!
//! This module handles:
//! - Turning facet totals into the sorted result sequence
//! - Serializing results for stdout or disk

pub mod json;

// Re-export main functions
pub use json::{format_totals, response_to_string, to_response, write_response};

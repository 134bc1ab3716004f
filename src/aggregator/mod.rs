//! Aggregation of facet documents into per-facet totals.
//!
//! Two independent strategies produce the same [`FacetTotals`]:
//! - Buffered: read everything, build a [`FacetTree`](crate::parser::FacetTree), flatten it
//! - Streaming: one pass over the token stream with a stack of open names

pub mod recursive;
pub mod streaming;
pub mod totals;

// Re-export main types and functions
pub use recursive::{aggregate_tree, buffered_totals, flatten, total_of};
pub use streaming::{stream_totals, StreamingAggregator};
pub use totals::FacetTotals;

use crate::output::to_response;
use crate::parser::FacetResponse;
use crate::utils::error::FacetError;
use clap::ValueEnum;
use std::fmt;
use std::io::Read;

/// Which aggregation engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Materialize the tree, then recurse
    Buffered,
    /// Single pass over the token stream
    Streaming,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Buffered => write!(f, "buffered"),
            Strategy::Streaming => write!(f, "streaming"),
        }
    }
}

/// Compute facet totals from a raw document with the chosen strategy
pub fn aggregate<R: Read>(strategy: Strategy, reader: R) -> Result<FacetTotals, FacetError> {
    match strategy {
        Strategy::Buffered => buffered_totals(reader),
        Strategy::Streaming => stream_totals(reader),
    }
}

/// Aggregate a raw document and format the sorted response
///
/// **Public** - shared by the HTTP handlers and the `aggregate` command
pub fn process<R: Read>(strategy: Strategy, reader: R) -> Result<FacetResponse, FacetError> {
    let totals = aggregate(strategy, reader)?;
    Ok(to_response(&totals))
}

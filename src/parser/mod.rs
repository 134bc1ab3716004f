//! Input parsing and schema definitions.
//!
//! This module handles:
//! - Request/response wire schema
//! - Building the facet tree for the buffered strategy

pub mod schema;
pub mod tree;

// Re-export main types
pub use schema::{FacetEntry, FacetRequest, FacetResponse};
pub use tree::{FacetNode, FacetShape, FacetTree, NodeId};

//! Totals computed by walking a materialized facet tree.
//!
//! Every non-root node contributes `{name: total of its subtree}`. When the
//! same name appears more than once in the tree its contributions are
//! added, matching the streaming aggregator.
//!
//! Child totals are folded left to right from `0.0` in document order and
//! each name is recorded after its children (post-order). The streaming
//! aggregator closes facets in exactly this order, which keeps the two
//! strategies' floating-point sums identical.

use super::totals::FacetTotals;
use crate::parser::{FacetRequest, FacetTree, NodeId};
use crate::utils::error::FacetError;
use log::debug;
use std::io::Read;

/// Sum of all leaf counts beneath `id`
///
/// **Public** - a leaf returns its own count; the node name is ignored
pub fn total_of(tree: &FacetTree, id: NodeId) -> f64 {
    let node = tree.node(id);
    if node.is_leaf() {
        return node.count;
    }
    tree.children(id)
        .map(|child| total_of(tree, child))
        .fold(0.0, |total, child| total + child)
}

/// Flatten the subtree at `id` into per-name totals
///
/// **Public** - the root itself never gets an entry
///
/// # Arguments
/// * `tree` - Facet tree
/// * `id` - Node to flatten (usually `tree.root()`)
///
/// # Returns
/// Mapping of every facet name below (and including, unless root) `id`
/// to the sum of the leaf counts beneath it
pub fn flatten(tree: &FacetTree, id: NodeId) -> FacetTotals {
    let mut totals = FacetTotals::new();
    flatten_into(tree, id, &mut totals);
    totals
}

/// Add the entries of the subtree at `id` into `totals`; returns `total_of(id)`
fn flatten_into(tree: &FacetTree, id: NodeId, totals: &mut FacetTotals) -> f64 {
    let node = tree.node(id);

    let total = if node.is_leaf() {
        node.count
    } else {
        tree.children(id)
            .map(|child| flatten_into(tree, child, totals))
            .fold(0.0, |total, child| total + child)
    };

    if !node.is_root() {
        totals.add(&node.name, total);
    }

    total
}

/// Flatten a whole tree
pub fn aggregate_tree(tree: &FacetTree) -> FacetTotals {
    let totals = flatten(tree, tree.root());
    debug!(
        "Flattened {} facets into {} distinct names",
        tree.facet_count(),
        totals.len()
    );
    totals
}

/// Buffer the whole document, build the tree and flatten it
///
/// **Public** - the buffered strategy end to end
///
/// # Errors
/// * `FacetError::Io` - Reading the input failed
/// * `FacetError::Parse` - Malformed JSON or schema violation
/// * `FacetError::Type` - Non-numeric `count`
pub fn buffered_totals<R: Read>(mut reader: R) -> Result<FacetTotals, FacetError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    debug!("Buffered {} bytes of input", buf.len());

    let request: FacetRequest = serde_json::from_slice(&buf)?;
    let tree = FacetTree::from_map(&request.data)?;

    Ok(aggregate_tree(&tree))
}

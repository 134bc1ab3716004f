use facet_aggregator::parser::{FacetRequest, FacetShape, FacetTree, NodeId};
use facet_aggregator::utils::error::FacetError;
use pretty_assertions::assert_eq;
use serde_json::json;

fn tree_from(input: &str) -> Result<FacetTree, FacetError> {
    let request: FacetRequest = serde_json::from_str(input)?;
    FacetTree::from_map(&request.data)
}

fn child(tree: &FacetTree, parent: NodeId, name: &str) -> NodeId {
    tree.children(parent)
        .find(|&id| tree.node(id).name == name)
        .unwrap()
}

#[test]
fn test_tree_shape() {
    let tree = tree_from(
        r#"{"data": {"facet1": {"facet2": {"count": 10}, "facet3": {"count": 5}}, "facet4": {}}}"#,
    )
    .unwrap();

    assert_eq!(tree.facet_count(), 4);
    assert_eq!(tree.children(tree.root()).count(), 2);

    let facet1 = child(&tree, tree.root(), "facet1");
    assert!(!tree.node(facet1).is_leaf());
    assert_eq!(tree.node(facet1).parent, Some(tree.root()));

    let facet2 = child(&tree, facet1, "facet2");
    assert!(tree.node(facet2).is_leaf());
    assert_eq!(tree.node(facet2).count, 10.0);
    assert_eq!(tree.node(facet2).parent, Some(facet1));

    let facet4 = child(&tree, tree.root(), "facet4");
    assert!(tree.node(facet4).is_leaf());
    assert_eq!(tree.node(facet4).count, 0.0);
}

#[test]
fn test_empty_data_tree() {
    let tree = tree_from(r#"{"data": {}}"#).unwrap();
    assert_eq!(tree.facet_count(), 0);
    assert!(tree.node(tree.root()).is_root());
}

#[test]
fn test_classify_leaf_and_interior() {
    let leaf = json!({"count": 3});
    assert!(matches!(
        FacetShape::classify(&leaf, "data.f").unwrap(),
        FacetShape::Leaf(count) if count == 3.0
    ));

    let interior = json!({"g": {"count": 1}});
    assert!(matches!(
        FacetShape::classify(&interior, "data.f").unwrap(),
        FacetShape::Interior(_)
    ));
}

#[test]
fn test_type_error_location() {
    let err = tree_from(r#"{"data": {"a": {"b": {"count": "abc"}}}}"#).unwrap_err();
    match err {
        FacetError::Type { location, .. } => assert_eq!(location, "data.a.b.count"),
        other => panic!("expected type error, got {:?}", other),
    }
}

#[test]
fn test_request_rejects_malformed_documents() {
    for input in [
        "",
        "[]",
        r#"[{"a": {"count": 1}}]"#,
        r#"{"data" 1}"#,
        r#"{"data": {}} x"#,
        r#"{"data": {"a": {"count": 1}, "a": {"count": 1}}}"#,
    ] {
        let result = serde_json::from_str::<FacetRequest>(input);
        assert!(result.is_err(), "accepted {:?}", input);
    }
}

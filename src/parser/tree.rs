//! Build an explicit facet tree from a parsed request.
//!
//! Every key below `data` becomes a [`FacetNode`]. A facet whose object
//! holds the reserved `count` key is a leaf; any other facet object is
//! expanded recursively. Nodes live in an arena owned by [`FacetTree`], so
//! the parent back-reference is a plain index and no reference cycle exists.

use crate::utils::config::{COUNT_KEY, DATA_KEY};
use crate::utils::error::FacetError;
use log::debug;
use serde_json::{Map, Value};

/// Index of a node inside its [`FacetTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The shape of one facet value, decided once while building the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FacetShape<'a> {
    /// Further nesting: facet name -> facet object
    Interior(&'a Map<String, Value>),
    /// `{"count": <number>}`
    Leaf(f64),
}

impl<'a> FacetShape<'a> {
    /// Classify the value stored under a facet key
    ///
    /// **Public** - the only place leaf detection happens
    ///
    /// # Arguments
    /// * `value` - JSON value mapped to the facet name
    /// * `path` - Dotted path of the facet, used in error messages
    ///
    /// # Errors
    /// * `FacetError::Parse` - Value is not an object, or `count` shares its object with other keys
    /// * `FacetError::Type` - `count` holds something other than a finite number
    pub fn classify(value: &'a Value, path: &str) -> Result<Self, FacetError> {
        let object = value.as_object().ok_or_else(|| {
            FacetError::parse(
                path,
                format!("facet value must be an object, found {}", json_type(value)),
            )
        })?;

        let Some(count) = object.get(COUNT_KEY) else {
            return Ok(Self::Interior(object));
        };

        if object.len() != 1 {
            return Err(FacetError::parse(
                path,
                "`count` must be the only key of a leaf facet",
            ));
        }

        let count_path = format!("{}.{}", path, COUNT_KEY);
        match count.as_f64() {
            Some(n) if n.is_finite() => Ok(Self::Leaf(n)),
            Some(_) => Err(FacetError::type_error(count_path, "count is not a finite number")),
            None => Err(FacetError::type_error(
                count_path,
                format!("count must be a number, found {}", json_type(count)),
            )),
        }
    }
}

/// One named facet
#[derive(Debug, Clone, PartialEq)]
pub struct FacetNode {
    /// Facet name; empty only for the synthetic root
    pub name: String,

    /// Leaf count (zero for interior nodes)
    pub count: f64,

    /// Owned children, in document order
    pub children: Vec<NodeId>,

    /// Parent index, `None` for the root. Never used by aggregation.
    pub parent: Option<NodeId>,
}

impl FacetNode {
    fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            count: 0.0,
            children: Vec::new(),
            parent,
        }
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena of facet nodes rooted at an unnamed node
#[derive(Debug, Clone, PartialEq)]
pub struct FacetTree {
    nodes: Vec<FacetNode>,
}

impl Default for FacetTree {
    fn default() -> Self {
        Self {
            nodes: vec![FacetNode::new("", None)],
        }
    }
}

impl FacetTree {
    /// Build a tree from the object stored under `data`
    ///
    /// **Public** - main entry point of the tree builder
    ///
    /// # Arguments
    /// * `data` - The `data` object of a request
    ///
    /// # Returns
    /// Tree whose root has one child per top-level facet
    ///
    /// # Errors
    /// * `FacetError::Parse` - Structural deviation from the facet schema
    /// * `FacetError::Type` - Non-numeric or non-finite `count`
    pub fn from_map(data: &Map<String, Value>) -> Result<Self, FacetError> {
        if data.contains_key(COUNT_KEY) {
            return Err(FacetError::parse(
                DATA_KEY,
                "reserved key `count` cannot name a top-level facet",
            ));
        }

        let mut tree = Self::default();
        let root = tree.root();
        tree.expand(root, data, DATA_KEY)?;

        debug!("Built facet tree with {} nodes", tree.nodes.len() - 1);

        Ok(tree)
    }

    /// Attach one child per entry of `object` under `parent`
    fn expand(
        &mut self,
        parent: NodeId,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<(), FacetError> {
        self.nodes[parent.0].children.reserve(object.len());

        for (name, value) in object {
            let child_path = format!("{}.{}", path, name);
            if name.is_empty() {
                return Err(FacetError::parse(child_path, "facet name cannot be empty"));
            }

            let shape = FacetShape::classify(value, &child_path)?;
            let child = self.push(FacetNode::new(name.as_str(), Some(parent)));

            match shape {
                FacetShape::Leaf(count) => self.nodes[child.0].count = count,
                FacetShape::Interior(inner) => self.expand(child, inner, &child_path)?,
            }
        }

        Ok(())
    }

    fn push(&mut self, node: FacetNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &FacetNode {
        &self.nodes[id.0]
    }

    /// Child ids of `id`
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    /// Number of facets, root excluded
    pub fn facet_count(&self) -> usize {
        self.nodes.len() - 1
    }

}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_classify_leaf() {
        let value = json!({"count": 20});
        assert_eq!(FacetShape::classify(&value, "data.f").unwrap(), FacetShape::Leaf(20.0));
    }

    #[test]
    fn test_classify_interior() {
        let value = json!({"inner": {"count": 1}});
        assert!(matches!(
            FacetShape::classify(&value, "data.f").unwrap(),
            FacetShape::Interior(_)
        ));
    }

    #[test]
    fn test_classify_string_count() {
        let value = json!({"count": "abc"});
        let err = FacetShape::classify(&value, "data.f").unwrap_err();
        match err {
            FacetError::Type { location, .. } => assert_eq!(location, "data.f.count"),
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_non_object() {
        let value = json!(5);
        assert!(matches!(
            FacetShape::classify(&value, "data.f"),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_classify_count_with_siblings() {
        let value = json!({"count": 1, "other": {"count": 2}});
        assert!(matches!(
            FacetShape::classify(&value, "data.f"),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_build_tree() {
        let tree = FacetTree::from_map(&data(json!({
            "facet1": {"facet3": {"count": 5}},
            "facet2": {"count": 0}
        })))
        .unwrap();

        assert_eq!(tree.facet_count(), 3);
        assert_eq!(tree.node(tree.root()).children.len(), 2);

        let facet1 = tree.children(tree.root()).next().unwrap();
        let facet3 = tree.children(facet1).next().unwrap();
        assert_eq!(tree.node(facet3).name, "facet3");
        assert_eq!(tree.node(facet3).count, 5.0);
        assert!(tree.node(facet3).is_leaf());
        assert_eq!(tree.node(facet3).parent, Some(facet1));
    }

    #[test]
    fn test_children_keep_document_order() {
        let request: crate::parser::FacetRequest = serde_json::from_str(
            r#"{"data": {"zeta": {"count": 1}, "alpha": {"count": 2}, "mid": {}}}"#,
        )
        .unwrap();
        let tree = FacetTree::from_map(&request.data).unwrap();

        let names: Vec<&str> = tree
            .children(tree.root())
            .map(|id| tree.node(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_object_is_childless_node() {
        let tree = FacetTree::from_map(&data(json!({"empty": {}}))).unwrap();
        let empty = tree.children(tree.root()).next().unwrap();
        assert!(tree.node(empty).is_leaf());
        assert_eq!(tree.node(empty).count, 0.0);
    }

    #[test]
    fn test_empty_data() {
        let tree = FacetTree::from_map(&Map::new()).unwrap();
        assert_eq!(tree.facet_count(), 0);
        assert!(tree.node(tree.root()).is_root());
    }

    #[test]
    fn test_count_at_top_level_rejected() {
        let result = FacetTree::from_map(&data(json!({"count": 5})));
        assert!(matches!(result, Err(FacetError::Parse { .. })));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = FacetTree::from_map(&data(json!({"a": {"": {"count": 1}}})));
        match result {
            Err(FacetError::Parse { location, .. }) => assert_eq!(location, "data.a."),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_error_path() {
        let result = FacetTree::from_map(&data(json!({
            "facet1": {"facet3": {"count": true}}
        })));
        match result {
            Err(FacetError::Type { location, .. }) => {
                assert_eq!(location, "data.facet1.facet3.count")
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }
}

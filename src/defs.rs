use indexmap::IndexMap;

use crate::decode::node::AstNode;
use crate::value::Value;

/// Named-value substitution source consulted before validation. The core
/// consumes this capability but does not own the collection behind it.
pub trait Definitions {
    fn get_var(&self, name: &str) -> Option<&AstNode>;
}

/// Replace a string-valued leaf whose text names a definition with the
/// stored node. Anything else passes through untouched.
pub(crate) fn resolve_node<'a>(
    node: &'a AstNode,
    defs: Option<&'a dyn Definitions>,
) -> &'a AstNode {
    if let (Some(defs), AstNode::Leaf(token)) = (defs, node) {
        if let Value::String(name) = &token.value {
            if let Some(found) = defs.get_var(name) {
                return found;
            }
        }
    }
    node
}

/// In-memory `Definitions` backed by an ordered map. Handy for tests and for
/// callers that assemble definitions programmatically.
#[derive(Debug, Clone, Default)]
pub struct MapDefinitions {
    entries: IndexMap<String, AstNode>,
}

impl MapDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), AstNode::from_value(value));
    }

    pub fn define_node(&mut self, name: impl Into<String>, node: AstNode) {
        self.entries.insert(name.into(), node);
    }
}

impl Definitions for MapDefinitions {
    fn get_var(&self, name: &str) -> Option<&AstNode> {
        self.entries.get(name)
    }
}

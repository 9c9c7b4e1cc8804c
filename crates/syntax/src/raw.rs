// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The untyped node model, exactly as a php-ast dump serialises it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub kind: String,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub lineno: u32,
    #[serde(default)]
    pub children: RawChildren,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        rename = "docComment",
        skip_serializing_if = "Option::is_none"
    )]
    pub doc_comment: Option<String>,
}

/// Children are keyed by slot name for most kinds, and positional for list kinds (and for dumps
/// produced by positional encodings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChildren {
    Named(IndexMap<String, RawChild>),
    List(Vec<RawChild>),
}

impl Default for RawChildren {
    fn default() -> Self {
        Self::List(vec![])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChild {
    Node(Box<RawNode>),
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
    /// Anything a well formed tree never contains: arrays, objects without a kind.
    Unexpected(serde_json::Value),
}

impl RawChild {
    /// Short description of the value for error reporting.
    pub fn describe(&self) -> String {
        match self {
            Self::Node(node) => format!("node {}", node.kind),
            Self::Bool(b) => format!("bool {b}"),
            Self::Int(i) => format!("int {i}"),
            Self::Float(f) => format!("float {f}"),
            Self::Str(s) => format!("string {s:?}"),
            Self::Null => "null".to_string(),
            Self::Unexpected(v) => format!("malformed value {v}"),
        }
    }
}

impl Display for RawChild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl From<RawNode> for RawChild {
    fn from(node: RawNode) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<i64> for RawChild {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for RawChild {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for RawChild {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for RawChild {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl<T: Into<RawChild>> From<Option<T>> for RawChild {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl RawNode {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            flags: 0,
            lineno: 0,
            children: RawChildren::default(),
            name: None,
            doc_comment: None,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Add a named child, switching to keyed children if this node had none.
    pub fn child(mut self, slot: &str, value: impl Into<RawChild>) -> Self {
        let value = value.into();
        match &mut self.children {
            RawChildren::Named(map) => {
                map.insert(slot.to_string(), value);
            }
            RawChildren::List(items) if items.is_empty() => {
                let mut map = IndexMap::new();
                map.insert(slot.to_string(), value);
                self.children = RawChildren::Named(map);
            }
            RawChildren::List(items) => items.push(value),
        }
        self
    }

    /// Append a positional child.
    pub fn push(mut self, value: impl Into<RawChild>) -> Self {
        let value = value.into();
        match &mut self.children {
            RawChildren::List(items) => items.push(value),
            RawChildren::Named(map) => {
                let key = map.len().to_string();
                map.insert(key, value);
            }
        }
        self
    }

    /// Look up a slot by name for keyed children, or by position for positional ones.
    pub fn slot(&self, index: usize, name: &str) -> Option<&RawChild> {
        match &self.children {
            RawChildren::Named(map) => map.get(name),
            RawChildren::List(items) => items.get(index),
        }
    }

    /// All children in order, whatever their encoding.
    pub fn items(&self) -> Vec<&RawChild> {
        match &self.children {
            RawChildren::Named(map) => map.values().collect(),
            RawChildren::List(items) => items.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.children {
            RawChildren::Named(map) => map.len(),
            RawChildren::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_named_children() {
        let node: RawNode = serde_json::from_str(
            r#"{"kind": "AST_BINARY_OP", "flags": 1, "lineno": 3,
                "children": {"left": 2, "right": {"kind": "AST_VAR", "children": {"name": "x"}}}}"#,
        )
        .unwrap();
        assert_eq!(node.kind, "AST_BINARY_OP");
        assert_eq!(node.flags, 1);
        assert_eq!(node.slot(0, "left"), Some(&RawChild::Int(2)));
        let Some(RawChild::Node(right)) = node.slot(1, "right") else {
            panic!("expected a node in `right`");
        };
        assert_eq!(right.slot(0, "name"), Some(&RawChild::Str("x".to_string())));
    }

    #[test]
    fn deserializes_positional_children_and_scalars() {
        let node: RawNode = serde_json::from_str(
            r#"{"kind": "AST_ARRAY", "children": [null, 1.5, true, "s", [1, 2], {"nokind": 1}]}"#,
        )
        .unwrap();
        assert_eq!(node.flags, 0);
        let items = node.items();
        assert_eq!(items[0], &RawChild::Null);
        assert_eq!(items[1], &RawChild::Float(1.5));
        assert_eq!(items[2], &RawChild::Bool(true));
        assert_eq!(items[3], &RawChild::Str("s".to_string()));
        assert!(matches!(items[4], RawChild::Unexpected(_)));
        assert!(matches!(items[5], RawChild::Unexpected(_)));
    }

    #[test]
    fn side_attributes() {
        let node: RawNode = serde_json::from_str(
            r#"{"kind": "AST_FUNC_DECL", "name": "f", "docComment": "/** f */", "children": {}}"#,
        )
        .unwrap();
        assert_eq!(node.name.as_deref(), Some("f"));
        assert_eq!(node.doc_comment.as_deref(), Some("/** f */"));
    }

    #[test]
    fn builder_switches_to_named_children() {
        let node = RawNode::new("AST_VAR").child("name", "x");
        assert_eq!(node.slot(5, "name"), Some(&RawChild::Str("x".to_string())));
        assert!(matches!(node.children, RawChildren::Named(_)));
    }
}

//! Rich-text document tree
//!
//! A body is an ordered array of block nodes. Text blocks (`_type: "block"`)
//! hold spans plus the annotation definitions their marks point at; any
//! other `_type` is an object node (an inline image, or something authored
//! against a newer schema) that the renderer dispatches by type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::nullable_vec;

/// Discriminant of text blocks
pub const BLOCK_TYPE: &str = "block";

/// Discriminant of text spans inside a block
pub const SPAN_TYPE: &str = "span";

/// A classified top-level or inline node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A text block, possibly a list item
    Text(TextBlock),
    /// Any non-text node, keyed by its `_type`
    Object {
        node_type: String,
        key: Option<String>,
        value: Value,
    },
    /// Missing required structure; the renderer omits these
    Malformed { key: Option<String>, reason: String },
}

impl Node {
    /// Classify a raw value without failing
    pub fn classify(value: &Value) -> Node {
        let Some(obj) = value.as_object() else {
            return Node::Malformed {
                key: None,
                reason: "node is not an object".to_string(),
            };
        };
        let key = obj.get("_key").and_then(Value::as_str).map(str::to_string);

        let Some(node_type) = obj.get("_type").and_then(Value::as_str) else {
            return Node::Malformed {
                key,
                reason: "node has no _type".to_string(),
            };
        };

        if node_type != BLOCK_TYPE {
            return Node::Object {
                node_type: node_type.to_string(),
                key,
                value: value.clone(),
            };
        }

        if !obj.get("children").map(Value::is_array).unwrap_or(false) {
            return Node::Malformed {
                key,
                reason: "text block has no children array".to_string(),
            };
        }

        match serde_json::from_value::<TextBlock>(value.clone()) {
            Ok(block) => Node::Text(block),
            Err(e) => Node::Malformed {
                key,
                reason: e.to_string(),
            },
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Text(block) => block.key.as_deref(),
            Node::Object { key, .. } | Node::Malformed { key, .. } => key.as_deref(),
        }
    }
}

/// A paragraph, heading, quote or list item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub style: Option<String>,
    /// Raw children; spans are decoded on demand so inline objects survive
    pub children: Vec<Value>,
    #[serde(rename = "markDefs", deserialize_with = "nullable_vec")]
    pub mark_defs: Vec<MarkDef>,
    #[serde(rename = "listItem")]
    pub list_item: Option<String>,
    pub level: Option<u32>,
}

impl TextBlock {
    /// Style discriminant, `normal` when unset
    pub fn style(&self) -> &str {
        self.style
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("normal")
    }

    /// List nesting depth, 1 for top-level items
    pub fn list_level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }

    pub fn is_list_item(&self) -> bool {
        self.list_item.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Look up the annotation a mark key points at
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs
            .iter()
            .find(|def| def.key.as_deref() == Some(key))
    }

    /// Concatenated span text
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| Span::from_value(child))
            .filter_map(|span| span.text)
            .collect()
    }
}

/// A run of text with zero or more marks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(rename = "_type")]
    pub node_type: Option<String>,
    pub text: Option<String>,
    /// Decorator names (`strong`) or keys into the block's `markDefs`
    #[serde(deserialize_with = "nullable_vec")]
    pub marks: Vec<String>,
}

impl Span {
    /// Decode a child as a span; `None` for inline objects and garbage
    pub fn from_value(value: &Value) -> Option<Span> {
        let node_type = value.get("_type").and_then(Value::as_str);
        if !matches!(node_type, None | Some(SPAN_TYPE)) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// An annotation definition, e.g. `{_key, _type: "link", href}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(rename = "_type")]
    pub mark_type: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl MarkDef {
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

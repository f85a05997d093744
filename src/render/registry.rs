//! Handler registry
//!
//! Five open maps keyed by discriminant. Adding a style, mark or node type
//! means registering a handler; nothing in the traversal changes. A handler
//! returning `None` omits its node (for marks: drops the decoration and
//! keeps the text).

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::assets::AssetResolver;
use crate::schema::{MarkDef, TextBlock};

/// Input of a block style handler
pub struct BlockContext<'a> {
    pub block: &'a TextBlock,
    pub style: &'a str,
    /// Rendered inline content
    pub children: &'a str,
}

/// Input of a list container handler
pub struct ListContext<'a> {
    pub list_type: &'a str,
    pub level: u32,
    /// Rendered items
    pub items: &'a str,
}

/// Input of a list item handler
pub struct ListItemContext<'a> {
    pub block: &'a TextBlock,
    pub list_type: &'a str,
    pub level: u32,
    /// The item's own content, already styled
    pub content: &'a str,
    /// Lists nested under this item
    pub nested: &'a str,
}

/// Input of a mark handler
pub struct MarkContext<'a> {
    /// Decorator name or annotation type
    pub mark_type: &'a str,
    /// Annotation definition; `None` for decorators
    pub def: Option<&'a MarkDef>,
    /// Unmarked text of the span
    pub text: &'a str,
    /// Rendered inner content
    pub children: &'a str,
}

/// Input of a node type handler
pub struct TypeContext<'a> {
    pub node_type: &'a str,
    pub value: &'a Value,
    pub resolver: &'a dyn AssetResolver,
    /// Whether the node sits inside a text block
    pub inline: bool,
}

pub type BlockHandler = Arc<dyn Fn(&BlockContext<'_>) -> Option<String> + Send + Sync>;
pub type ListHandler = Arc<dyn Fn(&ListContext<'_>) -> Option<String> + Send + Sync>;
pub type ListItemHandler = Arc<dyn Fn(&ListItemContext<'_>) -> Option<String> + Send + Sync>;
pub type MarkHandler = Arc<dyn Fn(&MarkContext<'_>) -> Option<String> + Send + Sync>;
pub type TypeHandler = Arc<dyn Fn(&TypeContext<'_>) -> Option<String> + Send + Sync>;

/// Handlers by discriminant
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    pub(crate) block_styles: HashMap<String, BlockHandler>,
    pub(crate) list_styles: HashMap<String, ListHandler>,
    pub(crate) list_items: HashMap<String, ListItemHandler>,
    pub(crate) marks: HashMap<String, MarkHandler>,
    pub(crate) types: HashMap<String, TypeHandler>,
}

impl HandlerRegistry {
    /// A registry with nothing registered
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in handlers
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        super::builtin::register(&mut registry);
        registry
    }

    pub fn insert_block_style<F>(&mut self, style: &str, handler: F)
    where
        F: Fn(&BlockContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.block_styles.insert(style.to_string(), Arc::new(handler));
    }

    pub fn insert_list_style<F>(&mut self, list_type: &str, handler: F)
    where
        F: Fn(&ListContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.list_styles.insert(list_type.to_string(), Arc::new(handler));
    }

    pub fn insert_list_item<F>(&mut self, list_type: &str, handler: F)
    where
        F: Fn(&ListItemContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.list_items.insert(list_type.to_string(), Arc::new(handler));
    }

    pub fn insert_mark<F>(&mut self, mark_type: &str, handler: F)
    where
        F: Fn(&MarkContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.marks.insert(mark_type.to_string(), Arc::new(handler));
    }

    pub fn insert_type<F>(&mut self, node_type: &str, handler: F)
    where
        F: Fn(&TypeContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.types.insert(node_type.to_string(), Arc::new(handler));
    }

    pub fn block_style(&self, style: &str) -> Option<&BlockHandler> {
        self.block_styles.get(style)
    }

    pub fn list_style(&self, list_type: &str) -> Option<&ListHandler> {
        self.list_styles.get(list_type)
    }

    /// Item handler for a list type, falling back to the `default` entry
    pub fn list_item(&self, list_type: &str) -> Option<&ListItemHandler> {
        self.list_items
            .get(list_type)
            .or_else(|| self.list_items.get("default"))
    }

    pub fn mark(&self, mark_type: &str) -> Option<&MarkHandler> {
        self.marks.get(mark_type)
    }

    pub fn node_type(&self, node_type: &str) -> Option<&TypeHandler> {
        self.types.get(node_type)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            keys
        }
        f.debug_struct("HandlerRegistry")
            .field("block_styles", &keys(&self.block_styles))
            .field("list_styles", &keys(&self.list_styles))
            .field("list_items", &keys(&self.list_items))
            .field("marks", &keys(&self.marks))
            .field("types", &keys(&self.types))
            .finish()
    }
}

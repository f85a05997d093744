//! Rich-text rendering
//!
//! Turns a block array into ordered HTML fragments by dispatching every node
//! on its discriminant through a [`HandlerRegistry`]. Rendering never fails:
//! malformed nodes and unknown discriminants are omitted and logged at debug
//! level, and everything else still renders.

mod builtin;
mod registry;

pub use builtin::{safe_href, IMAGE_ALT_FALLBACK};
pub use registry::{
    BlockContext, BlockHandler, HandlerRegistry, ListContext, ListHandler, ListItemContext,
    ListItemHandler, MarkContext, MarkHandler, TypeContext, TypeHandler,
};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::assets::{AssetResolver, CdnAssetResolver};
use crate::helpers::escape_text;
use crate::schema::{Node, Span, TextBlock};

/// Rendered output of one top-level block, or of one run of list items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// `_key` of the first source block, or `block-{index}`
    pub key: String,
    /// Position of the first source block
    pub index: usize,
    pub html: String,
}

/// Rich-text renderer
///
/// Holds no mutable state, so one instance can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Renderer {
    registry: HandlerRegistry,
    resolver: Arc<dyn AssetResolver>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Renderer {
    /// Start from the built-in handlers
    pub fn builder() -> RendererBuilder {
        RendererBuilder {
            registry: HandlerRegistry::with_builtins(),
            resolver: None,
        }
    }

    pub fn new(registry: HandlerRegistry, resolver: Arc<dyn AssetResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Render a block array into fragments, preserving block order
    pub fn render(&self, blocks: &[Value]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut list_run: Vec<ListEntry> = Vec::new();

        for (index, value) in blocks.iter().enumerate() {
            let node = Node::classify(value);

            if let Node::Text(block) = &node {
                if block.is_list_item() {
                    list_run.push(self.list_entry(block, index));
                    continue;
                }
            }
            self.flush_list(&mut list_run, &mut fragments);

            let html = match &node {
                Node::Text(block) => self.render_block(block),
                Node::Object {
                    node_type, value, ..
                } => self.render_object(node_type, value, false),
                Node::Malformed { reason, .. } => {
                    debug!("Omitting malformed block {}: {}", index, reason);
                    None
                }
            };
            if let Some(html) = html {
                fragments.push(Fragment {
                    key: fragment_key(node.key(), index),
                    index,
                    html,
                });
            }
        }
        self.flush_list(&mut list_run, &mut fragments);
        fragments
    }

    /// Render straight to one HTML string
    pub fn render_html(&self, blocks: &[Value]) -> String {
        self.render(blocks)
            .into_iter()
            .map(|fragment| fragment.html)
            .collect()
    }

    fn render_block(&self, block: &TextBlock) -> Option<String> {
        let style = block.style();
        let Some(handler) = self.registry.block_style(style) else {
            debug!("Omitting block with unknown style {:?}", style);
            return None;
        };
        let children = self.render_children(block);
        handler(&BlockContext {
            block,
            style,
            children: &children,
        })
    }

    fn render_object(&self, node_type: &str, value: &Value, inline: bool) -> Option<String> {
        let Some(handler) = self.registry.node_type(node_type) else {
            debug!("Omitting node of unknown type {:?}", node_type);
            return None;
        };
        handler(&TypeContext {
            node_type,
            value,
            resolver: self.resolver.as_ref(),
            inline,
        })
    }

    /// Spans and inline objects of a text block
    fn render_children(&self, block: &TextBlock) -> String {
        let mut html = String::new();
        for child in &block.children {
            if let Some(span) = Span::from_value(child) {
                html.push_str(&self.render_span(block, &span));
                continue;
            }
            match child.get("_type").and_then(Value::as_str) {
                Some(node_type) => {
                    if let Some(rendered) = self.render_object(node_type, child, true) {
                        html.push_str(&rendered);
                    }
                }
                None => debug!("Omitting malformed inline node"),
            }
        }
        html
    }

    /// The first mark is the outermost wrapper; repeated marks count once
    fn render_span(&self, block: &TextBlock, span: &Span) -> String {
        let text = span.text.as_deref().unwrap_or_default();
        let mut marks: Vec<&str> = Vec::with_capacity(span.marks.len());
        for mark in &span.marks {
            if !marks.contains(&mark.as_str()) {
                marks.push(mark);
            }
        }

        let mut html = escape_text(text);
        for mark in marks.into_iter().rev() {
            // A mark is either a decorator name or a key into markDefs
            let (mark_type, def) = match block.mark_def(mark) {
                Some(def) => (def.mark_type.as_deref().unwrap_or_default(), Some(def)),
                None => (mark, None),
            };
            let Some(handler) = self.registry.mark(mark_type) else {
                debug!("Dropping unknown mark {:?}", mark);
                continue;
            };
            if let Some(wrapped) = handler(&MarkContext {
                mark_type,
                def,
                text,
                children: &html,
            }) {
                html = wrapped;
            }
        }
        html
    }

    /// Item content: a `normal` item renders inline, other styles go
    /// through their block handler
    fn list_entry(&self, block: &TextBlock, index: usize) -> ListEntry {
        let content = if block.style() == "normal" {
            Some(self.render_children(block))
        } else {
            self.render_block(block)
        };
        ListEntry {
            block: block.clone(),
            list_type: block.list_item.clone().unwrap_or_default(),
            level: block.list_level(),
            index,
            content,
        }
    }

    fn flush_list(&self, run: &mut Vec<ListEntry>, fragments: &mut Vec<Fragment>) {
        let Some(first) = run.first() else {
            return;
        };
        let key = fragment_key(first.block.key.as_deref(), first.index);
        let index = first.index;
        let html = self.render_list_run(run);
        run.clear();
        if !html.is_empty() {
            fragments.push(Fragment { key, index, html });
        }
    }

    /// Group consecutive items into containers nested by level. A change of
    /// list type at the same level starts a new container.
    fn render_list_run(&self, entries: &[ListEntry]) -> String {
        let Some(base) = entries.iter().map(|e| e.level).min() else {
            return String::new();
        };

        let mut html = String::new();
        let mut open: Option<OpenList> = None;
        let mut i = 0;
        while i < entries.len() {
            let entry = &entries[i];
            if entry.level > base {
                let end = i + entries[i..].iter().take_while(|e| e.level > base).count();
                let nested = self.render_list_run(&entries[i..end]);
                match open.as_mut().and_then(|list| list.items.last_mut()) {
                    Some(item) => item.nested.push_str(&nested),
                    None => html.push_str(&nested),
                }
                i = end;
                continue;
            }

            if open
                .as_ref()
                .map(|list| list.list_type != entry.list_type)
                .unwrap_or(false)
            {
                if let Some(list) = open.take() {
                    html.push_str(&self.close_list(list, base));
                }
            }
            open.get_or_insert_with(|| OpenList {
                list_type: entry.list_type.clone(),
                items: Vec::new(),
            })
            .items
            .push(OpenItem {
                entry,
                nested: String::new(),
            });
            i += 1;
        }
        if let Some(list) = open.take() {
            html.push_str(&self.close_list(list, base));
        }
        html
    }

    fn close_list(&self, list: OpenList<'_>, level: u32) -> String {
        let Some(container) = self.registry.list_style(&list.list_type) else {
            debug!("Omitting list with unknown style {:?}", list.list_type);
            return String::new();
        };
        let Some(item_handler) = self.registry.list_item(&list.list_type) else {
            debug!("No item handler for list style {:?}", list.list_type);
            return String::new();
        };

        let mut items = String::new();
        for item in &list.items {
            let Some(content) = item.entry.content.as_deref() else {
                // Unrenderable content; keep anything nested under it
                items.push_str(&item.nested);
                continue;
            };
            if let Some(html) = item_handler(&ListItemContext {
                block: &item.entry.block,
                list_type: &list.list_type,
                level,
                content,
                nested: &item.nested,
            }) {
                items.push_str(&html);
            }
        }
        if items.is_empty() {
            return String::new();
        }
        container(&ListContext {
            list_type: &list.list_type,
            level,
            items: &items,
        })
        .unwrap_or_default()
    }
}

/// Builder adding or overriding handlers on top of the built-ins
pub struct RendererBuilder {
    registry: HandlerRegistry,
    resolver: Option<Arc<dyn AssetResolver>>,
}

impl RendererBuilder {
    /// Start from a custom registry instead of the built-ins
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn block_style<F>(mut self, style: &str, handler: F) -> Self
    where
        F: Fn(&BlockContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.insert_block_style(style, handler);
        self
    }

    pub fn list_style<F>(mut self, list_type: &str, handler: F) -> Self
    where
        F: Fn(&ListContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.insert_list_style(list_type, handler);
        self
    }

    pub fn list_item<F>(mut self, list_type: &str, handler: F) -> Self
    where
        F: Fn(&ListItemContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.insert_list_item(list_type, handler);
        self
    }

    pub fn mark<F>(mut self, mark_type: &str, handler: F) -> Self
    where
        F: Fn(&MarkContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.insert_mark(mark_type, handler);
        self
    }

    pub fn block_type<F>(mut self, node_type: &str, handler: F) -> Self
    where
        F: Fn(&TypeContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.insert_type(node_type, handler);
        self
    }

    /// Without a resolver, images resolve against a CDN with no project and
    /// only render when their asset carries an expanded URL
    pub fn build(self) -> Renderer {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(CdnAssetResolver::new("https://cdn.sanity.io", "", "")));
        Renderer::new(self.registry, resolver)
    }
}

/// Plain text of a block array, one line per text block
pub fn to_plain_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|value| match Node::classify(value) {
            Node::Text(block) => Some(block.plain_text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct ListEntry {
    block: TextBlock,
    list_type: String,
    level: u32,
    index: usize,
    /// `None` when the item's style has no handler
    content: Option<String>,
}

struct OpenList<'a> {
    list_type: String,
    items: Vec<OpenItem<'a>>,
}

struct OpenItem<'a> {
    entry: &'a ListEntry,
    nested: String,
}

fn fragment_key(key: Option<&str>, index: usize) -> String {
    match key {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => format!("block-{}", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::element;
    use serde_json::json;

    fn text(style: &str, key: &str, spans: Value) -> Value {
        json!({ "_type": "block", "_key": key, "style": style, "children": spans, "markDefs": [] })
    }

    fn span(text: &str, marks: &[&str]) -> Value {
        json!({ "_type": "span", "text": text, "marks": marks })
    }

    fn item(list: &str, level: u32, text: &str) -> Value {
        json!({ "_type": "block", "style": "normal", "listItem": list, "level": level,
                "children": [span(text, &[])] })
    }

    fn resolver() -> Arc<dyn AssetResolver> {
        Arc::new(CdnAssetResolver::new("https://cdn.sanity.io", "proj", "production"))
    }

    #[test]
    fn test_styles_and_order() {
        let blocks = vec![
            text("h2", "a", json!([span("Title", &[])])),
            text("normal", "b", json!([span("Body", &[])])),
            text("blockquote", "c", json!([span("Quote", &[])])),
        ];
        let fragments = Renderer::default().render(&blocks);
        let keys: Vec<_> = fragments.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(fragments[0].html, "<h2>Title</h2>");
        assert_eq!(fragments[1].html, "<p>Body</p>");
        assert_eq!(fragments[2].html, "<blockquote>Quote</blockquote>");
    }

    #[test]
    fn test_marks_nest_first_outermost() {
        let blocks = vec![text("normal", "a", json!([span("x", &["strong", "em"])]))];
        assert_eq!(
            Renderer::default().render_html(&blocks),
            "<p><strong><em>x</em></strong></p>"
        );
    }

    #[test]
    fn test_duplicate_marks_render_once() {
        let twice = vec![text("normal", "a", json!([span("x", &["strong", "strong"])]))];
        let once = vec![text("normal", "a", json!([span("x", &["strong"])]))];
        let renderer = Renderer::default();
        assert_eq!(renderer.render_html(&twice), renderer.render_html(&once));
    }

    #[test]
    fn test_unknown_mark_keeps_text() {
        let blocks = vec![text("normal", "a", json!([span("x", &["sparkle"])]))];
        assert_eq!(Renderer::default().render_html(&blocks), "<p>x</p>");
    }

    #[test]
    fn test_escaping_and_line_breaks() {
        let blocks = vec![text("normal", "a", json!([span("a < b\nc", &[])]))];
        assert_eq!(
            Renderer::default().render_html(&blocks),
            "<p>a &lt; b<br/>c</p>"
        );
    }

    #[test]
    fn test_links() {
        let block = |href: &str| {
            json!({ "_type": "block", "style": "normal",
                    "markDefs": [{ "_key": "l1", "_type": "link", "href": href }],
                    "children": [span("click", &["l1"])] })
        };
        let renderer = Renderer::default();
        assert_eq!(
            renderer.render_html(&[block("https://example.com")]),
            r#"<p><a href="https://example.com" rel="noreferrer noopener">click</a></p>"#
        );
        assert_eq!(
            renderer.render_html(&[block("/about")]),
            r#"<p><a href="/about">click</a></p>"#
        );
        assert_eq!(
            renderer.render_html(&[block("javascript:alert(1)")]),
            "<p>click</p>"
        );
        assert_eq!(renderer.render_html(&[block("")]), "<p>click</p>");
        for href in ["/\\evil.example/x", "/\t/evil.example", "/\n/evil.example"] {
            assert_eq!(renderer.render_html(&[block(href)]), "<p>click</p>");
        }
    }

    #[test]
    fn test_totality_with_garbage() {
        let blocks = vec![
            json!("just a string"),
            json!({ "no": "type" }),
            json!({ "_type": "block", "style": "normal" }),
            json!({ "_type": "video", "_key": "v" }),
            text("h9", "h", json!([span("nope", &[])])),
            text("normal", "ok", json!([span("fine", &[]), { "_type": "mystery" }, 42])),
        ];
        let fragments = Renderer::default().render(&blocks);
        assert!(fragments.len() <= blocks.len());
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].key, "ok");
        assert_eq!(fragments[0].index, 5);
        assert_eq!(fragments[0].html, "<p>fine</p>");
    }

    #[test]
    fn test_images() {
        let renderer = Renderer::builder().resolver(resolver()).build();
        let blocks = vec![
            json!({ "_type": "image", "_key": "i1",
                    "asset": { "_ref": "image-abc-800x600-jpg" }, "caption": "A <cat>" }),
            json!({ "_type": "image", "_key": "i2", "asset": null }),
            json!({ "_type": "image", "_key": "i3" }),
        ];
        let fragments = renderer.render(&blocks);
        assert_eq!(fragments.len(), 1);
        assert_eq!(
            fragments[0].html,
            r#"<figure><img src="https://cdn.sanity.io/images/proj/production/abc-800x600.jpg" alt="Article content image" width="800" height="600" loading="lazy"/><figcaption>A &lt;cat&gt;</figcaption></figure>"#
        );
    }

    #[test]
    fn test_inline_image_has_no_figure() {
        let renderer = Renderer::builder().resolver(resolver()).build();
        let blocks = vec![text(
            "normal",
            "a",
            json!([
                span("see ", &[]),
                { "_type": "image", "alt": "icon", "caption": "ignored",
                  "asset": { "_ref": "image-abc-16x16-png" } }
            ]),
        )];
        assert_eq!(
            renderer.render_html(&blocks),
            r#"<p>see <img src="https://cdn.sanity.io/images/proj/production/abc-16x16.png" alt="icon" width="16" height="16" loading="lazy"/></p>"#
        );
    }

    #[test]
    fn test_list_grouping_and_nesting() {
        let blocks = vec![
            text("normal", "p", json!([span("intro", &[])])),
            item("bullet", 1, "a"),
            item("bullet", 2, "a.1"),
            item("bullet", 2, "a.2"),
            item("bullet", 1, "b"),
            item("number", 1, "one"),
            text("normal", "q", json!([span("outro", &[])])),
        ];
        let fragments = Renderer::default().render(&blocks);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].index, 1);
        assert_eq!(fragments[1].key, "block-1");
        assert_eq!(
            fragments[1].html,
            "<ul><li>a<ul><li>a.1</li><li>a.2</li></ul></li><li>b</li></ul><ol><li>one</li></ol>"
        );
        assert_eq!(fragments[2].html, "<p>outro</p>");
    }

    #[test]
    fn test_styled_list_item() {
        let blocks = vec![json!({ "_type": "block", "style": "h3", "listItem": "number",
                                  "children": [span("Heading item", &[])] })];
        assert_eq!(
            Renderer::default().render_html(&blocks),
            "<ol><li><h3>Heading item</h3></li></ol>"
        );
    }

    #[test]
    fn test_unknown_list_style_omitted() {
        let blocks = vec![item("checkbox", 1, "todo")];
        assert!(Renderer::default().render(&blocks).is_empty());
    }

    #[test]
    fn test_overrides() {
        let renderer = Renderer::builder()
            .block_style("normal", |ctx| {
                Some(element("p", &[("class", "lead")], ctx.children))
            })
            .mark("highlight", |ctx| Some(element("mark", &[], ctx.children)))
            .block_type("divider", |_| Some("<hr/>".to_string()))
            .build();
        let blocks = vec![
            text("normal", "a", json!([span("x", &["highlight"])])),
            json!({ "_type": "divider" }),
        ];
        assert_eq!(
            renderer.render_html(&blocks),
            r#"<p class="lead"><mark>x</mark></p><hr/>"#
        );
    }

    #[test]
    fn test_empty_registry_renders_nothing() {
        let renderer = Renderer::builder()
            .registry(HandlerRegistry::empty())
            .build();
        let blocks = vec![text("normal", "a", json!([span("x", &[])]))];
        assert!(renderer.render(&blocks).is_empty());
    }

    #[test]
    fn test_plain_text() {
        let blocks = vec![
            text("h2", "a", json!([span("Hello ", &["strong"]), span("world", &[])])),
            json!({ "_type": "image" }),
            text("normal", "b", json!([span("Second", &[])])),
        ];
        assert_eq!(to_plain_text(&blocks), "Hello world\n\nSecond");
    }
}

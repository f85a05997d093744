//! Built-in handlers

use tracing::debug;
use url::Url;

use super::registry::{HandlerRegistry, MarkContext, TypeContext};
use crate::helpers::{element, escape_text, has_unsafe_chars, is_external, is_site_path, void_element};
use crate::schema::ImageRef;

/// Alt text for body images that have none
pub const IMAGE_ALT_FALLBACK: &str = "Article content image";

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

pub(crate) fn register(registry: &mut HandlerRegistry) {
    let styles = [
        ("normal", "p"),
        ("h1", "h1"),
        ("h2", "h2"),
        ("h3", "h3"),
        ("h4", "h4"),
        ("blockquote", "blockquote"),
    ];
    for (style, tag) in styles {
        registry.insert_block_style(style, move |ctx| Some(element(tag, &[], ctx.children)));
    }

    registry.insert_list_style("bullet", |ctx| Some(element("ul", &[], ctx.items)));
    registry.insert_list_style("number", |ctx| Some(element("ol", &[], ctx.items)));
    registry.insert_list_item("default", |ctx| {
        Some(element("li", &[], &format!("{}{}", ctx.content, ctx.nested)))
    });

    let decorators = [
        ("strong", "strong"),
        ("em", "em"),
        ("underline", "u"),
        ("strike-through", "s"),
        ("code", "code"),
    ];
    for (mark, tag) in decorators {
        registry.insert_mark(mark, move |ctx| Some(element(tag, &[], ctx.children)));
    }
    registry.insert_mark("link", link);

    registry.insert_type("image", image);
}

/// `<a href>` for an allowed href; `None` leaves the text unlinked
fn link(ctx: &MarkContext<'_>) -> Option<String> {
    let href = ctx.def.and_then(|def| def.get_str("href"))?;
    let Some(href) = safe_href(href) else {
        debug!("Dropping link with disallowed href {:?}", href);
        return None;
    };
    let rel = if is_external(href) {
        "noreferrer noopener"
    } else {
        ""
    };
    Some(element("a", &[("href", href), ("rel", rel)], ctx.children))
}

/// The trimmed href when it is a root-relative path or uses an allowed scheme
pub fn safe_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() || has_unsafe_chars(href) {
        return None;
    }
    if href.starts_with('/') {
        return is_site_path(href).then_some(href);
    }
    let url = Url::parse(href).ok()?;
    ALLOWED_SCHEMES.contains(&url.scheme()).then_some(href)
}

fn image(ctx: &TypeContext<'_>) -> Option<String> {
    let image: ImageRef = serde_json::from_value(ctx.value.clone()).ok()?;
    let Some(asset) = ctx.resolver.resolve(&image) else {
        debug!("Omitting image without a resolvable asset");
        return None;
    };

    let width = asset.dimensions.map(|d| d.width.to_string()).unwrap_or_default();
    let height = asset.dimensions.map(|d| d.height.to_string()).unwrap_or_default();
    let img = void_element(
        "img",
        &[
            ("src", asset.url.as_str()),
            ("alt", image.alt_text().unwrap_or(IMAGE_ALT_FALLBACK)),
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("loading", "lazy"),
        ],
    );
    // Inline images sit inside a text block, where a figure is not allowed
    if ctx.inline {
        return Some(img);
    }
    let caption = image
        .caption_text()
        .map(|c| element("figcaption", &[], &escape_text(c)))
        .unwrap_or_default();

    Some(element("figure", &[], &format!("{}{}", img, caption)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href("https://example.com"), Some("https://example.com"));
        assert_eq!(safe_href(" mailto:a@b.c "), Some("mailto:a@b.c"));
        assert_eq!(safe_href("tel:+15551234"), Some("tel:+15551234"));
        assert_eq!(safe_href("/about"), Some("/about"));
        assert_eq!(safe_href("javascript:alert(1)"), None);
        assert_eq!(safe_href("JavaScript:alert(1)"), None);
        assert_eq!(safe_href("data:text/html,hi"), None);
        assert_eq!(safe_href("//evil.example"), None);
        assert_eq!(safe_href("/\\evil.example"), None);
        assert_eq!(safe_href("/\t/evil.example"), None);
        assert_eq!(safe_href("/\n/evil.example"), None);
        assert_eq!(safe_href("https://exa\nmple.com"), None);
        assert_eq!(safe_href("/articles/a?page=2"), Some("/articles/a?page=2"));
        assert_eq!(safe_href("relative/path"), None);
        assert_eq!(safe_href(""), None);
    }
}

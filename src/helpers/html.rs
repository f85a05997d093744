//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text content and turn hard line breaks into `<br/>`
pub fn escape_text(s: &str) -> String {
    html_escape(s).replace('\n', "<br/>")
}

/// Wrap inner HTML in an element with optional attributes
///
/// Attribute values are escaped; pairs with empty values are skipped.
///
/// # Examples
/// ```ignore
/// element("a", &[("href", "/x")], "hi") // -> <a href="/x">hi</a>
/// ```
pub fn element(tag: &str, attrs: &[(&str, &str)], inner: &str) -> String {
    format!("<{}{}>{}</{}>", tag, attributes(attrs), inner, tag)
}

/// Render a void element such as `<img>`
pub fn void_element(tag: &str, attrs: &[(&str, &str)]) -> String {
    format!("<{}{}/>", tag, attributes(attrs))
}

fn attributes(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!(r#" {}="{}""#, name, html_escape(value)))
        .collect()
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_text_line_breaks() {
        assert_eq!(escape_text("a\nb<"), "a<br/>b&lt;");
    }

    #[test]
    fn test_element() {
        assert_eq!(element("p", &[], "hi"), "<p>hi</p>");
        assert_eq!(
            element("a", &[("href", "/x?a=1&b=2"), ("rel", "")], "go"),
            r#"<a href="/x?a=1&amp;b=2">go</a>"#
        );
        assert_eq!(
            void_element("img", &[("src", "a.jpg"), ("alt", "\"q\"")]),
            r#"<img src="a.jpg" alt="&quot;q&quot;"/>"#
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }
}

//! Allow-list HTML sanitization.
//!
//! Rendered markdown passes through a conservative allow-list filter
//! before it is cached: permitted tags are the structural and
//! formatting elements markdown produces, permitted attributes are the
//! minimum needed for links, images, and styling hooks, and dangerous
//! URI schemes are rejected outright.
//!
//! The primary pass parses the fragment with `tl` and re-serializes
//! only what the allow-list admits. If parsing fails, a narrower
//! regex-based pass strips `<script>` blocks, inline event handlers,
//! and `javascript:` URLs instead; article source is first-party
//! content, so the weaker net is acceptable there.

use std::sync::LazyLock;

use regex::Regex;

use super::escape_html;

/// Tags admitted by the allow-list.
const ALLOWED_TAGS: [&str; 33] = [
    "p", "br", "strong", "em", "u", "s", "del", "code", "pre", "blockquote", "ul", "ol", "li",
    "h1", "h2", "h3", "h4", "h5", "h6", "a", "img", "hr", "span", "div", "table", "thead",
    "tbody", "tr", "th", "td", "input", "sup", "sub",
];

/// Attributes admitted on any allowed tag.
const ALLOWED_ATTRS: [&str; 9] = [
    "href", "title", "src", "alt", "class", "id", "type", "checked", "disabled",
];

/// Tags whose content is dropped along with the tag itself.
const DROP_CONTENT_TAGS: [&str; 3] = ["script", "style", "iframe"];

/// Elements serialized without a closing tag.
const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

/// URI schemes allowed in `href`/`src` values.
const ALLOWED_SCHEMES: [&str; 5] = ["http", "https", "ftp", "mailto", "tel"];

/// Sanitize an HTML fragment through the allow-list.
pub fn sanitize(html: &str) -> String {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return sanitize_basic(html);
    };

    let parser = dom.parser();
    let mut out = String::with_capacity(html.len());
    for handle in dom.children() {
        write_node(&mut out, *handle, parser);
    }
    out
}

fn write_node(out: &mut String, handle: tl::NodeHandle, parser: &tl::Parser) {
    let Some(node) = handle.get(parser) else {
        return;
    };

    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_lowercase();

            if DROP_CONTENT_TAGS.contains(&name.as_str()) {
                return;
            }

            if !ALLOWED_TAGS.contains(&name.as_str()) {
                // Disallowed wrapper: keep the children, drop the tag
                for child in tag.children().top().iter() {
                    write_node(out, *child, parser);
                }
                return;
            }

            out.push('<');
            out.push_str(&name);
            for (key, value) in tag.attributes().iter() {
                let key_str: &str = key.as_ref();
                let key_lower = key_str.to_lowercase();
                if !ALLOWED_ATTRS.contains(&key_lower.as_str()) {
                    continue;
                }
                let value_str = value.map(|v| v.to_string()).unwrap_or_default();
                if matches!(key_lower.as_str(), "href" | "src") && !is_safe_uri(&value_str) {
                    continue;
                }
                out.push(' ');
                out.push_str(&key_lower);
                out.push_str("=\"");
                out.push_str(&escape_html(&value_str));
                out.push('"');
            }
            out.push('>');

            if VOID_TAGS.contains(&name.as_str()) {
                return;
            }

            for child in tag.children().top().iter() {
                write_node(out, *child, parser);
            }
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
        // Raw text is already entity-encoded in the source fragment
        tl::Node::Raw(bytes) => out.push_str(&bytes.as_utf8_str()),
        tl::Node::Comment(_) => {}
    }
}

/// Reject URIs with a scheme outside the allow-list.
///
/// Relative paths and fragments carry no scheme and pass; anything
/// with a scheme (including whitespace-obfuscated `javascript:`) must
/// match the allowed set.
fn is_safe_uri(uri: &str) -> bool {
    let cleaned: String = uri
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let Some(colon) = cleaned.find(':') else {
        return true;
    };
    let scheme = cleaned[..colon].to_lowercase();
    // `:` appearing after a path/query separator is not a scheme
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    ALLOWED_SCHEMES.contains(&scheme.as_str())
}

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());
static EVENT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+on\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap());
static JS_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(href|src)\s*=\s*["']\s*javascript:[^"']*["']"#).unwrap()
});

/// Regex fallback: strip script blocks, event handler attributes, and
/// `javascript:` URLs. Weaker than the allow-list pass by design.
pub fn sanitize_basic(html: &str) -> String {
    let html = SCRIPT_RE.replace_all(html, "");
    let html = EVENT_ATTR_RE.replace_all(&html, "");
    JS_URI_RE.replace_all(&html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_basic_markup() {
        let html = "<p>Hello <strong>world</strong></p>";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_drops_script_with_content() {
        let out = sanitize("<p>ok</p><script>alert(1)</script>");
        assert_eq!(out, "<p>ok</p>");
    }

    #[test]
    fn test_unwraps_unknown_tags() {
        let out = sanitize("<article><p>text</p></article>");
        assert_eq!(out, "<p>text</p>");
    }

    #[test]
    fn test_strips_event_handlers() {
        let out = sanitize(r#"<a href="/a" onclick="evil()">x</a>"#);
        assert!(out.contains(r#"href="/a""#));
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn test_rejects_javascript_uri() {
        let out = sanitize(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!out.contains("javascript"));
        assert!(out.contains("<a>x</a>"));
    }

    #[test]
    fn test_rejects_obfuscated_javascript_uri() {
        let out = sanitize("<a href=\"java\nscript:alert(1)\">x</a>");
        assert!(!out.to_lowercase().contains("script:"));
    }

    #[test]
    fn test_allows_common_uris() {
        assert!(is_safe_uri("https://example.com"));
        assert!(is_safe_uri("mailto:a@b.c"));
        assert!(is_safe_uri("/relative/path"));
        assert!(is_safe_uri("#fragment"));
        assert!(is_safe_uri("page?q=a:b"));
        assert!(!is_safe_uri("javascript:alert(1)"));
        assert!(!is_safe_uri("data:text/html,x"));
        assert!(!is_safe_uri("vbscript:x"));
    }

    #[test]
    fn test_keeps_img_attributes() {
        let out = sanitize(r#"<img src="/a.png" alt="alt text" data-x="1">"#);
        assert!(out.contains(r#"src="/a.png""#));
        assert!(out.contains(r#"alt="alt text""#));
        assert!(!out.contains("data-x"));
    }

    #[test]
    fn test_code_block_spans_survive() {
        let html = r#"<pre><code class="language-rust"><span class="source rust">let</span></code></pre>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_sanitize_basic_strips_script_and_handlers() {
        let out = sanitize_basic(
            r#"<p onclick="x()">a</p><script>bad()</script><a href="javascript:y()">l</a>"#,
        );
        assert!(!out.contains("script"));
        assert!(!out.contains("onclick"));
        assert!(out.contains("<p>a</p>"));
    }

    #[test]
    fn test_sanitize_basic_is_case_insensitive() {
        let out = sanitize_basic(
            "<p ONCLICK='x()'>a</p><SCRIPT type=\"text/javascript\">bad()</SCRIPT >",
        );
        assert!(!out.to_lowercase().contains("script"));
        assert!(!out.to_lowercase().contains("onclick"));
        assert!(out.contains(">a</p>"));
    }
}

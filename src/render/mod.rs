//! Markdown to HTML rendering pipeline.
//!
//! Body markdown goes through three stages: markdown conversion with
//! fenced code blocks routed to the highlighter, then allow-list
//! sanitization of the resulting fragment. The output is safe to
//! serve as-is.

pub mod highlight;
pub mod markdown;
pub mod sanitize;

pub use markdown::MarkdownRenderer;

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

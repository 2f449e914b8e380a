//! Markdown conversion.
//!
//! Built on pulldown-cmark with the extensions the article corpus
//! actually uses (tables, footnotes, strikethrough, task lists, smart
//! punctuation). Fenced code blocks are intercepted from the event
//! stream and replaced with highlighter output so the emitted HTML is
//! class-styled rather than inline-styled. Bare `http(s)://` URLs in
//! running text are auto-linked in the same pass; code spans, existing
//! links, and image alt text are left alone.

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd, html};

use super::highlight::Highlighter;
use super::sanitize::sanitize;

pub struct MarkdownRenderer {
    highlighter: Highlighter,
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        Self {
            highlighter: Highlighter::new(),
            options,
        }
    }

    /// Render article body markdown to sanitized HTML.
    pub fn render(&self, markdown: &str) -> String {
        sanitize(&self.convert(markdown))
    }

    /// Render to HTML without code highlighting spans.
    ///
    /// Used where the consumer strips markup anyway and the span
    /// tree would be wasted work.
    pub fn render_plain(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, parser);
        sanitize(&out)
    }

    fn convert(&self, markdown: &str) -> String {
        let mut events = Vec::new();
        let mut code_buf = String::new();
        let mut code_lang: Option<String> = None;
        let mut in_code = false;
        let mut in_link = false;
        let mut in_image = false;

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code = true;
                    code_buf.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            // Only the first word of the info string names the language
                            lang.split_whitespace().next().map(str::to_string)
                        }
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code = false;
                    let highlighted = self
                        .highlighter
                        .highlight(&code_buf, code_lang.as_deref());
                    events.push(Event::Html(highlighted.into()));
                }
                Event::Text(text) if in_code => code_buf.push_str(&text),
                Event::Start(tag @ Tag::Link { .. }) => {
                    in_link = true;
                    events.push(Event::Start(tag));
                }
                Event::End(TagEnd::Link) => {
                    in_link = false;
                    events.push(Event::End(TagEnd::Link));
                }
                Event::Start(tag @ Tag::Image { .. }) => {
                    in_image = true;
                    events.push(Event::Start(tag));
                }
                Event::End(TagEnd::Image) => {
                    in_image = false;
                    events.push(Event::End(TagEnd::Image));
                }
                Event::Text(text) if !in_link && !in_image => {
                    push_linkified(&mut events, &text);
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

/// Characters that end a bare URL.
fn is_url_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, '<' | '>' | '"')
}

/// Punctuation not counted as part of a URL when trailing.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\''];

/// Start index of the next bare `http(s)://` URL, if any.
///
/// The scheme must sit at a word boundary so `xhttp://` and URLs
/// already inside longer tokens are not matched.
fn find_url_start(text: &str) -> Option<usize> {
    for (idx, _) in text.match_indices("http") {
        let tail = &text[idx..];
        if !tail.starts_with("http://") && !tail.starts_with("https://") {
            continue;
        }
        let at_boundary = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if at_boundary {
            return Some(idx);
        }
    }
    None
}

/// Emit text with bare URLs wrapped in autolink events.
fn push_linkified<'a>(events: &mut Vec<Event<'a>>, text: &str) {
    let mut rest = text;

    while let Some(start) = find_url_start(rest) {
        let scheme_len = if rest[start..].starts_with("https://") {
            8
        } else {
            7
        };
        let body = &rest[start + scheme_len..];
        let body_end = body.find(is_url_end).unwrap_or(body.len());
        let body = body[..body_end].trim_end_matches(TRAILING_PUNCT);

        if body.is_empty() {
            // Bare scheme with nothing behind it stays plain text
            push_text(events, &rest[..start + scheme_len]);
            rest = &rest[start + scheme_len..];
            continue;
        }

        if start > 0 {
            push_text(events, &rest[..start]);
        }
        let url_end = start + scheme_len + body.len();
        let url = rest[start..url_end].to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.clone().into(),
            title: "".into(),
            id: "".into(),
        }));
        events.push(Event::Text(url.into()));
        events.push(Event::End(TagEnd::Link));
        rest = &rest[url_end..];
    }

    if !rest.is_empty() {
        push_text(events, rest);
    }
}

fn push_text<'a>(events: &mut Vec<Event<'a>>, text: &str) {
    events.push(Event::Text(text.to_string().into()));
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paragraph() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Hello **world**");
        assert_eq!(html.trim(), "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn test_render_highlights_fenced_code() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nlet x = 1;\n```");
        assert!(html.contains("language-rust"));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_render_unlabeled_fence_is_plaintext() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\na < b\n```");
        assert!(html.contains("language-plaintext"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_render_sanitizes_inline_html() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("before\n\n<script>alert(1)</script>\n\nafter");
        assert!(!html.contains("<script"));
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_render_tables() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_render_task_list() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("- [x] done\n- [ ] todo");
        assert!(html.contains("checked"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_autolinks_bare_urls() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("visit https://example.com today");
        assert!(html.contains(r#"<a href="https://example.com">https://example.com</a>"#));
        assert!(html.contains("visit "));
        assert!(html.contains(" today"));
    }

    #[test]
    fn test_autolink_drops_trailing_punctuation() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("see http://example.com/a.");
        assert!(html.contains(r#"<a href="http://example.com/a">"#));
        assert!(html.contains("</a>."));
    }

    #[test]
    fn test_autolink_skips_code() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\nhttps://example.com\n```");
        assert!(!html.contains("<a "));

        let html = renderer.render("run `https://example.com` locally");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_autolink_leaves_existing_links_alone() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("[docs](https://example.com)");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains(">docs</a>"));
    }

    #[test]
    fn test_bare_scheme_stays_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("the https:// prefix");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_render_plain_has_no_spans() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render_plain("```rust\nlet x = 1;\n```");
        assert!(!html.contains("<span"));
        assert!(html.contains("<code"));
    }

    #[test]
    fn test_fence_info_string_extra_words_ignored() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust ignore\nlet x = 1;\n```");
        assert!(html.contains("language-rust"));
    }
}

//! Front matter parsing and serialization.
//!
//! A front-matter block is delimited by `---` lines at the top of a
//! markdown file. Scalars are `key: value`, sequences are block-style
//! lists:
//!
//! ```text
//! ---
//! id: k3j9x2m1
//! title: Hello
//! tags:
//!   - rust
//!   - blog
//! ---
//! ```
//!
//! Recognized keys map to typed fields; everything else passes through
//! `extra` unchanged so a rewrite never drops author data.

use serde_json::{Map, Value};

/// Keys with dedicated fields; everything else lands in `extra`.
///
/// | Field         | Type           | Description                      |
/// |---------------|----------------|----------------------------------|
/// | `id`          | `String`       | Stable generated identifier      |
/// | `title`       | `String`       | Article title                    |
/// | `date`        | `String`       | Publication date                 |
/// | `excerpt`     | `String`       | Explicit listing excerpt         |
/// | `description` | `String`       | Excerpt fallback                 |
/// | `author`      | `String`       | Author name                      |
/// | `category`    | `String`       | Category name                    |
/// | `tags`        | `Vec<String>`  | Categorization tags              |
/// | `sticky`      | `i64`          | List priority (default 0)        |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub sticky: i64,
    /// Unrecognized fields, preserved verbatim for round-trip fidelity.
    pub extra: Map<String, Value>,
}

impl FrontMatter {
    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Split a file into its front-matter block and body.
///
/// Returns `(block, body)` where `body` is everything after the line
/// terminating the closing delimiter, byte-for-byte. Returns `None`
/// when the file has no parseable front-matter block; callers then
/// treat the whole content as body.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    // Closing delimiter at the start of a line
    let (block, after) = if let Some(stripped) = rest.strip_prefix("---") {
        ("", stripped)
    } else {
        let end = rest.find("\n---")?;
        (&rest[..end], &rest[end + 4..])
    };

    // Consume the newline that terminates the delimiter line; the body
    // keeps everything after it (including an intentional blank line).
    let body = match after.strip_prefix("\r\n").or_else(|| after.strip_prefix('\n')) {
        Some(body) => body,
        None if after.is_empty() => "",
        // `---` was a prefix of a longer line, not a delimiter
        None => return None,
    };

    Some((block.trim_end_matches('\r'), body))
}

/// Parse a front-matter block into a [`FrontMatter`].
///
/// Tolerant by design: unknown keys pass through, malformed lines are
/// skipped, sequences may be block-style or comma-separated.
pub fn parse_block(block: &str) -> FrontMatter {
    let mut front = FrontMatter::default();
    let mut lines = block.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Nested mappings are not part of the format; skip indented
        // lines that are not list items (list items are consumed below).
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();

        // Block-style sequence: `key:` followed by `  - item` lines
        let mut seq: Vec<String> = Vec::new();
        if value.is_empty() {
            while let Some(next) = lines.peek() {
                let item = next.trim_start();
                if let Some(item) = item.strip_prefix("- ") {
                    seq.push(unquote(item.trim()).to_string());
                    lines.next();
                } else if item == "-" {
                    seq.push(String::new());
                    lines.next();
                } else {
                    break;
                }
            }
        }

        match key {
            "id" => front.id = non_empty(value),
            "title" => front.title = non_empty(value),
            "date" => front.date = non_empty(value),
            "excerpt" => front.excerpt = non_empty(value),
            "description" => front.description = non_empty(value),
            "author" => front.author = non_empty(value),
            "category" => front.category = non_empty(value),
            "tags" => {
                front.tags = if seq.is_empty() {
                    split_inline_list(value)
                } else {
                    seq
                };
            }
            "sticky" => front.sticky = parse_sticky(value),
            _ => {
                let json = if seq.is_empty() {
                    parse_scalar(value)
                } else {
                    Value::Array(seq.into_iter().map(Value::String).collect())
                };
                front.extra.insert(key.to_string(), json);
            }
        }
    }

    front
}

/// Serialize front matter and body back into file content.
///
/// Strings round-trip as `key: value`, sequences as block-style list
/// items, other scalars through JSON stringification. The body is
/// appended byte-for-byte after the closing delimiter, so
/// `serialize(parse(x))` is stable from the first rewrite on.
pub fn serialize(front: &FrontMatter, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 256);
    out.push_str("---\n");

    if let Some(id) = &front.id {
        push_scalar(&mut out, "id", id);
    }
    if let Some(title) = &front.title {
        push_scalar(&mut out, "title", title);
    }
    if let Some(date) = &front.date {
        push_scalar(&mut out, "date", date);
    }
    if let Some(excerpt) = &front.excerpt {
        push_scalar(&mut out, "excerpt", excerpt);
    }
    if let Some(description) = &front.description {
        push_scalar(&mut out, "description", description);
    }
    if let Some(author) = &front.author {
        push_scalar(&mut out, "author", author);
    }
    if let Some(category) = &front.category {
        push_scalar(&mut out, "category", category);
    }
    if !front.tags.is_empty() {
        push_sequence(&mut out, "tags", front.tags.iter().map(String::as_str));
    }
    if front.sticky != 0 {
        push_scalar(&mut out, "sticky", &front.sticky.to_string());
    }
    for (key, value) in &front.extra {
        match value {
            Value::String(s) => push_scalar(&mut out, key, s),
            Value::Array(items) => {
                push_sequence(
                    &mut out,
                    key,
                    items.iter().map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    }),
                );
            }
            other => push_scalar(&mut out, key, &other.to_string()),
        }
    }

    out.push_str("---\n");
    out.push_str(body);
    out
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn push_sequence<I, S>(out: &mut String, key: &str, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    out.push_str(key);
    out.push_str(":\n");
    for item in items {
        out.push_str("  - ");
        out.push_str(item.as_ref());
        out.push('\n');
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = unquote(value);
    (!value.is_empty()).then(|| value.to_string())
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn split_inline_list(value: &str) -> Vec<String> {
    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    value
        .split(',')
        .map(|item| unquote(item.trim()).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse `sticky`, falling back to 0 for anything non-numeric.
fn parse_sticky(value: &str) -> i64 {
    let value = unquote(value);
    value
        .parse::<i64>()
        .ok()
        .or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            value.parse::<f64>().ok().map(|f| f as i64)
        })
        .unwrap_or(0)
}

/// Parse an unrecognized scalar to a JSON value.
///
/// Booleans, null, and numbers keep their type so a rewrite does not
/// quote them; everything else stays a string.
fn parse_scalar(value: &str) -> Value {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if value.eq_ignore_ascii_case("null") || value == "~" {
        return Value::Null;
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = value.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }
    Value::String(unquote(value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let content = "---\ntitle: Hello\n---\n\n# Body";
        let (block, body) = split_front_matter(content).unwrap();
        assert_eq!(block, "title: Hello");
        assert_eq!(body, "\n# Body");
    }

    #[test]
    fn test_split_no_front_matter() {
        assert!(split_front_matter("# Just content").is_none());
        assert!(split_front_matter("").is_none());
        assert!(split_front_matter("--- not a delimiter").is_none());
    }

    #[test]
    fn test_split_unterminated_block() {
        assert!(split_front_matter("---\ntitle: Hello\nno closing").is_none());
    }

    #[test]
    fn test_parse_known_fields() {
        let front = parse_block(
            "id: a1b2c3d4\ntitle: Hello World\ndate: 2024-01-01\nsticky: 5\nauthor: yu",
        );
        assert_eq!(front.id.as_deref(), Some("a1b2c3d4"));
        assert_eq!(front.title.as_deref(), Some("Hello World"));
        assert_eq!(front.date.as_deref(), Some("2024-01-01"));
        assert_eq!(front.sticky, 5);
        assert_eq!(front.author.as_deref(), Some("yu"));
        assert!(front.has_id());
    }

    #[test]
    fn test_parse_block_sequence() {
        let front = parse_block("title: T\ntags:\n  - rust\n  - blog");
        assert_eq!(front.tags, vec!["rust", "blog"]);
    }

    #[test]
    fn test_parse_inline_tags() {
        let front = parse_block("tags: rust, blog");
        assert_eq!(front.tags, vec!["rust", "blog"]);
        let front = parse_block("tags: [rust, blog]");
        assert_eq!(front.tags, vec!["rust", "blog"]);
    }

    #[test]
    fn test_parse_extra_fields_typed() {
        let front = parse_block("title: T\ncover: /img/a.png\nviews: 42\nfeatured: true");
        assert_eq!(front.extra["cover"], Value::String("/img/a.png".into()));
        assert_eq!(front.extra["views"], Value::Number(42.into()));
        assert_eq!(front.extra["featured"], Value::Bool(true));
    }

    #[test]
    fn test_parse_sticky_fallback() {
        assert_eq!(parse_block("sticky: high").sticky, 0);
        assert_eq!(parse_block("sticky: 2.9").sticky, 2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let content = "---\ntitle: Hello\ndate: 2024-01-01\ntags:\n  - a\n  - b\ncustom: thing\n---\n\n# Hi\n\ncontent here\n";
        let (block, body) = split_front_matter(content).unwrap();
        let front = parse_block(block);

        let written = serialize(&front, body);
        let (block2, body2) = split_front_matter(&written).unwrap();
        let front2 = parse_block(block2);

        assert_eq!(front, front2);
        assert_eq!(body, body2, "body must round-trip byte-identical");
    }

    #[test]
    fn test_serialize_is_stable() {
        let content = "---\ntitle: Hello\nsticky: 3\ntags:\n  - a\n---\nbody";
        let (block, body) = split_front_matter(content).unwrap();
        let front = parse_block(block);
        let once = serialize(&front, body);

        let (block2, body2) = split_front_matter(&once).unwrap();
        let twice = serialize(&parse_block(block2), body2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialize_appends_body_verbatim() {
        let front = FrontMatter {
            id: Some("a1b2c3d4".into()),
            ..Default::default()
        };
        assert_eq!(serialize(&front, "# Hi"), "---\nid: a1b2c3d4\n---\n# Hi");
        assert_eq!(
            serialize(&front, "\n# Hi"),
            "---\nid: a1b2c3d4\n---\n\n# Hi"
        );
    }

    #[test]
    fn test_quoted_values_unwrapped() {
        let front = parse_block("title: \"Quoted Title\"\ncategory: 'notes'");
        assert_eq!(front.title.as_deref(), Some("Quoted Title"));
        assert_eq!(front.category.as_deref(), Some("notes"));
    }

    #[test]
    fn test_empty_block() {
        let content = "---\n---\nbody";
        let (block, body) = split_front_matter(content).unwrap();
        assert_eq!(block, "");
        assert_eq!(body, "body");
        assert_eq!(parse_block(block), FrontMatter::default());
    }
}

//! Syntax highlighting for fenced code blocks.
//!
//! Wraps syntect with class-based output (styling is a CSS concern,
//! the generated HTML carries no inline styles). A small core set of
//! languages is resolved eagerly at construction; any other language
//! token is resolved on first encounter and memoized, so repeated
//! fences of the same language never pay the lookup twice.
//!
//! Unknown languages fall back to escaped plaintext. Highlighting
//! never fails a page.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::escape_html;
use crate::debug;

/// Languages resolved eagerly at highlighter construction.
const CORE_LANGUAGES: [&str; 6] = ["js", "ts", "bash", "json", "html", "css"];

pub struct Highlighter {
    syntaxes: SyntaxSet,
    /// Language token -> syntax name, `None` for unsupported tokens.
    resolved: RwLock<FxHashMap<String, Option<String>>>,
}

impl Highlighter {
    pub fn new() -> Self {
        let highlighter = Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            resolved: RwLock::new(FxHashMap::default()),
        };
        for lang in CORE_LANGUAGES {
            highlighter.resolve(lang);
        }
        highlighter
    }

    /// Highlight a fenced code block to HTML.
    ///
    /// `lang` is the fence info string; `None` or an unrecognized
    /// token renders as escaped plaintext.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.filter(|l| !l.is_empty()).unwrap_or("plaintext");

        let Some(syntax_name) = self.resolve(lang) else {
            return plain_code_block(code, lang);
        };
        let Some(syntax) = self.syntaxes.find_syntax_by_name(&syntax_name) else {
            return plain_code_block(code, lang);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                debug!("render"; "highlight failed for {}: {}", lang, e);
                return plain_code_block(code, lang);
            }
        }

        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            escape_html(lang),
            generator.finalize()
        )
    }

    /// Resolve a language token to a syntax name, memoizing the result.
    fn resolve(&self, lang: &str) -> Option<String> {
        if let Some(cached) = self.resolved.read().get(lang) {
            return cached.clone();
        }
        let name = self
            .syntaxes
            .find_syntax_by_token(lang)
            .map(|syntax| syntax.name.clone());
        if name.is_none() {
            debug!("render"; "no grammar for language: {}", lang);
        }
        self.resolved.write().insert(lang.to_string(), name.clone());
        name
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escaped-plaintext fallback rendering for a code block.
pub fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(lang),
        escape_html(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_known_language() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("let x = 1;", Some("rust"));
        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plaintext() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("fn <main>()", Some("nosuchlang"));
        assert!(html.contains("language-nosuchlang"));
        assert!(html.contains("fn &lt;main&gt;()"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn test_missing_language_is_plaintext() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("a < b", None);
        assert!(html.contains("language-plaintext"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_resolution_is_memoized() {
        let highlighter = Highlighter::new();
        highlighter.highlight("x", Some("rust"));
        assert!(highlighter.resolved.read().contains_key("rust"));
        highlighter.highlight("y", Some("nosuchlang"));
        assert_eq!(
            highlighter.resolved.read().get("nosuchlang"),
            Some(&None)
        );
    }

    #[test]
    fn test_core_languages_resolved_eagerly() {
        let highlighter = Highlighter::new();
        let resolved = highlighter.resolved.read();
        for lang in CORE_LANGUAGES {
            assert!(resolved.contains_key(lang), "core language {lang} not resolved");
        }
    }
}

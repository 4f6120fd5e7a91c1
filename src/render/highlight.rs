//! Code highlighting with syntect

use lazy_static::lazy_static;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::helpers::html_escape;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Highlights code blocks with a fixed theme
#[derive(Debug, Clone)]
pub struct Highlighter {
    theme_name: String,
}

impl Highlighter {
    pub fn new(theme: &str) -> Self {
        Self {
            theme_name: theme.to_string(),
        }
    }

    /// Render `code` as highlighted HTML for the given language tag
    pub fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = find_syntax(lang);

        match highlighted_html_for_string(code, &SYNTAX_SET, syntax, self.theme()) {
            Ok(highlighted) => highlighted,
            Err(e) => {
                tracing::warn!("Highlighting failed for {}: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }

    fn theme(&self) -> &'static Theme {
        THEME_SET
            .themes
            .get(&self.theme_name)
            .or_else(|| THEME_SET.themes.get("base16-ocean.dark"))
            .or_else(|| THEME_SET.themes.values().next())
            .expect("syntect ships default themes")
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

/// Look a language tag up by token, extension, then name
fn find_syntax(lang: &str) -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
        .or_else(|| {
            SYNTAX_SET
                .syntaxes()
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(lang))
        })
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language() {
        assert_eq!(find_syntax("python").name, "Python");
        assert_eq!(find_syntax("rs").name, "Rust");
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        assert_eq!(find_syntax("klingon").name, "Plain Text");
        assert_eq!(find_syntax("text").name, "Plain Text");
    }

    #[test]
    fn test_highlight_escapes() {
        let html = Highlighter::default().highlight("a < b", "text");
        assert!(html.contains("&lt;"));
        assert!(html.starts_with("<pre"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let html = Highlighter::new("no-such-theme").highlight("x = 1", "python");
        assert!(html.contains("<span"));
    }
}

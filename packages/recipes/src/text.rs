//! Plain text helpers shared by the recipes.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// reStructuredText markup characters in running text. An underscore only
/// matters when it ends a word (`name_` is a reference).
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\\*`|]|_\b").unwrap());

static SURROUNDING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(\s*)(.*?)(\s*)$").unwrap());

static FORMULA_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\$\s*").unwrap());
static FORMULA_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\$\s*$").unwrap());

/// Backslash-escape markup characters
pub fn escape_text(text: &str) -> String {
    MARKUP
        .replace_all(text, |caps: &Captures<'_>| format!("\\{}", &caps[0]))
        .into_owned()
}

/// Prefix every line that isn't blank with `width` spaces
pub fn indent(text: &str, width: usize) -> String {
    let prefix = " ".repeat(width);
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(&prefix);
        }
        out.push_str(line);
    }
    out
}

/// Split text into leading whitespace, content and trailing whitespace
pub fn split_whitespace(text: &str) -> (&str, &str, &str) {
    match SURROUNDING_SPACE.captures(text) {
        Some(caps) => {
            let part = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            (part(1), part(2), part(3))
        }
        None => ("", text, ""),
    }
}

/// Strip the `$` delimiters of an inline formula
pub fn strip_formula_delimiters(text: &str) -> String {
    let text = FORMULA_OPEN.replace(text, "");
    FORMULA_CLOSE.replace(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a*b"), "a\\*b");
        assert_eq!(escape_text("`x` | y"), "\\`x\\` \\| y");
        assert_eq!(escape_text("C:\\path"), "C:\\\\path");
        assert_eq!(escape_text("snake_case"), "snake_case");
        assert_eq!(escape_text("trailing_ word_"), "trailing\\_ word\\_");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb\n", 3), "   a\n\n   b\n");
        assert_eq!(indent("", 3), "");
    }

    #[test]
    fn test_split_whitespace() {
        assert_eq!(split_whitespace("  test  "), ("  ", "test", "  "));
        assert_eq!(split_whitespace("test"), ("", "test", ""));
        assert_eq!(split_whitespace(" a\nb "), (" ", "a\nb", " "));
        assert_eq!(split_whitespace("   "), ("   ", "", ""));
    }

    #[test]
    fn test_strip_formula_delimiters() {
        assert_eq!(strip_formula_delimiters(" $ x^2 $ "), "x^2");
        assert_eq!(strip_formula_delimiters("$a$"), "a");
    }
}

//! Inline markup spans.
//!
//! reStructuredText only recognizes an inline markup start-string after
//! whitespace or certain punctuation, and an end-string before whitespace or
//! certain punctuation. When a span is glued to surrounding text it must be
//! separated with an escaped space (`\ ` before, `\` after) so that
//! `x**bold**y` renders as `x\ **bold**\ y`.
//!
//! A start-string after an opening bracket or quote is also rejected when
//! it's followed by the matching closer (`(*)` is not emphasis), so that case
//! needs the escape as well.

use crate::text::escape_text;
use unicode_general_category::{get_general_category, GeneralCategory};

/// A span kind: its delimiters and whether its content is escaped. Literal
/// and math content is taken verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    open: &'static str,
    close: &'static str,
    escape: bool,
}

pub const BOLD: Span = Span::new("**", "**", true);
pub const EMPHASIS: Span = Span::new("*", "*", true);
pub const LITERAL: Span = Span::new("``", "``", false);
pub const SUBSCRIPT: Span = Span::new(":sub:`", "`", true);
pub const SUPERSCRIPT: Span = Span::new(":sup:`", "`", true);
pub const MATH: Span = Span::new(":math:`", "`", false);
/// A reference that couldn't be resolved, rendered as literal text
pub const UNRESOLVED: Span = Span::new("`!", "`", true);

impl Span {
    pub const fn new(open: &'static str, close: &'static str, escape: bool) -> Self {
        Self { open, close, escape }
    }

    /// Render `text` followed by `tail`, given the output so far on the line
    pub fn render(&self, text: &str, tail: Option<&str>, before: &str) -> String {
        let inner = if self.escape {
            escape_text(text)
        } else {
            text.to_string()
        };
        wrap(self.open, &inner, self.close, tail, before)
    }
}

/// Wrap already formatted `inner` in delimiters, adding the escapes the
/// surroundings require. `tail` is escaped here.
pub fn wrap(open: &str, inner: &str, close: &str, tail: Option<&str>, before: &str) -> String {
    let tail = escape_text(tail.unwrap_or(""));
    let mut out = String::with_capacity(open.len() + inner.len() + close.len() + tail.len() + 3);

    if needs_leading_escape(before.chars().last(), inner.chars().next()) {
        out.push_str("\\ ");
    }
    out.push_str(open);
    out.push_str(inner);
    out.push_str(close);
    if needs_trailing_escape(tail.chars().next()) {
        out.push('\\');
    }
    out.push_str(&tail);
    out
}

/// Whether a start-string preceded by `before` and followed by `first` must
/// be separated with `\ `
pub fn needs_leading_escape(before: Option<char>, first: Option<char>) -> bool {
    let Some(before) = before else {
        return false;
    };
    if matches!(before, '*' | '`' | '|' | '_') {
        return true;
    }
    if is_opener(before) {
        return first.is_some_and(|first| closes(before, first));
    }
    if before.is_whitespace() || matches!(before, '-' | ':' | '/') {
        return false;
    }
    !matches!(
        get_general_category(before),
        GeneralCategory::DashPunctuation | GeneralCategory::OtherPunctuation
    )
}

/// Whether an end-string followed by `after` must be separated with `\`
pub fn needs_trailing_escape(after: Option<char>) -> bool {
    let Some(after) = after else {
        return false;
    };
    if after.is_whitespace()
        || matches!(
            after,
            '.' | ',' | ';' | ':' | '!' | '?' | '\\' | '/' | '\'' | '"' | ')' | ']' | '}' | '>' | '-'
        )
    {
        return false;
    }
    !matches!(
        get_general_category(after),
        GeneralCategory::ClosePunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
    )
}

fn is_opener(c: char) -> bool {
    matches!(c, '\'' | '"' | '<' | '(' | '[' | '{')
        || matches!(
            get_general_category(c),
            GeneralCategory::OpenPunctuation
                | GeneralCategory::InitialPunctuation
                | GeneralCategory::FinalPunctuation
        )
}

/// Quotes whose closer depends on the language convention
const QUOTE_PAIRS: &[(char, &str)] = &[
    ('\u{00ab}', "\u{00bb}"),
    ('\u{00bb}', "\u{00ab}\u{00bb}"),
    ('\u{2018}', "\u{2019}\u{201a}"),
    ('\u{2019}', "\u{2019}"),
    ('\u{201a}', "\u{2018}\u{2019}"),
    ('\u{201c}', "\u{201d}\u{201e}"),
    ('\u{201d}', "\u{201d}"),
    ('\u{201e}', "\u{201c}\u{201d}"),
    ('\u{2039}', "\u{203a}"),
    ('\u{203a}', "\u{2039}\u{203a}"),
];

/// Whether `close` closes `open`
fn closes(open: char, close: char) -> bool {
    let ascii = match open {
        '\'' => Some('\''),
        '"' => Some('"'),
        '<' => Some('>'),
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    };
    if let Some(expected) = ascii {
        return close == expected;
    }
    if let Some((_, closers)) = QUOTE_PAIRS.iter().find(|(opener, _)| *opener == open) {
        return closers.contains(close);
    }
    // Paired brackets are allocated next to each other
    get_general_category(open) == GeneralCategory::OpenPunctuation
        && get_general_category(close) == GeneralCategory::ClosePunctuation
        && char::from_u32(open as u32 + 1) == Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_line_needs_no_escape() {
        assert_eq!(BOLD.render("test", None, ""), "**test**");
    }

    #[test]
    fn test_letter_before_needs_escape() {
        assert_eq!(BOLD.render("test", None, "x"), "\\ **test**");
    }

    #[test]
    fn test_markup_character_before_needs_escape() {
        assert_eq!(BOLD.render("bold", None, "**a**"), "\\ **bold**");
    }

    #[test]
    fn test_permitted_preceding_characters() {
        for before in [" ", "a-", "a:", "a/", "\n", "a.", "a,", "\u{2014}"] {
            assert_eq!(EMPHASIS.render("e", None, before), "*e*", "before {before:?}");
        }
    }

    #[test]
    fn test_opener_followed_by_its_closer() {
        assert_eq!(EMPHASIS.render("x", None, "("), "*x*");
        assert_eq!(EMPHASIS.render(")", None, "("), "\\ *)*");
        assert_eq!(EMPHASIS.render("]", None, "("), "*]*");
        assert_eq!(EMPHASIS.render("\u{00bb}", None, "\u{00ab}"), "\\ *\u{00bb}*");
        assert_eq!(EMPHASIS.render("\u{300b}", None, "\u{300a}"), "\\ *\u{300b}*");
        assert_eq!(EMPHASIS.render("\u{201d}", None, "\u{201c}"), "\\ *\u{201d}*");
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(BOLD.render("b", Some("s"), ""), "**b**\\s");
        assert_eq!(BOLD.render("b", Some(" s"), ""), "**b** s");
        assert_eq!(BOLD.render("b", Some(", s"), ""), "**b**, s");
        assert_eq!(BOLD.render("b", Some(")"), ""), "**b**)");
        assert_eq!(BOLD.render("b", Some("\u{00bb}"), ""), "**b**\u{00bb}");
        assert_eq!(BOLD.render("b", Some(""), ""), "**b**");
    }

    #[test]
    fn test_content_and_tail_are_escaped() {
        assert_eq!(BOLD.render("a*b", Some(" c*"), ""), "**a\\*b** c\\*");
        assert_eq!(LITERAL.render("a*b", None, ""), "``a*b``");
    }

    #[test]
    fn test_roles() {
        assert_eq!(SUBSCRIPT.render("2", Some("O"), "H"), "\\ :sub:`2`\\O");
        assert_eq!(MATH.render("\\alpha", None, " "), ":math:`\\alpha`");
    }
}

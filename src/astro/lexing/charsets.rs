//! Static membership sets driving the scanner's per-character dispatch.

use crate::astro::lexing::tokens::Base;
use once_cell::sync::Lazy;
use std::collections::HashSet;

pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "import", "export", "from", "as", "module", "type", "enum", "fun", "prop", "let", "var",
        "const", "ref", "val", "iso", "acq", "if", "elif", "else", "while", "for", "loop", "try",
        "except", "ensure", "defer", "match", "return", "raise", "break", "continue", "yield",
        "fallthrough", "pass", "await", "new", "is", "not", "in", "mod",
    ]
    .into_iter()
    .collect()
});

pub static BOOLEANS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["true", "false"].into_iter().collect());

pub static OPERATOR_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    [
        '+', '-', '*', '/', '\\', '^', '%', '&', '|', '!', '>', '<', '=', '÷', '×', '≠', '≈', '¹',
        '²', '³', '√', '?', '~',
    ]
    .into_iter()
    .collect()
});

pub static PUNCTUATORS: Lazy<HashSet<char>> = Lazy::new(|| {
    ['(', ')', '{', '}', '[', ']', ',', '.', ';', ':', '@', '$']
        .into_iter()
        .collect()
});

static BINARY_DIGITS: Lazy<HashSet<char>> = Lazy::new(|| ('0'..='1').collect());
static OCTAL_DIGITS: Lazy<HashSet<char>> = Lazy::new(|| ('0'..='7').collect());
static DECIMAL_DIGITS: Lazy<HashSet<char>> = Lazy::new(|| ('0'..='9').collect());
static HEX_DIGITS: Lazy<HashSet<char>> =
    Lazy::new(|| ('0'..='9').chain('a'..='f').chain('A'..='F').collect());

pub fn is_digit_in(base: Base, c: char) -> bool {
    match base {
        Base::Binary => BINARY_DIGITS.contains(&c),
        Base::Octal => OCTAL_DIGITS.contains(&c),
        Base::Decimal => DECIMAL_DIGITS.contains(&c),
        Base::Hexadecimal => HEX_DIGITS.contains(&c),
    }
}

pub fn is_decimal_digit(c: char) -> bool {
    DECIMAL_DIGITS.contains(&c)
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

pub fn is_punctuator(c: char) -> bool {
    PUNCTUATORS.contains(&c)
}

pub fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

pub fn is_boolean(word: &str) -> bool {
    BOOLEANS.contains(word)
}

pub fn is_opening_bracket(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

pub fn is_closing_bracket(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_alphabets_follow_the_base() {
        assert!(is_digit_in(Base::Binary, '1'));
        assert!(!is_digit_in(Base::Binary, '2'));
        assert!(is_digit_in(Base::Octal, '7'));
        assert!(!is_digit_in(Base::Octal, '8'));
        assert!(is_digit_in(Base::Hexadecimal, 'F'));
        assert!(!is_digit_in(Base::Decimal, 'a'));
    }

    #[test]
    fn keywords_and_booleans_are_disjoint() {
        assert!(is_keyword("fallthrough"));
        assert!(!is_keyword("true"));
        assert!(is_boolean("false"));
    }
}

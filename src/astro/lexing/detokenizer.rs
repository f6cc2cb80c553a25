//! Detokenizer
//!
//! Converts tokens back into source text. Literal tokens are rendered in a
//! form that re-lexes to the same kind and normalized text (base prefixes
//! and quotes are restored), and layout tokens are turned back into line
//! breaks with four spaces per indentation level.
//!
//! This is useful for:
//!
//! - Round-trip testing (source -> tokens -> source -> tokens)
//! - Printing normalized source from a token stream

use super::tokens::{Token, TokenKind};

/// Trait for converting a token to its source representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for Token {
    fn to_source(&self) -> String {
        let text = self.text();
        match self.kind {
            TokenKind::Integer(base) | TokenKind::Float(base) => {
                format!("{}{}", base.prefix(), text)
            }
            TokenKind::String if text.contains('"') => format!("'{}'", text),
            TokenKind::String => format!("\"{}\"", text),
            TokenKind::MultiLineString if text.contains("\"\"\"") => format!("'''{}'''", text),
            TokenKind::MultiLineString => format!("\"\"\"{}\"\"\"", text),
            TokenKind::Regex => format!("/{}/", text),
            TokenKind::Comment => format!("#{}", text),
            TokenKind::MultiLineComment => format!("#={}=#", text),
            TokenKind::Identifier
            | TokenKind::Keyword
            | TokenKind::Boolean
            | TokenKind::Operator
            | TokenKind::Punctuator => text.to_string(),
            // Layout markers are reconstructed by `detokenize`
            TokenKind::Newline
            | TokenKind::Indent
            | TokenKind::Dedent
            | TokenKind::NoSpace
            | TokenKind::EndOfInput => String::new(),
        }
    }
}

const INDENT: &str = "    ";

/// Detokenize a stream of tokens into a string
///
/// Tokens on one line are separated by a single space unless a no-space
/// marker sits between them. Newline, indent and dedent markers start a new
/// line at the resulting level.
pub fn detokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut level = 0usize;
    let mut pending_line = false;
    let mut glued = false;
    let mut line_empty = true;

    for token in tokens {
        match token.kind {
            TokenKind::Indent => {
                level += 1;
                pending_line = true;
            }
            TokenKind::Dedent => {
                level = level.saturating_sub(1);
                pending_line = true;
            }
            TokenKind::Newline => pending_line = true,
            TokenKind::NoSpace => glued = true,
            TokenKind::EndOfInput => {}
            _ => {
                if pending_line {
                    out.push('\n');
                    out.push_str(&INDENT.repeat(level));
                    pending_line = false;
                    line_empty = true;
                }
                if !line_empty && !glued {
                    out.push(' ');
                }
                out.push_str(&token.to_source());
                line_empty = false;
                glued = false;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::lexing::lex;

    fn strip(tokens: Vec<Token>) -> Vec<(TokenKind, String)> {
        tokens
            .into_iter()
            .map(|token| (token.kind, token.text().to_string()))
            .collect()
    }

    #[test]
    fn test_literals_render_with_prefix_and_quotes() {
        let tokens = lex("0b10_01 'say \"hi\"' \"plain\" x = /a+/").unwrap();
        let rendered: Vec<String> = tokens.iter().map(ToSource::to_source).collect();
        assert_eq!(rendered[0], "0b1001");
        assert_eq!(rendered[1], "'say \"hi\"'");
        assert_eq!(rendered[2], "\"plain\"");
        assert_eq!(rendered[5], "/a+/");
    }

    #[test]
    fn test_round_trip_through_source() {
        let source = "fun f(x)\n  if x>1\n    return .5\n  g(x)  # done\ny";
        let tokens = lex(source).unwrap();
        let rebuilt = detokenize(&tokens);
        assert_eq!(
            rebuilt,
            "fun f(x)\n    if x>1\n        return 0.5\n    g(x) # done\ny"
        );
        assert_eq!(strip(lex(&rebuilt).unwrap()), strip(tokens));
    }
}

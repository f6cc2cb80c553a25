//! Human-readable renderings of tokens and syntax trees
//!
//! Machine-readable output (JSON, YAML) comes straight from the `Serialize`
//! derives on tokens and nodes; the formats here are for reading.

pub mod treeviz;

pub use treeviz::to_treeviz_str;

use crate::astro::lexing::Token;

/// One token per line: `line:col-line:col  kind  text`.
pub fn to_token_lines(tokens: &[Token]) -> String {
    let mut result = String::new();
    for token in tokens {
        let span = format!("{}-{}", token.start(), token.end());
        match &token.text {
            Some(text) => result.push_str(&format!(
                "{:<12} {:<20} {}\n",
                span,
                token.kind.to_string(),
                text.escape_debug()
            )),
            None => result.push_str(&format!("{:<12} {}\n", span, token.kind)),
        }
    }
    result
}

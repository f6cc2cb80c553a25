//! Numeral subgrammar
//!
//! ```text
//! numeral   = '0' ('b' | 'o' | 'x') digits fraction? exponent?
//!           | digits fraction? exponent?
//!           | '.' digits exponent?
//! digits    = digit ('_'* digit)*          (digit drawn from the base alphabet)
//! fraction  = '.' digits | '.'             (a bare '.' spells out `.0`: `5.` is 5.0)
//! exponent  = ('e' | 'p') ('+' | '-')? decimal-digits
//! ```
//!
//! The emitted text drops the base prefix and every underscore, and spells
//! out the implicit zero of `.5` and `5.`. Letters touching the end of a
//! literal are never consumed (outside the hex alphabet), which leaves them
//! for the identifier of a coefficient expression such as `78f`.

use super::charsets::{is_decimal_digit, is_digit_in, is_identifier_start, is_operator_char};
use super::common::LexResult;
use super::scanner::Scanner;
use super::tokens::{Base, Token, TokenKind};

impl Scanner<'_> {
    pub(super) fn numeral(&mut self) -> LexResult<Token> {
        let start = self.mark();
        let mut text = String::new();
        let mut base = Base::Decimal;
        let mut is_float;

        if self.peek() == Some('.') {
            self.advance();
            text.push_str("0.");
            self.digits(Base::Decimal, &mut text)?;
            is_float = true;
        } else {
            if let Some(selected) = self.base_prefix() {
                base = selected;
                self.advance();
                self.advance();
                if self.digits(base, &mut text)? == 0 {
                    return Err(self.error_at(
                        start,
                        format!(
                            "expected {} digits after `{}`",
                            base.name(),
                            base.prefix()
                        ),
                    ));
                }
            } else {
                self.digits(Base::Decimal, &mut text)?;
            }
            is_float = self.fraction(base, &mut text)?;
        }

        if self.exponent(base, &mut text)? {
            is_float = true;
        }

        let kind = if is_float {
            TokenKind::Float(base)
        } else {
            TokenKind::Integer(base)
        };
        Ok(self.token_from(start, kind, text))
    }

    fn base_prefix(&self) -> Option<Base> {
        if self.peek() != Some('0') {
            return None;
        }
        match self.peek_nth(1) {
            Some('b') => Some(Base::Binary),
            Some('o') => Some(Base::Octal),
            Some('x') => Some(Base::Hexadecimal),
            _ => None,
        }
    }

    /// Consume a digit run of `base`, dropping separators. Returns the number
    /// of digits read. A trailing underscore run is left in the input.
    fn digits(&mut self, base: Base, text: &mut String) -> LexResult<usize> {
        let mut count = 0;
        loop {
            match self.peek() {
                Some(c) if is_digit_in(base, c) => {
                    self.advance();
                    text.push(c);
                    count += 1;
                }
                Some('_') => {
                    let mut run = 0;
                    while self.peek_nth(run) == Some('_') {
                        run += 1;
                    }
                    if !self.peek_nth(run).is_some_and(|c| is_digit_in(base, c)) {
                        break;
                    }
                    for _ in 0..run {
                        self.advance();
                    }
                }
                Some(c) if is_decimal_digit(c) => {
                    return Err(self.error_here(format!(
                        "`{}` is not a valid {} digit",
                        c,
                        base.name()
                    )));
                }
                _ => break,
            }
        }
        Ok(count)
    }

    /// Returns true when a fractional part was read.
    fn fraction(&mut self, base: Base, text: &mut String) -> LexResult<bool> {
        if self.peek() != Some('.') {
            return Ok(false);
        }
        match self.peek_nth(1) {
            Some(c) if is_digit_in(base, c) || is_decimal_digit(c) => {
                self.advance();
                text.push('.');
                self.digits(base, text)?;
                Ok(true)
            }
            Some(c) if is_operator_char(c) || is_identifier_start(c) || c == '.' => Ok(false),
            _ => {
                self.advance();
                text.push_str(".0");
                Ok(true)
            }
        }
    }

    /// Returns true when an exponent was read. A marker letter that is not
    /// followed by digits is left for a coefficient identifier.
    fn exponent(&mut self, base: Base, text: &mut String) -> LexResult<bool> {
        let marker = base.exponent_marker();
        if !self
            .peek()
            .is_some_and(|c| c.to_ascii_lowercase() == marker)
        {
            return Ok(false);
        }

        let signed = matches!(self.peek_nth(1), Some('+') | Some('-'));
        let digit_at = if signed { 2 } else { 1 };
        if !self.peek_nth(digit_at).is_some_and(is_decimal_digit) {
            if signed {
                let mark = self.mark();
                return Err(self.error_at(
                    mark,
                    format!("exponent sign after `{}` must be followed by digits", marker),
                ));
            }
            return Ok(false);
        }

        self.advance();
        text.push(marker);
        if signed {
            if let Some(sign) = self.advance() {
                text.push(sign);
            }
        }
        self.digits(Base::Decimal, text)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::astro::lexing::scanner::{Lexeme, Scanner};
    use crate::astro::lexing::tokens::{Base, TokenKind};

    fn first(source: &str) -> (TokenKind, String) {
        let lexemes = Scanner::new(source).scan().expect("scan to succeed");
        match lexemes.into_iter().next() {
            Some(Lexeme::Token(token)) => (token.kind, token.text().to_string()),
            other => panic!("expected a token, got {:?}", other),
        }
    }

    fn scan_error(source: &str) -> String {
        Scanner::new(source).scan().unwrap_err().message
    }

    #[test]
    fn test_bases_drop_prefix_and_separators() {
        assert_eq!(first("0b10_01"), (TokenKind::Integer(Base::Binary), "1001".to_string()));
        assert_eq!(first("0o7_7"), (TokenKind::Integer(Base::Octal), "77".to_string()));
        assert_eq!(first("0x_FF_a0"), (TokenKind::Integer(Base::Hexadecimal), "FFa0".to_string()));
        assert_eq!(first("1__000"), (TokenKind::Integer(Base::Decimal), "1000".to_string()));
    }

    #[test]
    fn test_implicit_zeroes() {
        assert_eq!(first(".5"), (TokenKind::Float(Base::Decimal), "0.5".to_string()));
        assert_eq!(first("5."), (TokenKind::Float(Base::Decimal), "5.0".to_string()));
        assert_eq!(first("5.)"), (TokenKind::Float(Base::Decimal), "5.0".to_string()));
    }

    #[test]
    fn test_dot_that_does_not_start_a_fraction() {
        assert_eq!(first("5.abs"), (TokenKind::Integer(Base::Decimal), "5".to_string()));
        assert_eq!(first("1..n"), (TokenKind::Integer(Base::Decimal), "1".to_string()));
        assert_eq!(first("5.+x"), (TokenKind::Integer(Base::Decimal), "5".to_string()));
        assert_eq!(first("0x1.g"), (TokenKind::Integer(Base::Hexadecimal), "1".to_string()));
    }

    #[test]
    fn test_bare_dot_spells_out_zero_in_every_base() {
        assert_eq!(first("0b1."), (TokenKind::Float(Base::Binary), "1.0".to_string()));
        assert_eq!(first("0o7. "), (TokenKind::Float(Base::Octal), "7.0".to_string()));
        assert_eq!(first("0xF.)"), (TokenKind::Float(Base::Hexadecimal), "F.0".to_string()));
    }

    #[test]
    fn test_fractions_use_the_base_alphabet() {
        assert_eq!(first("0x1.Ap3"), (TokenKind::Float(Base::Hexadecimal), "1.Ap3".to_string()));
        assert_eq!(first("0xF.F"), (TokenKind::Float(Base::Hexadecimal), "F.F".to_string()));
        assert_eq!(first("0b1.01"), (TokenKind::Float(Base::Binary), "1.01".to_string()));
    }

    #[test]
    fn test_exponents_use_decimal_digits() {
        assert_eq!(first("1e10"), (TokenKind::Float(Base::Decimal), "1e10".to_string()));
        assert_eq!(first("2.5E-3"), (TokenKind::Float(Base::Decimal), "2.5e-3".to_string()));
        assert_eq!(first("0x1Ap+19"), (TokenKind::Float(Base::Hexadecimal), "1Ap+19".to_string()));
        assert_eq!(first("0b1.1e+10"), (TokenKind::Float(Base::Binary), "1.1e+10".to_string()));
        assert_eq!(first("0o7.7e9"), (TokenKind::Float(Base::Octal), "7.7e9".to_string()));
    }

    #[test]
    fn test_trailing_underscore_is_left_in_the_input() {
        let lexemes = Scanner::new("12_").scan().unwrap();
        let texts: Vec<_> = lexemes
            .iter()
            .filter_map(|lexeme| match lexeme {
                Lexeme::Token(token) => Some(token.text().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["12", "_"]);
    }

    #[test]
    fn test_coefficient_letters_are_not_consumed() {
        assert_eq!(first("78f"), (TokenKind::Integer(Base::Decimal), "78".to_string()));
        assert_eq!(first(".78f"), (TokenKind::Float(Base::Decimal), "0.78".to_string()));
        assert_eq!(first("0o7.77f"), (TokenKind::Float(Base::Octal), "7.77".to_string()));
        assert_eq!(first("2e"), (TokenKind::Integer(Base::Decimal), "2".to_string()));
        assert_eq!(first("0x78ff"), (TokenKind::Integer(Base::Hexadecimal), "78ff".to_string()));
    }

    #[test]
    fn test_malformed_numerals() {
        assert_eq!(scan_error("0b102"), "`2` is not a valid binary digit");
        assert_eq!(scan_error("0o78"), "`8` is not a valid octal digit");
        assert_eq!(scan_error("0xg"), "expected hexadecimal digits after `0x`");
        assert_eq!(scan_error("1e+"), "exponent sign after `e` must be followed by digits");
    }
}

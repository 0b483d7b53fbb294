//! Declaration value text to [`Term`]s.
//!
//! This is a small scanner for the component values that appear on the right
//! of a declaration (`1px solid rgb(1, 2, 3)`). It follows the token shapes of
//! [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization) but
//! produces typed terms directly; full style sheet tokenizing is left to the
//! caller.

use std::str::FromStr;

use super::{
    AngleUnit, Dimension, LengthUnit, Operator, ResolutionUnit, Rgba, Term, TermValue, TimeUnit,
};
use crate::error::ValueError;

/// Split value text into typed terms.
///
/// # Errors
///
/// Returns [`ValueError::Syntax`] for malformed text (unterminated strings or
/// functions, stray separators) and [`ValueError::UnknownUnit`] for
/// dimensions with an unrecognised unit.
pub fn parse_terms(text: &str) -> Result<Vec<Term>, ValueError> {
    let mut scanner = TermScanner {
        text,
        chars: text.chars().collect(),
        pos: 0,
    };
    scanner.parse_list(None)
}

/// Split `text` at each `separator` that is not inside parentheses, brackets
/// or a string. A backslash escapes the next character inside a string.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, _) if c == separator && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

struct TermScanner<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

/// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

impl TermScanner<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self) -> ValueError {
        ValueError::Syntax {
            text: self.text.to_string(),
            position: self.pos,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Parse terms until end of input, or until `closing` (consumed).
    fn parse_list(&mut self, closing: Option<char>) -> Result<Vec<Term>, ValueError> {
        let mut terms: Vec<Term> = Vec::new();
        let mut pending: Option<Operator> = None;
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                if closing.is_some() {
                    return Err(self.error());
                }
                break;
            };
            if Some(c) == closing {
                self.pos += 1;
                break;
            }
            if c == ',' || c == '/' {
                if terms.is_empty() || pending.is_some() {
                    return Err(self.error());
                }
                pending = Some(if c == ',' {
                    Operator::Comma
                } else {
                    Operator::Slash
                });
                self.pos += 1;
                continue;
            }
            let value = self.parse_value()?;
            let operator = if terms.is_empty() {
                None
            } else {
                Some(pending.take().unwrap_or(Operator::Space))
            };
            terms.push(Term { operator, value });
        }
        if pending.is_some() {
            return Err(self.error());
        }
        Ok(terms)
    }

    fn starts_number(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            Some('+' | '-') => match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            },
            _ => false,
        }
    }

    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => self
                .peek_at(1)
                .is_some_and(|c| is_ident_start_char(c) || c == '-'),
            Some(c) => is_ident_start_char(c),
            None => false,
        }
    }

    fn parse_value(&mut self) -> Result<TermValue, ValueError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_string(quote).map(TermValue::String),
            Some('#') => {
                self.pos += 1;
                let hex = self.consume_name();
                Rgba::from_hex(&hex)
                    .map(TermValue::Color)
                    .ok_or_else(|| self.error())
            }
            _ if self.starts_number() => self.parse_numeric(),
            _ if self.starts_ident() => self.parse_ident_like(),
            _ => Err(self.error()),
        }
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn parse_string(&mut self, quote: char) -> Result<String, ValueError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error()),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.error())?;
                    out.push(escaped);
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn parse_numeric(&mut self) -> Result<TermValue, ValueError> {
        let start = self.pos;
        let mut is_integer = true;
        if matches!(self.peek(), Some('+' | '-')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_integer = false;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_digits = match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_digits {
                is_integer = false;
                self.pos += 2;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let number: String = self.chars[start..self.pos].iter().collect();
        let value: f32 = number.parse().map_err(|_| self.error())?;

        if self.peek() == Some('%') {
            self.pos += 1;
            return Ok(TermValue::Percentage(value));
        }
        if self.starts_ident() {
            let unit = self.consume_name();
            return dimension(value, &unit);
        }
        if is_integer {
            if let Ok(integer) = number.trim_start_matches('+').parse::<i64>() {
                return Ok(TermValue::Integer(integer));
            }
        }
        Ok(TermValue::Number(value))
    }

    fn parse_ident_like(&mut self) -> Result<TermValue, ValueError> {
        let name = self.consume_name();
        if self.peek() != Some('(') {
            return Ok(TermValue::Ident(name));
        }
        self.pos += 1;
        // [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
        if name.eq_ignore_ascii_case("url") {
            self.skip_whitespace();
            let url = match self.peek() {
                Some(quote @ ('"' | '\'')) => self.parse_string(quote)?,
                _ => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != ')' && !c.is_whitespace()) {
                        self.pos += 1;
                    }
                    self.chars[start..self.pos].iter().collect()
                }
            };
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return Err(self.error());
            }
            self.pos += 1;
            return Ok(TermValue::Uri(url));
        }
        let args = self.parse_list(Some(')'))?;
        Ok(TermValue::Function { name, args })
    }
}

fn dimension(value: f32, unit: &str) -> Result<TermValue, ValueError> {
    if let Ok(unit) = LengthUnit::from_str(unit) {
        return Ok(TermValue::Length(Dimension { value, unit }));
    }
    if let Ok(unit) = ResolutionUnit::from_str(unit) {
        return Ok(TermValue::Resolution(Dimension { value, unit }));
    }
    if let Ok(unit) = TimeUnit::from_str(unit) {
        return Ok(TermValue::Time(Dimension { value, unit }));
    }
    if let Ok(unit) = AngleUnit::from_str(unit) {
        return Ok(TermValue::Angle(Dimension { value, unit }));
    }
    Err(ValueError::UnknownUnit(unit.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_terms() {
        let terms = parse_terms("1px solid #ff0000").expect("valid");
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0], Term::px(1.0));
        assert_eq!(terms[1], Term::ident("solid").space());
        assert_eq!(terms[2], Term::color(Rgba::rgb(255, 0, 0)).space());
    }

    #[test]
    fn test_parse_operators_and_functions() {
        let terms = parse_terms("url(a.png), rgb(1, 2, 3) / 50%").expect("valid");
        assert_eq!(terms[0], Term::uri("a.png"));
        assert_eq!(terms[1].operator, Some(Operator::Comma));
        assert!(matches!(
            &terms[1].value,
            TermValue::Function { name, args } if name == "rgb" && args.len() == 3
        ));
        assert_eq!(terms[2], Term::percentage(50.0).slash());
    }

    #[test]
    fn test_parse_numbers_and_units() {
        let terms = parse_terms("-2 0.5 3e2 2dppx 1.5s 90deg 'a b'").expect("valid");
        assert_eq!(terms[0].value, TermValue::Integer(-2));
        assert_eq!(terms[1].value, TermValue::Number(0.5));
        assert_eq!(terms[2].value, TermValue::Number(300.0));
        assert!(matches!(terms[3].value, TermValue::Resolution(_)));
        assert!(matches!(terms[4].value, TermValue::Time(_)));
        assert!(matches!(terms[5].value, TermValue::Angle(_)));
        assert_eq!(terms[6].value, TermValue::String("a b".to_string()));
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        assert_eq!(split_top_level("a; b(c; d); 'e;f'", ';'), vec!["a", " b(c; d)", " 'e;f'"]);
        assert_eq!(split_top_level(r#""x\";y";z"#, ';'), vec![r#""x\";y""#, "z"]);
        assert_eq!(split_top_level("", ','), vec![""]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_terms("1px,"), Err(ValueError::Syntax { .. })));
        assert!(matches!(parse_terms("rgb(1, 2"), Err(ValueError::Syntax { .. })));
        assert!(matches!(parse_terms("'open"), Err(ValueError::Syntax { .. })));
        assert_eq!(
            parse_terms("3zz"),
            Err(ValueError::UnknownUnit("zz".to_string()))
        );
    }
}

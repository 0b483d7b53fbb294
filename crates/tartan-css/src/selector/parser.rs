//! Selector text to [`CombinedSelector`].
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
//!
//! "The grammar of Selectors is defined in terms of CSS syntax." We scan the
//! text left to right, collecting simple selectors into the current compound
//! selector and closing it whenever a combinator is found.

use std::str::FromStr;

use super::{
    ArgumentKind, AttributeOperator, AttributeSelector, Combinator, CombinedSelector,
    NthExpression, PseudoArgument, PseudoClass, PseudoClassType, PseudoElementType, Selector,
    SelectorPart,
};
use crate::error::SelectorError;
use crate::values::split_top_level;

/// Parse one selector such as `div > p.note:first-child`.
///
/// # Errors
///
/// Returns a [`SelectorError`] for empty input, unknown pseudo-classes or
/// pseudo-elements, malformed attribute selectors and arguments, and
/// misplaced combinators.
pub fn parse_selector(text: &str) -> Result<CombinedSelector, SelectorError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut scanner = SelectorScanner {
        chars: trimmed.chars().collect(),
        pos: 0,
        selectors: Vec::new(),
        parts: Vec::new(),
        pending: None,
    };
    scanner.run()?;
    CombinedSelector::new(scanner.selectors)
}

/// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)
///
/// Parse a comma-separated selector group such as `h1, h2 > a`.
///
/// # Errors
///
/// Fails when any member fails, or when a member is empty.
pub fn parse_selector_list(text: &str) -> Result<Vec<CombinedSelector>, SelectorError> {
    split_top_level(text, ',').into_iter().map(parse_selector).collect()
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

struct SelectorScanner {
    chars: Vec<char>,
    pos: usize,
    /// Finished compound selectors, leftmost first.
    selectors: Vec<Selector>,
    /// Simple selectors of the compound being built.
    parts: Vec<SelectorPart>,
    /// Combinator waiting for the next compound.
    pending: Option<Combinator>,
}

impl SelectorScanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self) -> SelectorError {
        self.peek().map_or(SelectorError::UnexpectedEnd, |ch| {
            SelectorError::UnexpectedCharacter {
                ch,
                position: self.pos,
            }
        })
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn consume_ident(&mut self) -> String {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        if !self.peek().is_some_and(is_ident_start_char) {
            self.pos = start;
            return String::new();
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Close the compound being built, attaching the pending combinator.
    fn flush_compound(&mut self) -> Result<(), SelectorError> {
        if self.parts.is_empty() {
            return Ok(());
        }
        let combinator = if self.selectors.is_empty() {
            None
        } else {
            Some(self.pending.take().ok_or(SelectorError::MissingCombinator {
                index: self.selectors.len(),
            })?)
        };
        self.selectors.push(Selector {
            combinator,
            parts: std::mem::take(&mut self.parts),
        });
        Ok(())
    }

    fn push_combinator(&mut self, combinator: Combinator) -> Result<(), SelectorError> {
        self.flush_compound()?;
        if self.selectors.is_empty() {
            return Err(SelectorError::LeadingCombinator);
        }
        match self.pending {
            // Whitespace before an explicit combinator is not a descendant
            // combinator.
            None | Some(Combinator::Descendant) => {
                self.pending = Some(combinator);
                Ok(())
            }
            Some(_) => Err(self.unexpected()),
        }
    }

    fn run(&mut self) -> Result<(), SelectorError> {
        while let Some(c) = self.peek() {
            match c {
                // [§ 8.1 Descendant combinator](https://www.w3.org/TR/selectors-3/#descendant-combinators)
                _ if c.is_whitespace() => {
                    self.skip_whitespace();
                    if !self.parts.is_empty() {
                        self.flush_compound()?;
                        self.pending = Some(Combinator::Descendant);
                    }
                }

                // [§ 8.2 Child combinators](https://www.w3.org/TR/selectors-3/#child-combinators)
                // [§ 8.3 Sibling combinators](https://www.w3.org/TR/selectors-3/#sibling-combinators)
                '>' | '+' | '~' => {
                    let combinator = match c {
                        '>' => Combinator::Child,
                        '+' => Combinator::AdjacentSibling,
                        _ => Combinator::PrecedingSibling,
                    };
                    self.push_combinator(combinator)?;
                    self.pos += 1;
                }

                // [§ 6.4 Class selectors](https://www.w3.org/TR/selectors-3/#class-html)
                // "the 'period' (.) notation"
                '.' => {
                    self.pos += 1;
                    let class = self.consume_ident();
                    if class.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.parts.push(SelectorPart::ElementClass(class));
                }

                // [§ 6.5 ID selectors](https://www.w3.org/TR/selectors-3/#id-selectors)
                // "a 'number sign' (U+0023, #) immediately followed by the ID value"
                '#' => {
                    self.pos += 1;
                    let id = self.consume_name();
                    if id.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.parts.push(SelectorPart::ElementId(id));
                }

                // [§ 6.2 Universal selector](https://www.w3.org/TR/selectors-3/#universal-selector)
                // Type and universal selectors must come first in a compound.
                '*' => {
                    if !self.parts.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.pos += 1;
                    self.parts.push(SelectorPart::universal());
                }

                // [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
                '[' => {
                    self.pos += 1;
                    let attribute = self.parse_attribute()?;
                    self.parts.push(SelectorPart::Attribute(attribute));
                }

                // [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
                // [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
                ':' => {
                    self.pos += 1;
                    let part = self.parse_pseudo()?;
                    self.parts.push(part);
                }

                // [§ 6.1 Type selector](https://www.w3.org/TR/selectors-3/#type-selectors)
                _ if is_ident_start_char(c) || c == '-' => {
                    if !self.parts.is_empty() {
                        return Err(self.unexpected());
                    }
                    let name = self.consume_ident();
                    if name.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.parts.push(SelectorPart::ElementName(name));
                }

                _ => return Err(self.unexpected()),
            }
        }
        self.flush_compound()?;
        if self.pending.is_some() {
            return Err(SelectorError::TrailingCombinator);
        }
        Ok(())
    }

    /// Parse the inside of `[...]`; the opening bracket is consumed.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let start = self.pos;
        let invalid = |scanner: &Self| {
            let end = scanner.pos.min(scanner.chars.len());
            SelectorError::InvalidAttribute(scanner.chars[start..end].iter().collect())
        };

        self.skip_whitespace();
        let name = self.consume_ident();
        if name.is_empty() {
            return Err(invalid(self));
        }
        self.skip_whitespace();

        let operator = match self.bump() {
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    operator: AttributeOperator::Exists,
                    value: String::new(),
                    is_string: false,
                });
            }
            Some('=') => AttributeOperator::Equals,
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(invalid(self));
                }
                match op {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::StartsWith,
                    '$' => AttributeOperator::EndsWith,
                    _ => AttributeOperator::Contains,
                }
            }
            _ => return Err(invalid(self)),
        };

        self.skip_whitespace();
        let (value, is_string) = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        None => return Err(invalid(self)),
                        Some(c) if c == quote => break,
                        Some('\\') => {
                            let escaped = self.bump().ok_or_else(|| invalid(self))?;
                            value.push(escaped);
                        }
                        Some(c) => value.push(c),
                    }
                }
                (value, true)
            }
            _ => {
                let value = self.consume_name();
                if value.is_empty() {
                    return Err(invalid(self));
                }
                (value, false)
            }
        };

        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(invalid(self));
        }
        Ok(AttributeSelector {
            name,
            operator,
            value,
            is_string,
        })
    }

    /// Parse a pseudo-class or pseudo-element; the first colon is consumed.
    fn parse_pseudo(&mut self) -> Result<SelectorPart, SelectorError> {
        let double_colon = self.peek() == Some(':');
        if double_colon {
            self.pos += 1;
        }
        let name = self.consume_ident();
        if name.is_empty() {
            return Err(self.unexpected());
        }
        let argument = if self.peek() == Some('(') {
            self.pos += 1;
            Some(self.consume_argument()?)
        } else {
            None
        };

        if double_colon {
            if argument.is_some() {
                return Err(SelectorError::ArgumentMismatch(name));
            }
            return PseudoElementType::from_str(&name)
                .map(SelectorPart::PseudoElement)
                .map_err(|_| SelectorError::UnknownPseudoElement(name));
        }

        let legacy = argument
            .is_none()
            .then(|| PseudoElementType::from_str(&name).ok())
            .flatten()
            .filter(|kind| kind.allows_single_colon());
        if let Some(kind) = legacy {
            return Ok(SelectorPart::PseudoElement(kind));
        }

        let kind = PseudoClassType::from_str(&name)
            .map_err(|_| SelectorError::UnknownPseudoClass(name.clone()))?;
        let pseudo = match (kind.argument_kind(), argument) {
            (ArgumentKind::None, None) => PseudoClass::new(kind),
            (ArgumentKind::None, Some(_)) | (_, None) => {
                return Err(SelectorError::ArgumentMismatch(name));
            }
            (ArgumentKind::Identifier, Some(text)) => {
                let ident = text.trim();
                if ident.is_empty() || !ident.chars().all(|c| is_ident_char(c) || c == '_') {
                    return Err(SelectorError::InvalidArgument {
                        pseudo: name,
                        argument: text,
                    });
                }
                PseudoClass::with_argument(kind, PseudoArgument::Identifier(ident.to_string()))
            }
            (ArgumentKind::Nth, Some(text)) => match parse_nth(&text) {
                Some(expr) => PseudoClass::with_argument(kind, PseudoArgument::Nth(expr)),
                None => {
                    return Err(SelectorError::InvalidArgument {
                        pseudo: name,
                        argument: text,
                    });
                }
            },
            (ArgumentKind::Selector, Some(text)) => {
                let inner = parse_negation_argument(&text).ok_or_else(|| {
                    SelectorError::InvalidArgument {
                        pseudo: name.clone(),
                        argument: text.clone(),
                    }
                })?;
                PseudoClass::with_argument(kind, PseudoArgument::Selector(Box::new(inner)))
            }
        };
        Ok(SelectorPart::PseudoClass(pseudo))
    }

    /// Collect the text up to the matching `)`; the `(` is consumed.
    fn consume_argument(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        let mut depth = 1u32;
        let mut quote: Option<char> = None;
        while let Some(c) = self.bump() {
            match (quote, c) {
                (Some(q), _) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.chars[start..self.pos - 1].iter().collect());
                    }
                }
                _ => {}
            }
        }
        Err(SelectorError::UnexpectedEnd)
    }
}

/// [§ 6.6.7 The negation pseudo-class](https://www.w3.org/TR/selectors-3/#negation)
///
/// The argument is a single compound selector without combinators,
/// pseudo-elements or nested negations.
fn parse_negation_argument(text: &str) -> Option<Selector> {
    let combined = parse_selector(text).ok()?;
    let [selector] = combined.selectors() else {
        return None;
    };
    let nested = selector.parts.iter().any(|part| match part {
        SelectorPart::PseudoElement(_) => true,
        SelectorPart::PseudoClass(pseudo) => pseudo.kind == PseudoClassType::Not,
        _ => false,
    });
    if nested {
        return None;
    }
    Some(selector.clone())
}

/// [§ 6.6.5.2 :nth-child()](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
///
/// Parse `odd`, `even`, `B`, `An`, `An+B`, `-n+B` and friends. Whitespace is
/// allowed around the sign.
fn parse_nth(text: &str) -> Option<NthExpression> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "" => return None,
        "odd" => return Some(NthExpression::ODD),
        "even" => return Some(NthExpression::EVEN),
        _ => {}
    }
    let Some((a_text, b_text)) = compact.split_once('n') else {
        return compact.parse().ok().map(|b| NthExpression { a: 0, b });
    };
    let a = match a_text {
        "" | "+" => 1,
        "-" => -1,
        _ => a_text.parse().ok()?,
    };
    let b = if b_text.is_empty() {
        0
    } else if b_text.starts_with('+') || b_text.starts_with('-') {
        b_text.parse().ok()?
    } else {
        return None;
    };
    Some(NthExpression { a, b })
}

//! Style sheet containers: declarations, rule blocks and sheets.
//!
//! These are the values a CSS parser hands to the cascade. They can be built
//! in code, or deserialized from JSON where selectors, media queries and
//! declaration values may be written as CSS text:
//!
//! ```json
//! { "origin": "author", "rules": [
//!   { "kind": "set", "selectors": "h1, h2", "declarations": [
//!     { "property": "color", "value": "red !important" } ] } ] }
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::error::{SelectorError, ValueError};
use crate::media::{MediaQuery, MediaSpec};
use crate::selector::{CombinedSelector, parse_selector, parse_selector_list};
use crate::values::{Term, parse_terms, split_top_level, terms_to_string};

/// [§ 6.2 Cascading Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
///
/// Ordered by precedence for normal declarations: agent < user < author.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Origin {
    /// "The user agent's default style sheet"
    Agent,
    /// Style sheets supplied by the user.
    User,
    /// "The author specifies style sheets for a source document"
    #[default]
    Author,
}

/// Where a declaration was written, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Style sheet URL, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.url.as_deref().unwrap_or("<inline>"),
            self.line,
            self.column
        )
    }
}

/// [§ 2 Declarations](https://www.w3.org/TR/css-syntax-3/#declaration)
///
/// "a property name and a value, and an important flag".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DeclarationInput")]
pub struct Declaration {
    /// Property name, lowercase.
    pub property: String,
    /// Value terms in source order.
    pub terms: Vec<Term>,
    /// `!important`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
    /// Source position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Deserialize)]
struct DeclarationInput {
    property: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    terms: Option<Vec<Term>>,
    #[serde(default)]
    important: bool,
    #[serde(default)]
    location: Option<SourceLocation>,
}

impl TryFrom<DeclarationInput> for Declaration {
    type Error = ValueError;

    fn try_from(input: DeclarationInput) -> Result<Self, Self::Error> {
        let mut declaration = match (input.value, input.terms) {
            (Some(text), _) => Self::parse(&input.property, &text)?,
            (None, Some(terms)) if !terms.is_empty() => Self::new(&input.property, terms),
            (None, _) => {
                return Err(ValueError::Empty {
                    property: input.property,
                });
            }
        };
        declaration.important |= input.important;
        declaration.location = input.location;
        Ok(declaration)
    }
}

impl Declaration {
    /// A normal declaration.
    #[must_use]
    pub fn new(property: &str, terms: Vec<Term>) -> Self {
        Self {
            property: property.to_ascii_lowercase(),
            terms,
            important: false,
            location: None,
        }
    }

    /// Parse value text. A trailing `!important` sets the flag.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Empty`] when no value remains, or the error from
    /// [`parse_terms`].
    pub fn parse(property: &str, text: &str) -> Result<Self, ValueError> {
        let (value, important) = strip_important(text);
        let terms = parse_terms(value)?;
        if terms.is_empty() {
            return Err(ValueError::Empty {
                property: property.to_ascii_lowercase(),
            });
        }
        let mut declaration = Self::new(property, terms);
        declaration.important = important;
        Ok(declaration)
    }

    /// Mark as `!important`.
    #[must_use]
    pub const fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// [§ 6.4.2 Importance](https://www.w3.org/TR/css-cascade-4/#importance):
/// "a '!' followed by the keyword 'important'", whitespace allowed between.
fn strip_important(text: &str) -> (&str, bool) {
    let trimmed = text.trim_end();
    let split = trimmed.len().saturating_sub("important".len());
    let Some(head) = trimmed.get(..split).filter(|_| {
        trimmed
            .get(split..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case("important"))
    }) else {
        return (text, false);
    };
    match head.trim_end().strip_suffix('!') {
        Some(value) => (value, true),
        None => (text, false),
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, terms_to_string(&self.terms))?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// [§ 5.4.3 Style rules](https://www.w3.org/TR/css-syntax-3/#style-rules):
/// a selector list and a declaration block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Comma-separated selectors; in JSON either a list or one selector-list string.
    #[serde(deserialize_with = "deserialize_selectors")]
    pub selectors: Vec<CombinedSelector>,
    /// Declarations in source order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl RuleSet {
    /// A rule from already built parts.
    #[must_use]
    pub const fn new(selectors: Vec<CombinedSelector>, declarations: Vec<Declaration>) -> Self {
        Self {
            selectors,
            declarations,
        }
    }

    /// A rule from selector-list text.
    ///
    /// # Errors
    ///
    /// Fails when any selector in the list is ill-formed.
    pub fn parse(selectors: &str, declarations: Vec<Declaration>) -> Result<Self, SelectorError> {
        Ok(Self::new(parse_selector_list(selectors)?, declarations))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorListInput {
    Text(String),
    List(Vec<CombinedSelector>),
}

fn deserialize_selectors<'de, D>(deserializer: D) -> Result<Vec<CombinedSelector>, D::Error>
where
    D: Deserializer<'de>,
{
    match SelectorListInput::deserialize(deserializer)? {
        SelectorListInput::Text(text) => {
            parse_selector_list(&text).map_err(serde::de::Error::custom)
        }
        SelectorListInput::List(list) => Ok(list),
    }
}

/// [§ 6 @media](https://www.w3.org/TR/css-conditional-3/#at-media)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMedia {
    /// The media query list; empty means unconditional.
    #[serde(default, deserialize_with = "deserialize_queries")]
    pub queries: Vec<MediaQuery>,
    /// Nested rules.
    #[serde(default)]
    pub rules: Vec<RuleSet>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryListInput {
    Text(String),
    List(Vec<MediaQuery>),
}

fn deserialize_queries<'de, D>(deserializer: D) -> Result<Vec<MediaQuery>, D::Error>
where
    D: Deserializer<'de>,
{
    match QueryListInput::deserialize(deserializer)? {
        QueryListInput::Text(text) => {
            MediaQuery::parse_list(&text).map_err(serde::de::Error::custom)
        }
        QueryListInput::List(list) => Ok(list),
    }
}

impl RuleMedia {
    /// An `@media` block.
    #[must_use]
    pub const fn new(queries: Vec<MediaQuery>, rules: Vec<RuleSet>) -> Self {
        Self { queries, rules }
    }
}

/// [§ 4.1 The @font-face rule](https://www.w3.org/TR/css-fonts-4/#font-face-rule)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleFontFace {
    /// Font descriptors.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// One keyframe block inside `@keyframes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Keyframe selectors: `from`, `to` or percentages.
    pub offsets: Vec<String>,
    /// Declarations for this keyframe.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// [§ 3 Keyframes](https://www.w3.org/TR/css-animations-1/#keyframes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleKeyframes {
    /// Animation name.
    pub name: String,
    /// Keyframe blocks.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

/// [§ 4.2 Page-margin boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MarginArea {
    /// `@top-left-corner`
    TopLeftCorner,
    /// `@top-left`
    TopLeft,
    /// `@top-center`
    TopCenter,
    /// `@top-right`
    TopRight,
    /// `@top-right-corner`
    TopRightCorner,
    /// `@bottom-left-corner`
    BottomLeftCorner,
    /// `@bottom-left`
    BottomLeft,
    /// `@bottom-center`
    BottomCenter,
    /// `@bottom-right`
    BottomRight,
    /// `@bottom-right-corner`
    BottomRightCorner,
    /// `@left-top`
    LeftTop,
    /// `@left-middle`
    LeftMiddle,
    /// `@left-bottom`
    LeftBottom,
    /// `@right-top`
    RightTop,
    /// `@right-middle`
    RightMiddle,
    /// `@right-bottom`
    RightBottom,
}

/// A margin box rule nested in `@page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMargin {
    /// Which margin box.
    pub area: MarginArea,
    /// Its declarations.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// [§ 3 The @page rule](https://www.w3.org/TR/css-page-3/#at-page-rule)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulePage {
    /// Page pseudo-class (`first`, `left`, `right`, `blank`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo: Option<String>,
    /// Page declarations.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Margin boxes.
    #[serde(default)]
    pub margins: Vec<RuleMargin>,
}

/// `@viewport` descriptors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleViewport {
    /// Viewport descriptors.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// One top-level block of a style sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleBlock {
    /// A style rule.
    Set(RuleSet),
    /// `@media`
    Media(RuleMedia),
    /// `@font-face`
    FontFace(RuleFontFace),
    /// `@keyframes`
    Keyframes(RuleKeyframes),
    /// `@page`
    Page(RulePage),
    /// `@viewport`
    Viewport(RuleViewport),
}

impl From<RuleSet> for RuleBlock {
    fn from(rule: RuleSet) -> Self {
        Self::Set(rule)
    }
}

impl From<RuleMedia> for RuleBlock {
    fn from(rule: RuleMedia) -> Self {
        Self::Media(rule)
    }
}

/// A style rule with its position in the sheet's cascade numbering.
#[derive(Debug, Clone, Copy)]
pub struct NumberedRule<'a> {
    /// Rule index: style rules are numbered in document order, including
    /// those nested in `@media`.
    pub index: usize,
    /// The rule.
    pub rule: &'a RuleSet,
}

/// [§ 2 Style sheets](https://www.w3.org/TR/cssom-1/#css-style-sheets)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Cascade origin of every declaration in the sheet.
    #[serde(default)]
    pub origin: Origin,
    /// Where the sheet came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Top-level blocks in source order.
    #[serde(default)]
    pub rules: Vec<RuleBlock>,
}

impl StyleSheet {
    /// An empty sheet.
    #[must_use]
    pub const fn new(origin: Origin) -> Self {
        Self {
            origin,
            url: None,
            rules: Vec::new(),
        }
    }

    /// Append a block.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<RuleBlock>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Append a style rule given as selector text.
    ///
    /// # Errors
    ///
    /// Fails when the selector list is ill-formed.
    pub fn with_rule_text(
        self,
        selectors: &str,
        declarations: Vec<Declaration>,
    ) -> Result<Self, SelectorError> {
        Ok(self.with_rule(RuleSet::parse(selectors, declarations)?))
    }

    /// Every style rule with its cascade number, in document order.
    #[must_use]
    pub fn numbered_rules(&self) -> Vec<(NumberedRule<'_>, Option<&[MediaQuery]>)> {
        let mut numbered = Vec::new();
        for block in &self.rules {
            match block {
                RuleBlock::Set(rule) => numbered.push((
                    NumberedRule {
                        index: numbered.len(),
                        rule,
                    },
                    None,
                )),
                RuleBlock::Media(media) => {
                    for rule in &media.rules {
                        numbered.push((
                            NumberedRule {
                                index: numbered.len(),
                                rule,
                            },
                            Some(media.queries.as_slice()),
                        ));
                    }
                }
                RuleBlock::FontFace(_)
                | RuleBlock::Keyframes(_)
                | RuleBlock::Page(_)
                | RuleBlock::Viewport(_) => {}
            }
        }
        numbered
    }

    /// The style rules that apply under `media`: top-level rules and rules of
    /// matching `@media` blocks. Numbering is unaffected by filtering.
    #[must_use]
    pub fn applicable_rules(&self, media: &MediaSpec) -> Vec<NumberedRule<'_>> {
        self.numbered_rules()
            .into_iter()
            .filter(|(_, queries)| queries.is_none_or(|queries| media.matches_one_of(queries)))
            .map(|(rule, _)| rule)
            .collect()
    }
}

/// Parse a `style` attribute body (`color: red; margin: 0 !important`) into
/// declarations. Semicolons inside strings or parentheses do not end an
/// entry. Entries that fail to parse are skipped.
#[must_use]
pub fn parse_inline_style(text: &str) -> Vec<Declaration> {
    split_top_level(text, ';')
        .into_iter()
        .filter_map(|entry| {
            let (property, value) = entry.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Declaration::parse(property, value).ok()
        })
        .collect()
}

/// Parse one selector into a single-selector rule (test and builder helper).
///
/// # Errors
///
/// Fails when the selector is ill-formed.
pub fn rule(selector: &str, declarations: Vec<Declaration>) -> Result<RuleSet, SelectorError> {
    Ok(RuleSet::new(vec![parse_selector(selector)?], declarations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Rgba, TermValue};

    #[test]
    fn test_declaration_parse_important() {
        let decl = Declaration::parse("COLOR", "red !important").expect("valid");
        assert_eq!(decl.property, "color");
        assert!(decl.important);
        assert_eq!(decl.terms.len(), 1);

        let spaced = Declaration::parse("margin", "0 ! IMPORTANT").expect("valid");
        assert!(spaced.important);
        assert_eq!(spaced.to_string(), "margin: 0 !important");

        let normal = Declaration::parse("font-family", "important").expect("valid");
        assert!(!normal.important);
        assert_eq!(normal.terms[0].as_ident(), Some("important"));
    }

    #[test]
    fn test_declaration_parse_empty() {
        assert_eq!(
            Declaration::parse("color", "  !important"),
            Err(ValueError::Empty {
                property: "color".to_string()
            })
        );
    }

    #[test]
    fn test_inline_style() {
        let decls = parse_inline_style("color: #010203; ; margin:0 !important;bogus");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].terms[0].value, TermValue::Color(Rgba::rgb(1, 2, 3)));
        assert!(decls[1].important);
    }

    #[test]
    fn test_inline_style_keeps_quoted_semicolons() {
        let decls = parse_inline_style(r#"font-family: "a;b", 'c\';d'; color: red"#);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].terms[0].value, TermValue::String("a;b".to_string()));
        assert_eq!(decls[0].terms[1].value, TermValue::String("c';d".to_string()));
        assert_eq!(decls[1].property, "color");

        let decls = parse_inline_style("background-image: url(x;y); margin: 0");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].property, "margin");
    }

    #[test]
    fn test_rule_numbering_includes_nested_media() {
        let sheet = StyleSheet::new(Origin::Author)
            .with_rule(rule("p", vec![]).expect("valid"))
            .with_rule(RuleMedia::new(
                MediaQuery::parse_list("print").expect("valid"),
                vec![rule("a", vec![]).expect("valid"), rule("b", vec![]).expect("valid")],
            ))
            .with_rule(RuleBlock::FontFace(RuleFontFace::default()))
            .with_rule(rule("div", vec![]).expect("valid"));

        let all: Vec<usize> = sheet.numbered_rules().iter().map(|(r, _)| r.index).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);

        let screen: Vec<usize> = sheet
            .applicable_rules(&MediaSpec::new("screen"))
            .iter()
            .map(|r| r.index)
            .collect();
        assert_eq!(screen, vec![0, 3]);
    }

    #[test]
    fn test_sheet_from_json() {
        let json = r#"{
            "origin": "user",
            "rules": [
                { "kind": "set", "selectors": "h1, h2.title",
                  "declarations": [ { "property": "color", "value": "red" } ] },
                { "kind": "media", "queries": "screen and (min-width: 600px), print",
                  "rules": [ {
                      "selectors": ["div > p"],
                      "declarations": [ {
                          "property": "margin",
                          "terms": [ { "value": { "type": "integer", "value": 0 } } ],
                          "important": true
                      } ]
                  } ] },
                { "kind": "page", "pseudo": "first",
                  "margins": [ { "area": "top-center", "declarations": [] } ] }
            ]
        }"#;
        let sheet: StyleSheet = serde_json::from_str(json).expect("valid sheet");
        assert_eq!(sheet.origin, Origin::User);
        assert_eq!(sheet.rules.len(), 3);
        let RuleBlock::Set(first) = &sheet.rules[0] else {
            panic!("expected a rule set");
        };
        assert_eq!(first.selectors.len(), 2);
        assert_eq!(first.selectors[1].to_string(), "h2.title");
        let RuleBlock::Media(media) = &sheet.rules[1] else {
            panic!("expected @media");
        };
        assert_eq!(media.queries.len(), 2);
        assert!(media.rules[0].declarations[0].important);
    }

    #[test]
    fn test_bad_selector_in_json_is_an_error() {
        let json = r#"{ "rules": [ { "kind": "set", "selectors": "> p", "declarations": [] } ] }"#;
        assert!(serde_json::from_str::<StyleSheet>(json).is_err());
    }
}

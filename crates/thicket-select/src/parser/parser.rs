//! Recursive-descent selector parser.
//!
//! ```text
//! selector   := group (',' group)*
//! group      := combinator? seq (combinator seq)*
//! combinator := '>' | '+' | '~' | <whitespace>
//! seq        := type? (hash | class | attribute | pseudo)*
//! type       := ((ident | '*')? '|')? (ident | '*')
//! attribute  := '[' ((ident | '*')? '|')? ident (operator (ident | string))? ']'
//! pseudo     := ':' ident arguments? | '::' ident
//! ```

use core::str::FromStr;

use crate::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::error::{Result, SelectError};
use crate::pseudo::{ArgumentKind, PseudoArgument, PseudoClass, PseudoClassName, PseudoElement};
use crate::selector::{
    AttributeOperator, AttributeTest, Combinator, NamespaceConstraint, Selector, SelectorGroup,
    SimpleSelectorSequence, TypeSelector,
};
use crate::tokenizer::{SelectorToken, SpannedToken, tokenize};
use crate::util::parse_an_b;

/// Builds a [`Selector`] from a token stream.
///
/// Pseudo-class names are resolved here, so an unknown name or a missing
/// required value is reported before any document is touched.
pub struct SelectorParser {
    /// The selector text the tokens came from.
    source: String,
    tokens: Vec<SpannedToken>,
    position: usize,
    /// How many selector arguments enclose this selector.
    depth: usize,
    max_depth: usize,
}

impl SelectorParser {
    /// Create a parser over the tokens of `source`.
    #[must_use]
    pub fn new(source: &str, tokens: Vec<SpannedToken>) -> Self {
        Self {
            source: source.to_string(),
            tokens,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Limit how deeply `:has`, `:not` and `:matches` arguments may nest.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole token stream as a selector list.
    ///
    /// # Errors
    ///
    /// [`SelectError::Syntax`] for grammar errors,
    /// [`SelectError::UnknownPseudoClass`], [`SelectError::UnknownPseudoElement`],
    /// [`SelectError::MissingValue`] and [`SelectError::NestingTooDeep`] as
    /// their names say.
    pub fn parse_selector(&mut self) -> Result<Selector> {
        let mut groups = vec![self.parse_group()?];
        while matches!(self.peek(), SelectorToken::Comma) {
            self.advance();
            groups.push(self.parse_group()?);
        }
        match self.peek() {
            SelectorToken::EOF => Ok(Selector { groups }),
            _ => Err(self.unexpected("',' or end of input")),
        }
    }

    fn parse_group(&mut self) -> Result<SelectorGroup> {
        let mut steps = Vec::new();
        let mut combinator = Combinator::Descendant;
        // Relative selector: `> li`, `+ p`, `~ p`.
        if let SelectorToken::Combinator(leading) = self.peek().clone() {
            self.advance();
            combinator = leading;
        }
        loop {
            let sequence = self.parse_sequence()?;
            steps.push((combinator, sequence));
            match self.peek().clone() {
                SelectorToken::Combinator(next) => {
                    self.advance();
                    combinator = next;
                }
                _ => return Ok(SelectorGroup { steps }),
            }
        }
    }

    fn parse_sequence(&mut self) -> Result<SimpleSelectorSequence> {
        let mut sequence = SimpleSelectorSequence {
            type_selector: self.parse_type_selector()?,
            ..SimpleSelectorSequence::default()
        };

        loop {
            match self.peek().clone() {
                SelectorToken::Hash(id) => {
                    if sequence.id.as_ref().is_some_and(|existing| *existing != id) {
                        return Err(
                            self.error_here("a compound selector cannot require two different ids")
                        );
                    }
                    self.advance();
                    sequence.id = Some(id);
                }
                SelectorToken::Class(class) => {
                    self.advance();
                    sequence.classes.push(class);
                }
                SelectorToken::LeftBracket => {
                    let attribute = self.parse_attribute()?;
                    sequence.attributes.push(attribute);
                }
                SelectorToken::PseudoClass(name) => {
                    self.advance();
                    let pseudo_class = self.parse_pseudo_class(&name)?;
                    sequence.pseudo_classes.push(pseudo_class);
                }
                SelectorToken::PseudoElement(name) => {
                    self.advance();
                    let element = PseudoElement::from_str(&name)
                        .map_err(|_| SelectError::UnknownPseudoElement(name.clone()))?;
                    sequence.pseudo_elements.push(element);
                }
                _ => break,
            }
        }

        if sequence.is_empty() {
            return Err(self.unexpected("a selector"));
        }
        Ok(sequence)
    }

    /// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
    fn parse_type_selector(&mut self) -> Result<Option<TypeSelector>> {
        // Outer `None`: nothing before a `|`. Inner `None`: `*`.
        let leading = match self.peek().clone() {
            SelectorToken::Ident(name) => {
                self.advance();
                Some(Some(name))
            }
            SelectorToken::Star => {
                self.advance();
                Some(None)
            }
            SelectorToken::Pipe => None,
            _ => return Ok(None),
        };

        if !matches!(self.peek(), SelectorToken::Pipe) {
            return Ok(leading.map(|name| TypeSelector {
                namespace: None,
                name,
            }));
        }
        self.advance();
        let namespace = match leading {
            None => NamespaceConstraint::NoNamespace,
            Some(None) => NamespaceConstraint::Any,
            Some(Some(prefix)) => NamespaceConstraint::Prefix(prefix),
        };
        let name = match self.peek().clone() {
            SelectorToken::Ident(name) => Some(name),
            SelectorToken::Star => None,
            _ => return Err(self.unexpected("an element name or '*' after '|'")),
        };
        self.advance();
        Ok(Some(TypeSelector {
            namespace: Some(namespace),
            name,
        }))
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn parse_attribute(&mut self) -> Result<AttributeTest> {
        self.advance(); // [

        let namespace = match self.peek().clone() {
            SelectorToken::Ident(prefix) if matches!(self.peek_at(1), SelectorToken::Pipe) => {
                self.advance();
                self.advance();
                Some(NamespaceConstraint::Prefix(prefix))
            }
            SelectorToken::Star => {
                self.advance();
                self.expect_pipe()?;
                Some(NamespaceConstraint::Any)
            }
            SelectorToken::Pipe => {
                self.advance();
                Some(NamespaceConstraint::NoNamespace)
            }
            _ => None,
        };

        let SelectorToken::Ident(name) = self.peek().clone() else {
            return Err(self.unexpected("an attribute name"));
        };
        self.advance();

        let (value, operator) = match self.peek().clone() {
            SelectorToken::Operator(operator) => {
                self.advance();
                let value = match self.peek().clone() {
                    SelectorToken::String(value) | SelectorToken::Ident(value) => value,
                    _ => return Err(self.unexpected("an attribute value")),
                };
                self.advance();
                (Some(value), operator)
            }
            _ => (None, AttributeOperator::Exactly),
        };

        if !matches!(self.peek(), SelectorToken::RightBracket) {
            return Err(self.unexpected("']'"));
        }
        self.advance();

        Ok(AttributeTest {
            name,
            namespace,
            value,
            operator,
        })
    }

    /// Resolve the pseudo-class name and shape its argument.
    fn parse_pseudo_class(&mut self, name: &str) -> Result<PseudoClass> {
        let pseudo = PseudoClassName::from_str(name)
            .map_err(|_| SelectError::UnknownPseudoClass(name.to_string()))?;

        let raw = match self.peek().clone() {
            SelectorToken::Arguments(raw) => {
                let position = self.current_position();
                self.advance();
                Some((raw, position))
            }
            _ => None,
        };

        let argument = match (pseudo.argument_kind(), raw) {
            (ArgumentKind::None, None) | (ArgumentKind::Ignored, _) => PseudoArgument::None,
            (ArgumentKind::None, Some((_, position))) => {
                return Err(SelectError::syntax(
                    &self.source,
                    position,
                    format!("':{name}' does not take an argument"),
                ));
            }
            (ArgumentKind::Selector, Some((raw, position))) => {
                PseudoArgument::Selector(Box::new(self.parse_nested(name, raw.trim(), position)?))
            }
            (_, None) => return Err(SelectError::MissingValue(name.to_string())),
            (_, Some((raw, _))) if raw.trim().is_empty() => {
                return Err(SelectError::MissingValue(name.to_string()));
            }
            (ArgumentKind::Text, Some((raw, _))) => PseudoArgument::Text(raw.trim().to_string()),
            (ArgumentKind::Nth, Some((raw, _))) => PseudoArgument::Nth(parse_an_b(&raw)),
            (ArgumentKind::Index, Some((raw, position))) => {
                let index = raw.trim().parse::<i64>().map_err(|_| {
                    SelectError::syntax(
                        &self.source,
                        position,
                        format!("':{name}' expects an integer, found '{}'", raw.trim()),
                    )
                })?;
                PseudoArgument::Index(index)
            }
        };

        Ok(PseudoClass {
            name: pseudo,
            argument,
        })
    }

    /// Parse the selector argument of `:has`, `:not` or `:matches`.
    fn parse_nested(&self, name: &str, raw: &str, position: usize) -> Result<Selector> {
        if raw.is_empty() {
            return Err(SelectError::syntax(
                &self.source,
                position,
                format!("':{name}()' has an empty argument"),
            ));
        }
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(SelectError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        let mut nested = Self {
            depth,
            ..Self::new(raw, tokenize(raw)?).with_max_nesting_depth(self.max_depth)
        };
        nested.parse_selector()
    }

    fn expect_pipe(&mut self) -> Result<()> {
        if !matches!(self.peek(), SelectorToken::Pipe) {
            return Err(self.unexpected("'|'"));
        }
        self.advance();
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> SelectError {
        self.error_here(format!("expected {expected}, found {}", self.peek()))
    }

    fn error_here(&self, message: impl Into<String>) -> SelectError {
        SelectError::syntax(&self.source, self.current_position(), message)
    }

    fn current_position(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.position)
    }

    /// Move past the current token. The trailing EOF is never passed.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// The current token; EOF once the stream is exhausted.
    fn peek(&self) -> &SelectorToken {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &SelectorToken {
        self.tokens
            .get(self.position + offset)
            .map_or(&SelectorToken::EOF, |t| &t.token)
    }
}

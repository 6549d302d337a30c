use super::token::{SelectorToken, SpannedToken};
use crate::error::{Result, SelectError};
use crate::selector::{AttributeOperator, Combinator};

/// Selector tokenizer.
///
/// Outside `[...]` whitespace is only kept where it separates two compound
/// selectors, and then as a single [`Combinator::Descendant`]. Inside
/// brackets whitespace is skipped and an unquoted value runs to the next
/// whitespace or `]`.
pub struct SelectorTokenizer {
    /// The selector as written, for error reports.
    source: String,
    /// The input as code points.
    input: Vec<char>,
    /// Current position in the input.
    position: usize,
    /// Collected tokens.
    tokens: Vec<SpannedToken>,
    /// Position of the `[` currently open, if any.
    open_bracket: Option<usize>,
}

impl SelectorTokenizer {
    /// Create a new tokenizer for `input`.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        let source = input.into();
        Self {
            input: source.chars().collect(),
            source,
            position: 0,
            tokens: Vec::new(),
            open_bracket: None,
        }
    }

    /// Tokenize the whole input. The last token is always
    /// [`SelectorToken::EOF`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::Syntax`] on an illegal character or an
    /// unterminated bracket, string or argument list.
    pub fn run(&mut self) -> Result<()> {
        self.skip_whitespace();
        while !self.tokens.last().is_some_and(|t| t.token.is_eof()) {
            if self.open_bracket.is_some() {
                self.consume_attribute_token()?;
            } else {
                self.consume_token()?;
            }
        }
        Ok(())
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<SpannedToken> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    fn consume_token(&mut self) -> Result<()> {
        let start = self.position;
        let Some(c) = self.consume() else {
            self.push(SelectorToken::EOF, start);
            return Ok(());
        };

        match c {
            c if is_whitespace(c) => {
                self.skip_whitespace();
                // Whitespace next to an explicit combinator or a comma, or at
                // the end of input, is not a combinator itself.
                let significant = self.tokens.last().is_some_and(|t| t.token.ends_compound())
                    && !matches!(self.peek(), None | Some('>' | '+' | '~' | ','));
                if significant {
                    self.push(SelectorToken::Combinator(Combinator::Descendant), start);
                }
            }
            '>' => self.push_combinator(Combinator::Child, start),
            '+' => self.push_combinator(Combinator::AdjacentSibling, start),
            '~' => self.push_combinator(Combinator::GeneralSibling, start),
            ',' => {
                self.push(SelectorToken::Comma, start);
                self.skip_whitespace();
            }
            '*' => self.push(SelectorToken::Star, start),
            '|' => self.push(SelectorToken::Pipe, start),
            '#' => {
                let name = self.consume_name();
                if name.is_empty() {
                    return Err(self.error(start, "expected a name after '#'"));
                }
                self.push(SelectorToken::Hash(name), start);
            }
            '.' => {
                let name = self.consume_name();
                if name.is_empty() {
                    return Err(self.error(start, "expected a class name after '.'"));
                }
                self.push(SelectorToken::Class(name), start);
            }
            ':' => self.consume_pseudo(start)?,
            '[' => {
                self.push(SelectorToken::LeftBracket, start);
                self.open_bracket = Some(start);
            }
            c if is_name_code_point(c) || is_valid_escape(c, self.peek()) => {
                self.reconsume();
                let name = self.consume_name();
                self.push(SelectorToken::Ident(name), start);
            }
            other => return Err(self.error(start, format!("unexpected character '{other}'"))),
        }
        Ok(())
    }

    /// `:name`, `:name(arguments)` or `::name`.
    fn consume_pseudo(&mut self, start: usize) -> Result<()> {
        let element = self.peek() == Some(':');
        if element {
            let _ = self.consume();
        }
        let name = self.consume_name();
        if name.is_empty() {
            return Err(self.error(start, "expected a pseudo-class name after ':'"));
        }
        if element {
            self.push(SelectorToken::PseudoElement(name), start);
            return Ok(());
        }
        self.push(SelectorToken::PseudoClass(name), start);
        if self.peek() == Some('(') {
            let open = self.position;
            let _ = self.consume();
            let raw = self.consume_arguments(open)?;
            self.push(SelectorToken::Arguments(raw), open);
        }
        Ok(())
    }

    /// Everything up to the matching `)`, verbatim. Nested parentheses must
    /// balance; quoted strings and escaped characters are copied as they are.
    fn consume_arguments(&mut self, open: usize) -> Result<String> {
        let mut raw = String::new();
        let mut depth = 1_usize;
        let mut quote = None;

        while let Some(c) = self.consume() {
            match (quote, c) {
                (_, '\\') => {
                    raw.push(c);
                    if let Some(escaped) = self.consume() {
                        raw.push(escaped);
                    }
                    continue;
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(raw);
                    }
                }
                (None, _) => {}
            }
            raw.push(c);
        }
        Err(self.error(open, "unterminated pseudo-class argument"))
    }

    /// One token inside `[...]`.
    fn consume_attribute_token(&mut self) -> Result<()> {
        self.skip_whitespace();
        let start = self.position;
        let Some(c) = self.consume() else {
            let open = self.open_bracket.unwrap_or(start);
            return Err(self.error(open, "unterminated attribute selector"));
        };

        match c {
            ']' => {
                self.push(SelectorToken::RightBracket, start);
                self.open_bracket = None;
            }
            '"' | '\'' => {
                let value = self.consume_string(c, start)?;
                self.push(SelectorToken::String(value), start);
            }
            '=' => self.push(SelectorToken::Operator(AttributeOperator::Exactly), start),
            '~' | '|' | '*' | '^' | '$' if self.peek() == Some('=') => {
                let _ = self.consume();
                let operator = match c {
                    '~' => AttributeOperator::ContainsWithSpace,
                    '|' => AttributeOperator::ContainsWithHyphen,
                    '*' => AttributeOperator::ContainsSubstring,
                    '^' => AttributeOperator::BeginsWith,
                    _ => AttributeOperator::EndsWith,
                };
                self.push(SelectorToken::Operator(operator), start);
            }
            '|' => self.push(SelectorToken::Pipe, start),
            '*' => self.push(SelectorToken::Star, start),
            _ if self
                .tokens
                .last()
                .is_some_and(|t| matches!(t.token, SelectorToken::Operator(_))) =>
            {
                self.reconsume();
                let value = self.consume_unquoted_value();
                self.push(SelectorToken::Ident(value), start);
            }
            c if is_name_code_point(c) || is_valid_escape(c, self.peek()) => {
                self.reconsume();
                let name = self.consume_name();
                self.push(SelectorToken::Ident(name), start);
            }
            other => {
                return Err(self.error(
                    start,
                    format!("unexpected character '{other}' in attribute selector"),
                ));
            }
        }
        Ok(())
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string(&mut self, ending: char, start: usize) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(c) if c == ending => return Ok(value),
                // "If the next input code point is a newline, consume it."
                Some('\\') if self.peek() == Some('\n') => {
                    let _ = self.consume();
                }
                Some('\\') => {
                    if let Some(c) = self.consume_escaped_code_point() {
                        value.push(c);
                    }
                }
                Some(c) => value.push(c),
                None => return Err(self.error(start, "unterminated string")),
            }
        }
    }

    fn consume_unquoted_value(&mut self) -> String {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if is_whitespace(c) || c == ']' {
                break;
            }
            let _ = self.consume();
            if is_valid_escape(c, self.peek()) {
                if let Some(escaped) = self.consume_escaped_code_point() {
                    value.push(escaped);
                }
            } else {
                value.push(c);
            }
        }
        value
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Digits may lead, so this also serves `#1st`.
    fn consume_name(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.consume() {
                Some(c) if is_name_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape('\\', self.peek()) => {
                    if let Some(c) = self.consume_escaped_code_point() {
                        result.push(c);
                    }
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Called with the backslash already consumed.
    fn consume_escaped_code_point(&mut self) -> Option<char> {
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 {
                    match self.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            hex.push(d);
                            let _ = self.consume();
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // "If this number is zero, or is for a surrogate, or is greater than the
                // maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER."
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                match char::from_u32(code_point) {
                    Some('\0') | None => Some('\u{FFFD}'),
                    some => some,
                }
            }
            // "EOF": "This is a parse error. Return U+FFFD REPLACEMENT CHARACTER."
            None => Some('\u{FFFD}'),
            // "anything else": "Return the current input code point."
            Some(c) => Some(c),
        }
    }

    fn push_combinator(&mut self, combinator: Combinator, start: usize) {
        self.push(SelectorToken::Combinator(combinator), start);
        self.skip_whitespace();
    }

    fn push(&mut self, token: SelectorToken, position: usize) {
        self.tokens.push(SpannedToken { token, position });
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    fn error(&self, position: usize, message: impl Into<String>) -> SelectError {
        SelectError::syntax(&self.source, position, message)
    }

    /// Consume and return the next character.
    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Peek at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }
}

/// Tokenize `selector` in one call.
///
/// # Errors
///
/// See [`SelectorTokenizer::run`].
pub fn tokenize(selector: &str) -> Result<Vec<SpannedToken>> {
    let mut tokenizer = SelectorTokenizer::new(selector);
    tokenizer.run()?;
    Ok(tokenizer.into_tokens())
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: char, second: Option<char>) -> bool {
    first == '\\' && second != Some('\n')
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
fn is_name_code_point(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

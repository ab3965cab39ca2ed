//! Recursive descent parser for the compact directive grammar.
//!
//! Produces [`TypeInfo`] values for type expressions and [`ParsedSignature`]
//! values for added-function declarations. Failures carry the byte offset of
//! the offending token so directive errors point at the exact spot.

use smol_str::SmolStr;

use crate::codemodel::{ReferenceKind, TypeInfo};

use super::lexer::{Token, TokenKind, is_identifier, tokenize};

/// A directive syntax error with location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for SyntaxError {}

/// A parsed added-function signature.
#[derive(Debug, Clone)]
pub struct ParsedSignature {
    pub name: SmolStr,
    pub return_type: TypeInfo,
    pub parameters: Vec<ParsedParameter>,
    /// Trailing `const` marker for const methods.
    pub is_const: bool,
}

/// One parameter of a parsed signature.
#[derive(Debug, Clone)]
pub struct ParsedParameter {
    pub name: Option<SmolStr>,
    pub ty: TypeInfo,
    pub default_value: Option<String>,
}

/// Parse a type expression, e.g. `const ns::Vec<int> *`.
pub fn parse_type(input: &str) -> Result<TypeInfo, SyntaxError> {
    let tokens = tokenize(input);
    let mut parser = Parser::new(input, &tokens);
    let ty = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(ty)
}

/// Parse an added-function signature, e.g.
/// `int clamp(int value, int lo = 0, int hi = 100)`.
pub fn parse_signature(input: &str) -> Result<ParsedSignature, SyntaxError> {
    let tokens = tokenize(input);
    let mut parser = Parser::new(input, &tokens);
    let signature = parser.parse_signature()?;
    parser.expect_eof()?;
    Ok(signature)
}

/// The parser state.
struct Parser<'a> {
    input: &'a str,
    tokens: &'a [Token<'a>],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [Token<'a>]) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn at_const(&self) -> bool {
        self.current().is_some_and(TokenKind::is_const_keyword)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'a>, SyntaxError> {
        match self.current() {
            Some(&token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn expect_eof(&self) -> Result<(), SyntaxError> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.error_here("unexpected trailing input".to_string()))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let offset = self
            .current()
            .map(|t| t.start)
            .unwrap_or(self.input.len());
        SyntaxError::new(message, offset)
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// type := CONST? segment ('::' segment)* ('<' type (',' type)* '>')? suffix*
    fn parse_type(&mut self) -> Result<TypeInfo, SyntaxError> {
        let mut is_const = false;
        if self.at_const() {
            self.pos += 1;
            is_const = true;
        }

        let mut segments: Vec<SmolStr> = Vec::new();
        let first = self.expect(TokenKind::Ident, "a type name")?;
        segments.push(SmolStr::new(first.text));
        while self.at(TokenKind::PathSep) {
            self.pos += 1;
            let segment = self.expect(TokenKind::Ident, "a name after '::'")?;
            segments.push(SmolStr::new(segment.text));
        }

        // Multi-word builtins: `unsigned int`, `long long`, `signed char`, ...
        self.absorb_builtin_words(&mut segments);

        let mut ty = TypeInfo::from_segments(segments);
        ty.is_const = is_const;

        if self.eat(TokenKind::Lt) {
            let mut arguments = vec![self.parse_type()?];
            while self.eat(TokenKind::Comma) {
                arguments.push(self.parse_type()?);
            }
            self.expect(TokenKind::Gt, "'>' to close template arguments")?;
            ty = ty.with_arguments(arguments);
        }

        loop {
            if self.eat(TokenKind::Star) {
                ty.indirections += 1;
            } else if self.eat(TokenKind::Amp) {
                ty.reference = ReferenceKind::LValue;
            } else if self.eat(TokenKind::AmpAmp) {
                ty.reference = ReferenceKind::RValue;
            } else if self.at_const() {
                self.pos += 1;
                ty.is_const = true;
            } else if self.eat(TokenKind::LBracket) {
                if self.at(TokenKind::Integer) {
                    let token = self.expect(TokenKind::Integer, "an array dimension")?;
                    let dim = token.text.parse::<usize>().map_err(|_| {
                        SyntaxError::new("array dimension out of range", token.start)
                    })?;
                    ty = ty.with_array_dim(Some(dim));
                } else {
                    ty = ty.with_array_dim(None);
                }
                self.expect(TokenKind::RBracket, "']' to close array dimension")?;
            } else {
                break;
            }
        }

        Ok(ty)
    }

    /// Glue multi-word builtin type names into a single segment.
    fn absorb_builtin_words(&mut self, segments: &mut Vec<SmolStr>) {
        const FIRST_WORDS: &[&str] = &["unsigned", "signed", "long", "short"];
        const NEXT_WORDS: &[&str] = &["char", "short", "int", "long", "double"];
        if segments.len() != 1 || !FIRST_WORDS.contains(&segments[0].as_str()) {
            return;
        }
        let mut joined = segments[0].to_string();
        while let Some(token) = self.current() {
            if token.kind == TokenKind::Ident && NEXT_WORDS.contains(&token.text) {
                joined.push(' ');
                joined.push_str(token.text);
                self.pos += 1;
            } else {
                break;
            }
        }
        segments[0] = SmolStr::new(&joined);
    }

    /// signature := type ident '(' params? ')' CONST?
    fn parse_signature(&mut self) -> Result<ParsedSignature, SyntaxError> {
        let return_type = self.parse_type()?;
        let name_token = self.expect(TokenKind::Ident, "a function name")?;
        if !is_identifier(name_token.text) {
            return Err(SyntaxError::new(
                format!("'{}' is not a valid function name", name_token.text),
                name_token.start,
            ));
        }
        let name = SmolStr::new(name_token.text);

        self.expect(TokenKind::LParen, "'(' to open the parameter list")?;
        let mut parameters = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                parameters.push(self.parse_parameter()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' to close the parameter list")?;

        let mut is_const = false;
        if self.at_const() {
            self.pos += 1;
            is_const = true;
        }

        Ok(ParsedSignature {
            name,
            return_type,
            parameters,
            is_const,
        })
    }

    /// param := type ident? ('=' default-expr)?
    fn parse_parameter(&mut self) -> Result<ParsedParameter, SyntaxError> {
        let ty = self.parse_type()?;
        let name = if self.at(TokenKind::Ident) && !self.at_const() {
            let token = self.expect(TokenKind::Ident, "a parameter name")?;
            Some(SmolStr::new(token.text))
        } else {
            None
        };
        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_default_expression()?)
        } else {
            None
        };
        Ok(ParsedParameter {
            name,
            ty,
            default_value,
        })
    }

    /// default-expr := balanced token run up to ',' or ')' at depth 0
    ///
    /// The expression text is sliced verbatim from the input so the
    /// normalization pass can reproduce it later.
    fn parse_default_expression(&mut self) -> Result<String, SyntaxError> {
        let start = match self.current() {
            Some(token) => token.start,
            None => return Err(self.error_here("expected a default value")),
        };
        let mut depth = 0usize;
        let mut end = start;
        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Comma if depth == 0 => break,
                TokenKind::Error => {
                    return Err(SyntaxError::new(
                        format!("unexpected character '{}' in default value", token.text),
                        token.start,
                    ));
                }
                _ => {}
            }
            end = token.end;
            self.pos += 1;
        }
        if end == start {
            return Err(SyntaxError::new("empty default value", start));
        }
        Ok(self.input[start..end].trim().to_string())
    }
}

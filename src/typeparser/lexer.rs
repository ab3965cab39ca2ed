//! Logos-based lexer for the compact directive grammar.
//!
//! Tokenizes type expressions (`const ns::Vec<int> &`) and added-function
//! signatures (`int clamp(int value, int lo = 0)`).

use logos::Logos;

/// A token with its kind, text and byte offset into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Tokenize an entire directive string.
///
/// Characters the grammar does not know become [`TokenKind::Error`] tokens;
/// the parser reports them as directive syntax errors.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(TokenKind::Error);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            start: span.start,
            end: span.end,
        });
    }
    tokens
}

/// Token kinds of the directive grammar.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]*\.[0-9]+")]
    Decimal,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // =========================================================================
    // PUNCTUATION (multi-character first)
    // =========================================================================
    #[token("::")]
    PathSep,

    #[token("&&")]
    AmpAmp,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(",")]
    Comma,

    #[token("*")]
    Star,

    #[token("&")]
    Amp,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("=")]
    Eq,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token(".")]
    Dot,

    /// Anything the grammar does not know. The catch-all loses every
    /// tie, so it only fires on characters no other pattern covers.
    #[regex(r"[^\s]", priority = 0)]
    Error,
}

impl TokenKind {
    /// Keyword check on top of the `Ident` token.
    pub fn is_const_keyword(token: &Token<'_>) -> bool {
        token.kind == TokenKind::Ident && token.text == "const"
    }
}

/// Whether a string is a valid identifier for directive-supplied names
/// (added-function names, typedef aliases).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| unicode_ident::is_xid_continue(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_type_expression() {
        let tokens = tokenize("const ns::Vec<int> &");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident, // const
                TokenKind::Ident, // ns
                TokenKind::PathSep,
                TokenKind::Ident, // Vec
                TokenKind::Lt,
                TokenKind::Ident, // int
                TokenKind::Gt,
                TokenKind::Amp,
            ]
        );
    }

    #[test]
    fn test_nested_template_close_is_two_tokens() {
        let tokens = tokenize("Map<str, Vec<int>>");
        let gts = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Gt)
            .count();
        assert_eq!(gts, 2);
    }

    #[test]
    fn test_const_is_plain_ident_token() {
        let tokens = tokenize("const constant");
        assert!(TokenKind::is_const_keyword(&tokens[0]));
        assert!(!TokenKind::is_const_keyword(&tokens[1]));
    }

    #[test]
    fn test_unknown_character_becomes_error() {
        let tokens = tokenize("int $");
        assert_eq!(tokens[1].kind, TokenKind::Error);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("clamp"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a b"));
    }
}

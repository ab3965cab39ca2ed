//! Type parser — the compact grammar used by directives.
//!
//! Directives carry textual type expressions (directive typedefs, injected
//! signatures) that are not part of the parsed code model. This module lexes
//! and parses them:
//!
//! ```text
//! type        := CONST? segment ('::' segment)* suffix*
//! segment     := ident ('<' type (',' type)* '>')?
//! suffix      := '*' | '&' | '&&' | CONST | '[' integer? ']'
//! signature   := type ident '(' params? ')' CONST?
//! param       := type ident? ('=' default-expr)?
//! ```
//!
//! Failures are reported as directive syntax errors with a byte offset,
//! distinctly from parse-time rejections.

mod lexer;
mod parser;

pub use lexer::{Token, TokenKind, is_identifier, tokenize};
pub use parser::{ParsedParameter, ParsedSignature, SyntaxError, parse_signature, parse_type};

//! LaTeX parser: logos lexer and recursive-descent grammar.
//!
//! The rest of the crate treats this as the parser collaborator: it turns
//! text into an [`Ast`](crate::syntax::ast::Ast) or a [`ParseError`].

mod errors;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use errors::ParseError;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{MATH_ENVIRONMENTS, parse, parse_fragment_into};

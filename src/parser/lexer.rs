//! Logos-based lexer for LaTeX
//!
//! Fast tokenization using the logos crate. Nothing is skipped: whitespace,
//! newlines and comments are tokens so every byte of the input is covered.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }

    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = token.unwrap_or(TokenKind::Error);

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// LaTeX token kinds
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"%[^\n]*")]
    Comment,

    // =========================================================================
    // COMMANDS
    // =========================================================================
    /// `\name` or `\name*`
    #[regex(r"\\[a-zA-Z@]+\*?")]
    Command,

    /// `\\`, the line break command
    #[token(r"\\")]
    LineBreak,

    /// `\%`, `\{`, `\&`, ...; never `\\` or a math delimiter
    #[regex(r"\\[^a-zA-Z@\r\n\\()\[\]]")]
    EscapedChar,

    // =========================================================================
    // MATH DELIMITERS
    // =========================================================================
    #[token("$$")]
    DoubleDollar,

    #[token("$")]
    Dollar,

    #[token(r"\(")]
    InlineMathOpen,

    #[token(r"\)")]
    InlineMathClose,

    #[token(r"\[")]
    DisplayMathOpen,

    #[token(r"\]")]
    DisplayMathClose,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("&")]
    Ampersand,

    #[token("~")]
    Tilde,

    // =========================================================================
    // TEXT
    // =========================================================================
    #[regex(r"[^\\{}\[\]$%&~ \t\r\n]+")]
    Text,

    /// Produced for input logos cannot match (e.g. a lone trailing backslash)
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline | Self::Comment)
    }

    pub fn is_space(self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline)
    }
}

//! Recursive-descent LaTeX parser.
//!
//! Builds [`Ast`] nodes directly into an arena. The grammar is deliberately
//! small: it recognises the structure visualisations anchor to (commands and
//! their parameter blocks, environments, math, groups) and keeps everything
//! else as text, whitespace, comments and special symbols.

use smol_str::SmolStr;
use text_size::TextSize;

use super::errors::ParseError;
use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{LineIndex, SourceFilePosition, SourceFileRange};
use crate::syntax::ast::*;

/// Environments whose body is kept as raw math source.
pub const MATH_ENVIRONMENTS: &[&str] = &[
    "equation",
    "equation*",
    "align",
    "align*",
    "alignat",
    "alignat*",
    "flalign",
    "flalign*",
    "gather",
    "gather*",
    "multline",
    "multline*",
    "eqnarray",
    "eqnarray*",
    "displaymath",
    "math",
];

/// Parse a whole document.
pub fn parse(text: &str) -> Result<Ast, ParseError> {
    let index = LineIndex::new(text);
    let end = index.position(text, TextSize::of(text));
    let mut ast = Ast::new(
        AstNodeKind::Latex(LatexNode),
        SourceFileRange::spanning(SourceFilePosition::new(0, 0), end),
    );
    let children = Parser::new(text, index, &mut ast).parse_content(Stop::Eof)?;
    ast.attach_to_root(children);
    Ok(ast)
}

/// Parse `text` as if it started at `origin` and allocate the resulting
/// nodes, detached, into `ast`.
///
/// Returns the top-level nodes of the fragment in document order.
pub fn parse_fragment_into(
    ast: &mut Ast,
    text: &str,
    origin: SourceFilePosition,
) -> Result<Vec<NodeId>, ParseError> {
    let index = LineIndex::with_origin(text, origin.line(), origin.column());
    Parser::new(text, index, ast).parse_content(Stop::Eof)
}

/// What ends the content currently being parsed.
#[derive(Debug, Clone, Copy)]
enum Stop {
    Eof,
    /// A `}` closing a group or curly block opened at the given offset.
    Brace(TextSize),
    /// `\end{...}` closing an environment opened at the given offset.
    End(TextSize),
}

struct Parser<'t, 'a> {
    text: &'t str,
    tokens: Vec<Token<'t>>,
    pos: usize,
    index: LineIndex,
    ast: &'a mut Ast,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(text: &'t str, index: LineIndex, ast: &'a mut Ast) -> Self {
        Self {
            text,
            tokens: tokenize(text),
            pos: 0,
            index,
            ast,
        }
    }

    // =========================================================================
    // TOKEN CURSOR
    // =========================================================================

    fn peek(&self) -> Option<Token<'t>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'t>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn position(&self, offset: TextSize) -> SourceFilePosition {
        self.index.position(self.text, offset)
    }

    fn range(&self, start: TextSize, end: TextSize) -> SourceFileRange {
        SourceFileRange::spanning(self.position(start), self.position(end))
    }

    fn end_of_input(&self) -> TextSize {
        TextSize::of(self.text)
    }

    fn slice(&self, start: TextSize, end: TextSize) -> &'t str {
        &self.text[usize::from(start)..usize::from(end)]
    }

    fn alloc(&mut self, kind: AstNodeKind, start: TextSize, end: TextSize, children: Vec<NodeId>) -> NodeId {
        let range = self.range(start, end);
        self.ast.alloc(kind, range, children)
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    fn parse_content(&mut self, stop: Stop) -> Result<Vec<NodeId>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return match stop {
                    Stop::Eof => Ok(nodes),
                    Stop::Brace(open) => Err(ParseError::Unclosed {
                        what: "group",
                        at: self.position(open),
                    }),
                    Stop::End(open) => Err(ParseError::Unclosed {
                        what: "environment",
                        at: self.position(open),
                    }),
                };
            };

            let node = match token.kind {
                TokenKind::RBrace => {
                    if matches!(stop, Stop::Brace(_)) {
                        return Ok(nodes);
                    }
                    return Err(self.unexpected(token));
                }
                TokenKind::Command if token.text == "\\end" => {
                    if matches!(stop, Stop::End(_)) {
                        return Ok(nodes);
                    }
                    return Err(self.unexpected(token));
                }
                TokenKind::Command if token.text == "\\begin" => self.parse_environment()?,
                TokenKind::Command => self.parse_command()?,
                TokenKind::Whitespace | TokenKind::Newline => self.parse_whitespace(),
                TokenKind::Comment => {
                    self.bump();
                    let content = token.text[1..].to_string();
                    self.alloc(AstNodeKind::Comment(CommentNode { content }), token.offset, token.end(), Vec::new())
                }
                TokenKind::LBrace => self.parse_group()?,
                TokenKind::Dollar
                | TokenKind::DoubleDollar
                | TokenKind::InlineMathOpen
                | TokenKind::DisplayMathOpen => self.parse_math()?,
                TokenKind::InlineMathClose | TokenKind::DisplayMathClose => {
                    return Err(self.unexpected(token));
                }
                TokenKind::Ampersand
                | TokenKind::Tilde
                | TokenKind::LineBreak
                | TokenKind::EscapedChar => {
                    self.bump();
                    let symbol = SmolStr::new(token.text);
                    self.alloc(
                        AstNodeKind::SpecialSymbol(SpecialSymbolNode { symbol }),
                        token.offset,
                        token.end(),
                        Vec::new(),
                    )
                }
                TokenKind::Text | TokenKind::LBracket | TokenKind::RBracket | TokenKind::Error => {
                    self.bump();
                    let content = token.text.to_string();
                    self.alloc(AstNodeKind::Text(TextNode { content }), token.offset, token.end(), Vec::new())
                }
            };
            nodes.push(node);
        }
    }

    fn unexpected(&self, token: Token<'_>) -> ParseError {
        ParseError::Unexpected {
            token: token.text.to_string(),
            at: self.position(token.offset),
        }
    }

    fn parse_whitespace(&mut self) -> NodeId {
        let start = self.peek().map(|t| t.offset).unwrap_or_else(|| self.end_of_input());
        let mut end = start;
        let mut newlines = 0;
        while let Some(token) = self.peek().filter(|t| t.kind.is_space()) {
            if token.kind == TokenKind::Newline {
                newlines += 1;
            }
            end = token.end();
            self.bump();
        }
        self.alloc(AstNodeKind::Whitespace(WhitespaceNode { newlines }), start, end, Vec::new())
    }

    fn parse_group(&mut self) -> Result<NodeId, ParseError> {
        let (children, start, end) = self.parse_braced()?;
        Ok(self.alloc(AstNodeKind::Group(GroupNode), start, end, children))
    }

    /// `{ content }`, returning the content nodes and the outer offsets.
    fn parse_braced(&mut self) -> Result<(Vec<NodeId>, TextSize, TextSize), ParseError> {
        let Some(open) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "group",
                at: self.position(self.end_of_input()),
            });
        };
        let children = self.parse_content(Stop::Brace(open.offset))?;
        match self.bump() {
            Some(close) if close.kind == TokenKind::RBrace => Ok((children, open.offset, close.end())),
            _ => Err(ParseError::Unclosed {
                what: "group",
                at: self.position(open.offset),
            }),
        }
    }

    // =========================================================================
    // COMMANDS AND PARAMETERS
    // =========================================================================

    fn parse_command(&mut self) -> Result<NodeId, ParseError> {
        let Some(token) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "command",
                at: self.position(self.end_of_input()),
            });
        };
        let name = SmolStr::new(&token.text[1..]);
        let (blocks, end) = self.parse_parameter_blocks(token.end())?;
        Ok(self.alloc(AstNodeKind::Command(CommandNode { name }), token.offset, end, blocks))
    }

    /// Parameter blocks directly adjacent to the preceding token.
    fn parse_parameter_blocks(&mut self, mut end: TextSize) -> Result<(Vec<NodeId>, TextSize), ParseError> {
        let mut blocks = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBrace) => {
                    let (children, start, block_end) = self.parse_braced()?;
                    blocks.push(self.alloc(
                        AstNodeKind::CurlyBracesParameterBlock(CurlyBracesParameterBlockNode),
                        start,
                        block_end,
                        children,
                    ));
                    end = block_end;
                }
                Some(TokenKind::LBracket) => {
                    let (block, block_end) = self.parse_square_block()?;
                    blocks.push(block);
                    end = block_end;
                }
                _ => return Ok((blocks, end)),
            }
        }
    }

    /// `[ items ]`, split into a parameter list on top-level commas.
    fn parse_square_block(&mut self) -> Result<(NodeId, TextSize), ParseError> {
        let Some(open) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "parameter block",
                at: self.position(self.end_of_input()),
            });
        };
        let mut depth = 0usize;
        let close = loop {
            let Some(token) = self.bump() else {
                return Err(ParseError::Unclosed {
                    what: "parameter block",
                    at: self.position(open.offset),
                });
            };
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::RBracket if depth == 0 => break token,
                _ => {}
            }
        };

        let inner_start = open.end();
        let inner_end = close.offset;
        let items = self.parse_parameter_items(inner_start, inner_end);
        let list = self.alloc(
            AstNodeKind::ParameterList(ParameterListNode),
            inner_start,
            inner_end,
            items,
        );
        let block = self.alloc(
            AstNodeKind::SquareBracesParameterBlock(SquareBracesParameterBlockNode),
            open.offset,
            close.end(),
            vec![list],
        );
        Ok((block, close.end()))
    }

    fn parse_parameter_items(&mut self, start: TextSize, end: TextSize) -> Vec<NodeId> {
        let raw = self.slice(start, end);
        let base = usize::from(start);
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut item_start = 0;

        let mut boundaries: Vec<(usize, usize)> = Vec::new();
        for (i, c) in raw.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    boundaries.push((item_start, i));
                    item_start = i + 1;
                }
                _ => {}
            }
        }
        boundaries.push((item_start, raw.len()));

        for (from, to) in boundaries {
            let item = &raw[from..to];
            let trimmed = item.trim();
            if trimmed.is_empty() {
                continue;
            }
            let leading = item.len() - item.trim_start().len();
            let item_from = base + from + leading;
            let item_to = item_from + trimmed.len();
            let kind = match split_assignment(trimmed) {
                Some((key, value)) => AstNodeKind::ParameterAssignment(ParameterAssignmentNode {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                None => AstNodeKind::Parameter(ParameterNode {
                    value: trimmed.to_string(),
                }),
            };
            items.push(self.alloc(
                kind,
                TextSize::new(item_from as u32),
                TextSize::new(item_to as u32),
                Vec::new(),
            ));
        }
        items
    }

    // =========================================================================
    // ENVIRONMENTS
    // =========================================================================

    /// Reads `{name}` after `\begin` or `\end`, returning the name and the
    /// offset just past the closing brace.
    fn parse_environment_name(&mut self, command: &'static str, at: TextSize) -> Result<(&'t str, TextSize), ParseError> {
        if self.peek_kind() != Some(TokenKind::LBrace) {
            return Err(ParseError::MissingEnvironmentName {
                command,
                at: self.position(at),
            });
        }
        let Some(open) = self.bump() else {
            return Err(ParseError::MissingEnvironmentName {
                command,
                at: self.position(at),
            });
        };
        loop {
            match self.bump() {
                Some(token) if token.kind == TokenKind::RBrace => {
                    let name = self.slice(open.end(), token.offset).trim();
                    return Ok((name, token.end()));
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::Unclosed {
                        what: "environment name",
                        at: self.position(open.offset),
                    });
                }
            }
        }
    }

    fn parse_environment(&mut self) -> Result<NodeId, ParseError> {
        let Some(begin) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "environment",
                at: self.position(self.end_of_input()),
            });
        };
        let (name, after_name) = self.parse_environment_name("begin", begin.offset)?;

        if MATH_ENVIRONMENTS.contains(&name) {
            return self.parse_math_environment(begin.offset, name, after_name);
        }

        let (parameters, _) = self.parse_parameter_blocks(after_name)?;
        let parameter_count = parameters.len();
        let body = self.parse_content(Stop::End(begin.offset))?;

        let Some(end) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "environment",
                at: self.position(begin.offset),
            });
        };
        let (end_name, end_offset) = self.parse_environment_name("end", end.offset)?;
        if end_name != name {
            return Err(ParseError::MismatchedEnvironment {
                expected: name.to_string(),
                found: end_name.to_string(),
                at: self.position(end.offset),
            });
        }

        let mut children = parameters;
        children.extend(body);
        Ok(self.alloc(
            AstNodeKind::Environment(EnvironmentNode {
                name: SmolStr::new(name),
                parameter_count,
            }),
            begin.offset,
            end_offset,
            children,
        ))
    }

    fn parse_math_environment(&mut self, start: TextSize, name: &'t str, content_start: TextSize) -> Result<NodeId, ParseError> {
        loop {
            let Some(token) = self.bump() else {
                return Err(ParseError::Unclosed {
                    what: "math environment",
                    at: self.position(start),
                });
            };
            if token.kind != TokenKind::Command || token.text != "\\end" {
                continue;
            }
            let checkpoint = self.pos;
            match self.parse_environment_name("end", token.offset) {
                Ok((end_name, end_offset)) if end_name == name => {
                    let content = self.slice(content_start, token.offset).to_string();
                    return Ok(self.alloc(
                        AstNodeKind::Math(MathNode {
                            delimiter: MathDelimiter::Environment(SmolStr::new(name)),
                            content,
                        }),
                        start,
                        end_offset,
                        Vec::new(),
                    ));
                }
                // A nested \end{...} inside the math body, e.g. \end{cases}
                _ => self.pos = checkpoint,
            }
        }
    }

    // =========================================================================
    // MATH
    // =========================================================================

    fn parse_math(&mut self) -> Result<NodeId, ParseError> {
        let Some(open) = self.bump() else {
            return Err(ParseError::Unclosed {
                what: "math",
                at: self.position(self.end_of_input()),
            });
        };
        let (closing, delimiter) = match open.kind {
            TokenKind::Dollar => (TokenKind::Dollar, MathDelimiter::Dollar),
            TokenKind::DoubleDollar => (TokenKind::DoubleDollar, MathDelimiter::DoubleDollar),
            TokenKind::InlineMathOpen => (TokenKind::InlineMathClose, MathDelimiter::Parenthesis),
            _ => (TokenKind::DisplayMathClose, MathDelimiter::Bracket),
        };
        loop {
            match self.bump() {
                Some(token) if token.kind == closing => {
                    let content = self.slice(open.end(), token.offset).to_string();
                    return Ok(self.alloc(
                        AstNodeKind::Math(MathNode { delimiter, content }),
                        open.offset,
                        token.end(),
                        Vec::new(),
                    ));
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::Unclosed {
                        what: "math",
                        at: self.position(open.offset),
                    });
                }
            }
        }
    }
}

/// Split `key=value` on the first top-level `=`.
fn split_assignment(item: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in item.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some((item[..i].trim(), item[i + 1..].trim())),
            _ => {}
        }
    }
    None
}

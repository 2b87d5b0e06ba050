//! Concrete node kinds.
//!
//! The set of kinds is closed: it follows the LaTeX grammar, and every
//! visitor implements one method per kind.

use std::fmt;

use smol_str::SmolStr;

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatexNode;

/// A run of text without spaces or special characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub content: String,
}

/// Spaces, tabs and newlines between other nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceNode {
    pub newlines: usize,
}

/// A `%` comment, without the leading `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub content: String,
}

/// `&`, `~`, `\\` and escaped characters such as `\%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialSymbolNode {
    pub symbol: SmolStr,
}

/// `\name` followed by its adjacent parameter blocks (the node's children).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub name: SmolStr,
}

/// `\begin{name} ... \end{name}`.
///
/// The first `parameter_count` children are the parameter blocks following
/// `\begin{name}`; the remaining children form the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentNode {
    pub name: SmolStr,
    pub parameter_count: usize,
}

/// A standalone `{ ... }` group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathDelimiter {
    /// `$ ... $`
    Dollar,
    /// `$$ ... $$`
    DoubleDollar,
    /// `\( ... \)`
    Parenthesis,
    /// `\[ ... \]`
    Bracket,
    /// `\begin{equation} ... \end{equation}` and friends
    Environment(SmolStr),
}

/// Math content, kept as raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathNode {
    pub delimiter: MathDelimiter,
    pub content: String,
}

impl MathNode {
    pub fn is_display(&self) -> bool {
        !matches!(self.delimiter, MathDelimiter::Dollar | MathDelimiter::Parenthesis)
    }
}

/// `{ ... }` directly following a command or `\begin{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurlyBracesParameterBlockNode;

/// `[ ... ]` directly following a command or `\begin{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquareBracesParameterBlockNode;

/// Comma-separated content of a square parameter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterListNode;

/// A single value in a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNode {
    pub value: String,
}

/// `key=value` in a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAssignmentNode {
    pub key: String,
    pub value: String,
}

/// Discriminant plus kind-specific data of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNodeKind {
    Latex(LatexNode),
    Text(TextNode),
    Whitespace(WhitespaceNode),
    Comment(CommentNode),
    SpecialSymbol(SpecialSymbolNode),
    Command(CommandNode),
    Environment(EnvironmentNode),
    Group(GroupNode),
    Math(MathNode),
    CurlyBracesParameterBlock(CurlyBracesParameterBlockNode),
    SquareBracesParameterBlock(SquareBracesParameterBlockNode),
    ParameterList(ParameterListNode),
    Parameter(ParameterNode),
    ParameterAssignment(ParameterAssignmentNode),
}

impl AstNodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Latex(_) => "latex",
            Self::Text(_) => "text",
            Self::Whitespace(_) => "whitespace",
            Self::Comment(_) => "comment",
            Self::SpecialSymbol(_) => "special-symbol",
            Self::Command(_) => "command",
            Self::Environment(_) => "environment",
            Self::Group(_) => "group",
            Self::Math(_) => "math",
            Self::CurlyBracesParameterBlock(_) => "curly-braces-parameter-block",
            Self::SquareBracesParameterBlock(_) => "square-braces-parameter-block",
            Self::ParameterList(_) => "parameter-list",
            Self::Parameter(_) => "parameter",
            Self::ParameterAssignment(_) => "parameter-assignment",
        }
    }

    pub fn as_command(&self) -> Option<&CommandNode> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn as_environment(&self) -> Option<&EnvironmentNode> {
        match self {
            Self::Environment(environment) => Some(environment),
            _ => None,
        }
    }

    pub fn as_math(&self) -> Option<&MathNode> {
        match self {
            Self::Math(math) => Some(math),
            _ => None,
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace(_) | Self::Comment(_))
    }
}

/// Short, unambiguous description for diagnostics. Not meant to be parsed back.
impl fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "text {:?}", text.content),
            Self::Whitespace(ws) => write!(f, "whitespace ({} newlines)", ws.newlines),
            Self::Comment(comment) => write!(f, "comment {:?}", comment.content),
            Self::SpecialSymbol(symbol) => write!(f, "special-symbol {}", symbol.symbol),
            Self::Command(command) => write!(f, "command \\{}", command.name),
            Self::Environment(env) => write!(f, "environment {}", env.name),
            Self::Math(math) => match &math.delimiter {
                MathDelimiter::Environment(name) => write!(f, "math ({name})"),
                delimiter => write!(f, "math ({delimiter:?})"),
            },
            Self::Parameter(parameter) => write!(f, "parameter {:?}", parameter.value),
            Self::ParameterAssignment(assignment) => {
                write!(f, "parameter-assignment {}={}", assignment.key, assignment.value)
            }
            other => f.write_str(other.name()),
        }
    }
}

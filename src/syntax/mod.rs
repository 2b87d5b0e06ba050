// Syntax tree, source files and traversal
pub mod ast;
pub mod file;
pub mod visitor;

pub use ast::{Ast, AstNode, AstNodeKind, NodeId, NodeRef};
pub use file::{EditError, Replacement, SourceFile};
pub use visitor::{AstVisitor, AsyncAstVisitor, walk, walk_async, walk_async_cancellable};

//! Visitor pattern for LaTeX AST traversal.
//!
//! Dispatch is double: [`NodeRef::accept`] matches on the node kind and
//! calls the visitor method for that kind. There is no catch-all method, so
//! a visitor sees every kind through its own entry point.
//!
//! Both traversals are depth-first pre-order. With `max_depth = Some(d)` the
//! start node is at depth 0 and a node's children are only visited while its
//! depth is below `d`; `Some(0)` visits the start node alone.

use tokio_util::sync::CancellationToken;

use super::ast::*;

/// Visitor trait for LaTeX AST nodes.
///
/// Implement this trait to define custom behavior when traversing
/// a document. Default implementations are no-ops.
pub trait AstVisitor {
    fn visit_latex(&mut self, _node: NodeRef<'_>, _latex: &LatexNode) {}
    fn visit_text(&mut self, _node: NodeRef<'_>, _text: &TextNode) {}
    fn visit_whitespace(&mut self, _node: NodeRef<'_>, _whitespace: &WhitespaceNode) {}
    fn visit_comment(&mut self, _node: NodeRef<'_>, _comment: &CommentNode) {}
    fn visit_special_symbol(&mut self, _node: NodeRef<'_>, _symbol: &SpecialSymbolNode) {}
    fn visit_command(&mut self, _node: NodeRef<'_>, _command: &CommandNode) {}
    fn visit_environment(&mut self, _node: NodeRef<'_>, _environment: &EnvironmentNode) {}
    fn visit_group(&mut self, _node: NodeRef<'_>, _group: &GroupNode) {}
    fn visit_math(&mut self, _node: NodeRef<'_>, _math: &MathNode) {}
    fn visit_curly_braces_parameter_block(
        &mut self,
        _node: NodeRef<'_>,
        _block: &CurlyBracesParameterBlockNode,
    ) {
    }
    fn visit_square_braces_parameter_block(
        &mut self,
        _node: NodeRef<'_>,
        _block: &SquareBracesParameterBlockNode,
    ) {
    }
    fn visit_parameter_list(&mut self, _node: NodeRef<'_>, _list: &ParameterListNode) {}
    fn visit_parameter(&mut self, _node: NodeRef<'_>, _parameter: &ParameterNode) {}
    fn visit_parameter_assignment(
        &mut self,
        _node: NodeRef<'_>,
        _assignment: &ParameterAssignmentNode,
    ) {
    }
}

/// Asynchronous counterpart of [`AstVisitor`]; each visit may suspend.
///
/// The borrowed tree cannot change while a traversal holds it. Mutations
/// that might race with a traversal go through the task queuer.
#[allow(async_fn_in_trait)]
pub trait AsyncAstVisitor {
    async fn visit_latex(&mut self, _node: NodeRef<'_>, _latex: &LatexNode) {}
    async fn visit_text(&mut self, _node: NodeRef<'_>, _text: &TextNode) {}
    async fn visit_whitespace(&mut self, _node: NodeRef<'_>, _whitespace: &WhitespaceNode) {}
    async fn visit_comment(&mut self, _node: NodeRef<'_>, _comment: &CommentNode) {}
    async fn visit_special_symbol(&mut self, _node: NodeRef<'_>, _symbol: &SpecialSymbolNode) {}
    async fn visit_command(&mut self, _node: NodeRef<'_>, _command: &CommandNode) {}
    async fn visit_environment(&mut self, _node: NodeRef<'_>, _environment: &EnvironmentNode) {}
    async fn visit_group(&mut self, _node: NodeRef<'_>, _group: &GroupNode) {}
    async fn visit_math(&mut self, _node: NodeRef<'_>, _math: &MathNode) {}
    async fn visit_curly_braces_parameter_block(
        &mut self,
        _node: NodeRef<'_>,
        _block: &CurlyBracesParameterBlockNode,
    ) {
    }
    async fn visit_square_braces_parameter_block(
        &mut self,
        _node: NodeRef<'_>,
        _block: &SquareBracesParameterBlockNode,
    ) {
    }
    async fn visit_parameter_list(&mut self, _node: NodeRef<'_>, _list: &ParameterListNode) {}
    async fn visit_parameter(&mut self, _node: NodeRef<'_>, _parameter: &ParameterNode) {}
    async fn visit_parameter_assignment(
        &mut self,
        _node: NodeRef<'_>,
        _assignment: &ParameterAssignmentNode,
    ) {
    }
}

impl NodeRef<'_> {
    /// Call the visitor method matching this node's kind.
    pub fn accept<V: AstVisitor + ?Sized>(self, visitor: &mut V) {
        match self.kind() {
            AstNodeKind::Latex(n) => visitor.visit_latex(self, n),
            AstNodeKind::Text(n) => visitor.visit_text(self, n),
            AstNodeKind::Whitespace(n) => visitor.visit_whitespace(self, n),
            AstNodeKind::Comment(n) => visitor.visit_comment(self, n),
            AstNodeKind::SpecialSymbol(n) => visitor.visit_special_symbol(self, n),
            AstNodeKind::Command(n) => visitor.visit_command(self, n),
            AstNodeKind::Environment(n) => visitor.visit_environment(self, n),
            AstNodeKind::Group(n) => visitor.visit_group(self, n),
            AstNodeKind::Math(n) => visitor.visit_math(self, n),
            AstNodeKind::CurlyBracesParameterBlock(n) => {
                visitor.visit_curly_braces_parameter_block(self, n)
            }
            AstNodeKind::SquareBracesParameterBlock(n) => {
                visitor.visit_square_braces_parameter_block(self, n)
            }
            AstNodeKind::ParameterList(n) => visitor.visit_parameter_list(self, n),
            AstNodeKind::Parameter(n) => visitor.visit_parameter(self, n),
            AstNodeKind::ParameterAssignment(n) => visitor.visit_parameter_assignment(self, n),
        }
    }

    /// Call the async visitor method matching this node's kind.
    pub async fn accept_async<V: AsyncAstVisitor>(self, visitor: &mut V) {
        match self.kind() {
            AstNodeKind::Latex(n) => visitor.visit_latex(self, n).await,
            AstNodeKind::Text(n) => visitor.visit_text(self, n).await,
            AstNodeKind::Whitespace(n) => visitor.visit_whitespace(self, n).await,
            AstNodeKind::Comment(n) => visitor.visit_comment(self, n).await,
            AstNodeKind::SpecialSymbol(n) => visitor.visit_special_symbol(self, n).await,
            AstNodeKind::Command(n) => visitor.visit_command(self, n).await,
            AstNodeKind::Environment(n) => visitor.visit_environment(self, n).await,
            AstNodeKind::Group(n) => visitor.visit_group(self, n).await,
            AstNodeKind::Math(n) => visitor.visit_math(self, n).await,
            AstNodeKind::CurlyBracesParameterBlock(n) => {
                visitor.visit_curly_braces_parameter_block(self, n).await
            }
            AstNodeKind::SquareBracesParameterBlock(n) => {
                visitor.visit_square_braces_parameter_block(self, n).await
            }
            AstNodeKind::ParameterList(n) => visitor.visit_parameter_list(self, n).await,
            AstNodeKind::Parameter(n) => visitor.visit_parameter(self, n).await,
            AstNodeKind::ParameterAssignment(n) => {
                visitor.visit_parameter_assignment(self, n).await
            }
        }
    }
}

fn descend(depth: usize, max_depth: Option<usize>) -> bool {
    max_depth.is_none_or(|max| depth < max)
}

/// Depth-first pre-order traversal starting at `start`.
pub fn walk<V: AstVisitor + ?Sized>(start: NodeRef<'_>, visitor: &mut V, max_depth: Option<usize>) {
    let mut stack = vec![(start, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        node.accept(visitor);
        if descend(depth, max_depth) {
            stack.extend(node.children().rev().map(|child| (child, depth + 1)));
        }
    }
}

/// Asynchronous depth-first pre-order traversal starting at `start`.
pub async fn walk_async<V: AsyncAstVisitor>(
    start: NodeRef<'_>,
    visitor: &mut V,
    max_depth: Option<usize>,
) {
    walk_async_inner(start, visitor, max_depth, None).await;
}

/// Like [`walk_async`], but stops before the next visit once `cancel` fires.
///
/// Returns `false` if the traversal was cut short.
pub async fn walk_async_cancellable<V: AsyncAstVisitor>(
    start: NodeRef<'_>,
    visitor: &mut V,
    max_depth: Option<usize>,
    cancel: &CancellationToken,
) -> bool {
    walk_async_inner(start, visitor, max_depth, Some(cancel)).await
}

async fn walk_async_inner<V: AsyncAstVisitor>(
    start: NodeRef<'_>,
    visitor: &mut V,
    max_depth: Option<usize>,
    cancel: Option<&CancellationToken>,
) -> bool {
    let mut stack = vec![(start, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return false;
        }
        node.accept_async(visitor).await;
        if descend(depth, max_depth) {
            stack.extend(node.children().rev().map(|child| (child, depth + 1)));
        }
    }
    true
}

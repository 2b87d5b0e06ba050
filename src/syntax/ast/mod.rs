//! Arena-backed LaTeX AST.
//!
//! Nodes are addressed by [`NodeId`] handles into an [`Ast`]. Every node is
//! owned by exactly one parent; the only way to restructure the tree is
//! [`Ast::replace_child_node`], which detaches the old subtree without
//! freeing it. Detached handles stay valid until [`Ast::free_detached`].

mod nodes;

pub use nodes::*;

use std::fmt;

use crate::base::{SourceFileRange, TextEdit};

/// Handle of a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node slot in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    kind: AstNodeKind,
    range: SourceFileRange,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl AstNode {
    pub fn kind(&self) -> &AstNodeKind {
        &self.kind
    }

    pub fn range(&self) -> SourceFileRange {
        self.range
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind, self.range)
    }
}

/// The node arena of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<Option<AstNode>>,
    /// Slots emptied by [`Ast::free_detached`], reused before the arena grows.
    free: Vec<NodeId>,
    root: NodeId,
}

impl Ast {
    /// Create a tree holding only its root node.
    pub(crate) fn new(root_kind: AstNodeKind, range: SourceFileRange) -> Self {
        Self {
            nodes: vec![Some(AstNode {
                kind: root_kind,
                range,
                children: Vec::new(),
                parent: None,
            })],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Allocate a detached node owning `children`.
    ///
    /// The children must be detached nodes of this arena; they become owned
    /// by the new node. Freed slots are reused first.
    ///
    /// # Panics
    ///
    /// Panics if the arena would hold more than `u32::MAX` slots.
    pub(crate) fn alloc(
        &mut self,
        kind: AstNodeKind,
        range: SourceFileRange,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let index = u32::try_from(self.nodes.len())
                    .unwrap_or_else(|_| panic!("syntax tree exceeds {} nodes", u32::MAX));
                self.nodes.push(None);
                NodeId(index)
            }
        };
        for child in &children {
            if let Some(node) = self.slot_mut(*child) {
                node.parent = Some(id);
            }
        }
        self.nodes[id.index()] = Some(AstNode {
            kind,
            range,
            children,
            parent: None,
        });
        id
    }

    /// Append detached nodes as the root's children.
    pub(crate) fn attach_to_root(&mut self, children: Vec<NodeId>) {
        let root = self.root;
        for child in &children {
            if let Some(node) = self.slot_mut(*child) {
                node.parent = Some(root);
            }
        }
        if let Some(node) = self.slot_mut(root) {
            node.children.extend(children);
        }
    }

    pub(crate) fn set_range(&mut self, id: NodeId, range: SourceFileRange) {
        if let Some(node) = self.slot_mut(id) {
            node.range = range;
        }
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
            .unwrap_or_else(|| unreachable!("the root node is never freed"))
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|node| NodeRef { ast: self, id, node })
    }

    /// Number of live (not freed) nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots in the arena, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.get(current).and_then(|node| node.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Pre-order list of `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Replace `current` with `new` in `parent`'s children.
    ///
    /// `new` must be a detached node; it takes over `current`'s slot and
    /// `current` becomes detached. Returns `false` and leaves the tree
    /// untouched if `current` is not a child of `parent`.
    pub(crate) fn replace_child_node(&mut self, parent: NodeId, current: NodeId, new: NodeId) -> bool {
        let Some(position) = self
            .get(parent)
            .and_then(|node| node.children.iter().position(|child| *child == current))
        else {
            tracing::error!(
                parent = %parent,
                current = %current,
                "replace_child_node: node is not a child of the given parent"
            );
            return false;
        };
        if self.get(new).is_none_or(|node| node.parent.is_some()) || new == self.root {
            tracing::error!(new = %new, "replace_child_node: replacement is not a detached node");
            return false;
        }
        if self.descendants(new).contains(&parent) {
            tracing::error!(new = %new, parent = %parent, "replace_child_node: replacement would own its parent");
            return false;
        }

        if let Some(node) = self.slot_mut(parent) {
            node.children[position] = new;
        }
        if let Some(node) = self.slot_mut(current) {
            node.parent = None;
        }
        if let Some(node) = self.slot_mut(new) {
            node.parent = Some(parent);
        }
        tracing::trace!(parent = %parent, old = %current, new = %new, "replaced child node");
        true
    }

    /// Free every node that is no longer reachable from the root.
    ///
    /// Returns the number of freed nodes. Handles of freed nodes resolve to
    /// `None` afterwards, until a later allocation reuses their slot; a
    /// handle must not be kept across a free.
    pub fn free_detached(&mut self) -> usize {
        let mut reachable = vec![false; self.nodes.len()];
        for id in self.descendants(self.root) {
            reachable[id.index()] = true;
        }
        let mut freed = 0;
        for (index, (slot, keep)) in self.nodes.iter_mut().zip(reachable).enumerate() {
            if !keep && slot.is_some() {
                *slot = None;
                self.free.push(NodeId(index as u32));
                freed += 1;
            }
        }
        freed
    }

    /// Move every live node's range through `edit`.
    pub fn apply_edit(&mut self, edit: &TextEdit) {
        for node in self.nodes.iter_mut().flatten() {
            node.range = node.range.mapped_through(edit);
        }
    }
}

/// A borrowed view of one node together with its arena.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
    node: &'a AstNode,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn kind(&self) -> &'a AstNodeKind {
        &self.node.kind
    }

    pub fn range(&self) -> SourceFileRange {
        self.node.range
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|id| self.ast.node(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + use<'a> {
        let (ast, node) = (self.ast, self.node);
        node.children.iter().filter_map(move |id| ast.node(*id))
    }

    /// Children that are not whitespace or comments.
    pub fn significant_children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        self.children().filter(|child| !child.kind().is_trivia())
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    /// Name of the command, if this is a command node.
    pub fn command_name(&self) -> Option<&'a str> {
        self.kind().as_command().map(|command| command.name.as_str())
    }

    /// Name of the environment, if this is an environment node.
    pub fn environment_name(&self) -> Option<&'a str> {
        self.kind().as_environment().map(|env| env.name.as_str())
    }

    /// Parameter blocks of a command or environment.
    pub fn parameter_blocks(&self) -> Vec<NodeRef<'a>> {
        match self.kind() {
            AstNodeKind::Command(_) => self.children().collect(),
            AstNodeKind::Environment(env) => self.children().take(env.parameter_count).collect(),
            _ => Vec::new(),
        }
    }

    /// Body of an environment (children after its parameter blocks).
    pub fn environment_body(&self) -> Vec<NodeRef<'a>> {
        match self.kind() {
            AstNodeKind::Environment(env) => self.children().skip(env.parameter_count).collect(),
            _ => Vec::new(),
        }
    }

    /// Concatenated text of a node's text-like descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for id in self.ast.descendants(self.id) {
            let Some(node) = self.ast.get(id) else {
                continue;
            };
            match &node.kind {
                AstNodeKind::Text(text) => out.push_str(&text.content),
                AstNodeKind::Whitespace(_) => out.push(' '),
                AstNodeKind::SpecialSymbol(symbol) => out.push_str(&symbol.symbol),
                AstNodeKind::Math(math) => out.push_str(&math.content),
                _ => {}
            }
        }
        out
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.node)
    }
}

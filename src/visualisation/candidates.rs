//! Candidate extraction: which nodes each provider could render.
//!
//! Candidacy is purely syntactic. One traversal evaluates every provider's
//! node predicate at every node; mappings are not consulted.

use indexmap::IndexMap;

use crate::syntax::ast::*;
use crate::syntax::visitor::{AstVisitor, walk};

use super::provider::ProviderRegistry;

/// Candidate nodes per provider, in document order.
pub type Candidates = IndexMap<&'static str, Vec<NodeId>>;

/// Collects candidate nodes for every registered provider.
pub struct CandidateExtractor<'p> {
    providers: &'p ProviderRegistry,
    candidates: Candidates,
}

impl<'p> CandidateExtractor<'p> {
    pub fn new(providers: &'p ProviderRegistry) -> Self {
        let candidates = providers.iter().map(|provider| (provider.name(), Vec::new())).collect();
        Self {
            providers,
            candidates,
        }
    }

    /// Walk the tree under `root` and return the candidates. Every provider
    /// has an entry, possibly empty.
    pub fn extract(providers: &'p ProviderRegistry, root: NodeRef<'_>) -> Candidates {
        let mut extractor = Self::new(providers);
        walk(root, &mut extractor, None);
        extractor.candidates
    }

    fn consider(&mut self, node: NodeRef<'_>) {
        for provider in self.providers.iter() {
            if provider.can_provide_for_node(node) {
                self.candidates.entry(provider.name()).or_default().push(node.id());
            }
        }
    }
}

impl AstVisitor for CandidateExtractor<'_> {
    fn visit_latex(&mut self, node: NodeRef<'_>, _latex: &LatexNode) {
        self.consider(node);
    }
    fn visit_text(&mut self, node: NodeRef<'_>, _text: &TextNode) {
        self.consider(node);
    }
    fn visit_whitespace(&mut self, node: NodeRef<'_>, _whitespace: &WhitespaceNode) {
        self.consider(node);
    }
    fn visit_comment(&mut self, node: NodeRef<'_>, _comment: &CommentNode) {
        self.consider(node);
    }
    fn visit_special_symbol(&mut self, node: NodeRef<'_>, _symbol: &SpecialSymbolNode) {
        self.consider(node);
    }
    fn visit_command(&mut self, node: NodeRef<'_>, _command: &CommandNode) {
        self.consider(node);
    }
    fn visit_environment(&mut self, node: NodeRef<'_>, _environment: &EnvironmentNode) {
        self.consider(node);
    }
    fn visit_group(&mut self, node: NodeRef<'_>, _group: &GroupNode) {
        self.consider(node);
    }
    fn visit_math(&mut self, node: NodeRef<'_>, _math: &MathNode) {
        self.consider(node);
    }
    fn visit_curly_braces_parameter_block(&mut self, node: NodeRef<'_>, _block: &CurlyBracesParameterBlockNode) {
        self.consider(node);
    }
    fn visit_square_braces_parameter_block(&mut self, node: NodeRef<'_>, _block: &SquareBracesParameterBlockNode) {
        self.consider(node);
    }
    fn visit_parameter_list(&mut self, node: NodeRef<'_>, _list: &ParameterListNode) {
        self.consider(node);
    }
    fn visit_parameter(&mut self, node: NodeRef<'_>, _parameter: &ParameterNode) {
        self.consider(node);
    }
    fn visit_parameter_assignment(&mut self, node: NodeRef<'_>, _assignment: &ParameterAssignmentNode) {
        self.consider(node);
    }
}

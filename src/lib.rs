//! # ilatex-base
//!
//! Core library for live visualisations embedded in LaTeX documents:
//! positions that survive edits, an arena AST, correlation of build-time code
//! mappings with AST nodes, and a serialised write-back path.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! host          → VisualisationHost, Session (queued write-back)
//!   ↓
//! tasks         → TaskQueuer: single-flight FIFO of async mutations
//!   ↓
//! visualisation → providers, candidate extraction, correlation, models
//!   ↓
//! mappings      → CodeMapping loading and per-file registry
//!   ↓
//! syntax        → Ast/NodeId, SourceFile, visitors
//!   ↓
//! parser        → Logos lexer, recursive-descent LaTeX parser
//!   ↓
//! base          → SourceFilePosition, Shift, SourceFileRange, TextEdit
//! ```
//!
//! `config` sits beside `host` and only feeds it options.

// ============================================================================
// MODULES (dependency order: base → parser → syntax → mappings → visualisation → tasks → host)
// ============================================================================

/// Foundation types: positions, ranges, edits, line index
pub mod base;

/// Parser: Logos lexer and LaTeX grammar
pub mod parser;

/// Syntax: arena AST, source files, visitors
pub mod syntax;

/// Code mappings emitted by the build step
pub mod mappings;

/// Visualisation models and their providers
pub mod visualisation;

/// Serialised task execution
pub mod tasks;

/// Host state and sessions
pub mod host;

/// JSON configuration
pub mod config;

// Re-export foundation types
pub use base::{Shift, SourceFilePosition, SourceFileRange, TextEdit};

pub use config::Config;
pub use host::{HostError, Session, VisualisationHost};
pub use mappings::{CodeMapping, CodeMappingRegistry};
pub use syntax::{Ast, NodeId, SourceFile};
pub use tasks::TaskQueuer;
pub use visualisation::{VisualisationModel, VisualisationModelProvider};

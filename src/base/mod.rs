//! Foundation types for the ilatex toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`SourceFilePosition`], [`Shift`] - Positions as parsed, plus edit drift
//! - [`SourceFileRange`] - Ordered pairs of positions
//! - [`TextEdit`] - A replacement in effective coordinates
//! - [`LineIndex`] - Byte offset to line/column conversion
//!
//! This module has NO dependencies on other ilatex modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::{
    InvalidRange, Shift, SourceFilePosition, SourceFileRange, TextEdit, compare,
};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

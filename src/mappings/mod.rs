//! Code mappings emitted by the LaTeX build step.
//!
//! A mapping ties one visualisation in the compiled output to a line of a
//! source file. Batches arrive per file and replace the previous batch.

mod mapping;
mod registry;

pub use mapping::{CodeMapping, MappingError, load_mappings, parse_mappings};
pub use registry::CodeMappingRegistry;

#[cfg(test)]
mod tests;

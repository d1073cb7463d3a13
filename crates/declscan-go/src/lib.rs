//! Go declaration scanning and the lazy symbol model.
//!
//! Layers, leaves first:
//! - [`scope`]: balanced-delimiter spans and the keyword-scope stack
//! - [`typeexpr`]: type expressions as [`TypeNode`](typeexpr::TypeNode) trees
//! - [`patterns`]: the compiled pattern registry
//! - [`extract`]: functions, methods, types, members and imports from text
//! - [`parser`]: the [`SourceParser`](parser::SourceParser) seam
//! - [`model`]: Project, Package, File, Struct, Interface, Function

pub mod decl;
pub mod extract;
pub mod model;
pub mod module;
pub mod parser;
pub mod patterns;
pub mod scope;
pub mod typeexpr;

// Converts this crate's errors to DeclscanError
mod error_bridges;

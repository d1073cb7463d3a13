//! declscan: Go declaration scanning with a lazy, memoized symbol model.
//!
//! Finds functions, methods, structs, interfaces and members in Go sources
//! by scanning text, without a full grammar. Lookups parse only the files
//! they need and cache the results for the life of a [`model::Project`].

// Core infrastructure - re-exported from declscan-core
pub use declscan_core::config;
pub use declscan_core::error;
pub use declscan_core::filter;
pub use declscan_core::output;
pub use declscan_core::text;
pub use declscan_core::types;
pub use declscan_core::workspace;

// Go scanning - re-exported from declscan-go
pub use declscan_go::decl;
pub use declscan_go::extract;
pub use declscan_go::model;
pub use declscan_go::module;
pub use declscan_go::parser;
pub use declscan_go::patterns;
pub use declscan_go::scope;
pub use declscan_go::typeexpr;

// Front door
pub mod cli;

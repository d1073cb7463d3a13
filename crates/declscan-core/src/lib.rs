//! Core infrastructure for declscan.
//!
//! This crate provides language-agnostic infrastructure:
//! - Error types and exit codes
//! - Byte spans and line:column conversion
//! - Source locations for diagnostics
//! - Glob-based path filtering
//! - Project configuration
//! - Source discovery (one walk over the project root)
//! - JSON output envelope for CLI responses

pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod text;
pub mod types;
pub mod workspace;

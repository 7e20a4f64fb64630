//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary invocation (via `wheelwright_command`)
//! - Project fixtures (via `helpers`)

pub(crate) mod helpers;

// Re-export for convenient access
#[allow(unused_imports)]
pub(crate) use helpers::{create_grammar_project, create_pure_project, wheelwright_command};

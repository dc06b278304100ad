//! Shared test utilities for docflow integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp directories
//! - Scripted collaborators and a snapshot recorder
//! - Builder patterns for creating configurations and pipelines programmatically

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;

//! Shared test utilities for callaudit integration tests.
//!
//! This module provides:
//! - `SimHarness` for deterministic simulator runs on a manual clock
//! - Builder patterns for creating test configurations and seeds

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::SimHarness;

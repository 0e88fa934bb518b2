//! Common types and utilities for the pytc type checker.
//!
//! This crate provides the foundational pieces shared across pytc crates:
//! - String interning (`Atom`, `Interner`, `ShardedInterner`)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner, ShardedInterner};

//! Type-consistency solver for a gradually typed Python front end.
//!
//! The resolution pipeline (out of tree) builds a finalized, immutable
//! type model (interned types plus class templates) and this crate
//! answers one question over it: may a value of one type flow into a
//! position declared as another? It uses:
//!
//! - **Interned `TypeKey`s**: structural type representation; equality is
//!   `TypeId` comparison
//! - **Memoized C3 ancestry**: the nominal resolver walks a precomputed
//!   linearization instead of chasing base pointers
//! - **Recursion guards**: self-referential generics terminate with a
//!   defined answer instead of recursing forever
//!
//! The engine is a pure query: it never creates, mutates, or frees model
//! entities, so concurrent checks over a finalized model are safe.

mod consistency_rules;
mod consistent;
mod db;
mod def;
mod diagnostics;
mod explain;
mod format;
mod instantiate;
mod intern;
mod mro;
mod nullability;
pub mod recursion;
mod relation_queries;
mod types;

pub use consistent::{ConsistencyChecker, is_consistent};
pub use db::{RelationCache, TypeDatabase};
pub use def::{ClassDef, CoreDefs, DefId, DefinitionStore};
pub use diagnostics::ConsistencyFailureReason;
pub use format::TypeFormatter;
pub use instantiate::{MAX_INSTANTIATION_DEPTH, TypeSubstitution, instantiate_type};
pub use intern::{TypeInterner, are_types_equivalent, are_types_identical};
pub use mro::MroError;
pub use nullability::is_nullable;
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use relation_queries::{
    RelationCacheKey, RelationKind, RelationPolicy, RelationResult, query_relation,
    query_relation_cached, query_relation_with_policy,
};
pub use types::{
    Arity, CallableId, CallableShape, LiteralValue, TypeId, TypeKey, TypeListId, TypeParamInfo,
    Variance, safe_bind,
};

// Test modules: most suites are loaded by their source files via
// #[path = "tests/..."] declarations. Only suites with no single home
// module are wired here.
#[cfg(test)]
#[path = "tests/concurrency_tests.rs"]
mod concurrency_tests;

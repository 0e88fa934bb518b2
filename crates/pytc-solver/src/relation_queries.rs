//! Unified relation query entrypoints.
//!
//! Centralizes the relation checks (consistency, equivalence, identity)
//! behind one API so callers query the solver instead of wiring themselves
//! to concrete checker engines.

use crate::consistent::ConsistencyChecker;
use crate::db::{RelationCache, TypeDatabase};
use crate::def::DefinitionStore;
use crate::intern::{are_types_equivalent, are_types_identical};
use crate::recursion::RecursionProfile;
use crate::types::TypeId;

/// Relation categories supported by the unified query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// May a value of the actual type flow into the expected position?
    Consistent,
    /// Loose structural equivalence.
    Equivalent,
    /// Strict structural identity.
    Identical,
}

/// Policy knobs for relation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationPolicy {
    /// Recursion limits for the consistency engine.
    pub recursion: RecursionProfile,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            recursion: RecursionProfile::ConsistencyCheck,
        }
    }
}

/// Result of a relation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationResult {
    pub kind: RelationKind,
    pub related: bool,
    pub depth_exceeded: bool,
}

impl RelationResult {
    #[inline]
    pub fn is_related(self) -> bool {
        self.related
    }
}

/// Cache key for memoized relation results.
pub type RelationCacheKey = (TypeId, TypeId, RelationKind);

/// Query a relation under the default policy.
pub fn query_relation(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    expected: TypeId,
    actual: TypeId,
    kind: RelationKind,
) -> RelationResult {
    query_relation_with_policy(db, defs, expected, actual, kind, RelationPolicy::default())
}

/// Query a relation under an explicit policy.
pub fn query_relation_with_policy(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    expected: TypeId,
    actual: TypeId,
    kind: RelationKind,
    policy: RelationPolicy,
) -> RelationResult {
    let (related, depth_exceeded) = match kind {
        RelationKind::Consistent => {
            let mut checker = ConsistencyChecker::with_profile(db, defs, policy.recursion);
            let related = checker.is_consistent(expected, actual);
            (related, checker.depth_exceeded())
        }
        RelationKind::Equivalent => (are_types_equivalent(db, defs, expected, actual), false),
        RelationKind::Identical => (are_types_identical(db, expected, actual), false),
    };

    RelationResult {
        kind,
        related,
        depth_exceeded,
    }
}

/// Query a relation through a memoization cache.
///
/// Only completed, in-budget results are inserted; a query cut off by the
/// recursion guard is answered but never cached.
pub fn query_relation_cached(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    cache: &RelationCache<RelationCacheKey>,
    expected: TypeId,
    actual: TypeId,
    kind: RelationKind,
) -> RelationResult {
    let key = (expected, actual, kind);
    if let Some(related) = cache.get(&key) {
        return RelationResult {
            kind,
            related,
            depth_exceeded: false,
        };
    }
    let result = query_relation(db, defs, expected, actual, kind);
    if !result.depth_exceeded {
        cache.insert(key, result.related);
    }
    result
}

#[cfg(test)]
#[path = "tests/relation_queries_tests.rs"]
mod tests;

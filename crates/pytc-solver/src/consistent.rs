//! The consistency engine.
//!
//! `is_consistent(expected, actual)` decides whether a value of type
//! `actual` may flow into a position declared as `expected`. The relation
//! is total over well-formed input: mismatches come back as `false`, never
//! as errors. The one hazard is generic self-reference, handled by a
//! visited set of `(expected, actual)` pairs; a revisit is treated as
//! inconsistent rather than recursed into.
//!
//! The case analysis is ordered; the first matching case decides. The
//! nominal and per-argument rules live in [`crate::consistency_rules`].

use crate::db::{TypeDatabase, expect_key};
use crate::def::DefinitionStore;
use crate::diagnostics::model_defect;
use crate::intern::are_types_equivalent;
use crate::nullability::is_nullable;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{LiteralValue, TypeId, TypeKey, TypeListId};
use std::sync::Arc;
use tracing::{trace, warn};

/// Stack headroom checked before each recursive dispatch; a fresh segment
/// of `STACK_GROW_SIZE` is allocated when it runs low.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Decides type consistency against a finalized model.
///
/// The checker only reads the interner and the definition store; separate
/// checkers over the same model may run on separate threads freely.
pub struct ConsistencyChecker<'a> {
    pub(crate) db: &'a dyn TypeDatabase,
    pub(crate) defs: &'a DefinitionStore,
    pub(crate) guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(db: &'a dyn TypeDatabase, defs: &'a DefinitionStore) -> Self {
        Self::with_profile(db, defs, RecursionProfile::ConsistencyCheck)
    }

    /// A checker with custom recursion limits.
    pub fn with_profile(
        db: &'a dyn TypeDatabase,
        defs: &'a DefinitionStore,
        profile: RecursionProfile,
    ) -> Self {
        Self {
            db,
            defs,
            guard: RecursionGuard::with_profile(profile),
        }
    }

    /// May a value of type `actual` stand in for `expected`?
    pub fn is_consistent(&mut self, expected: TypeId, actual: TypeId) -> bool {
        trace!(
            expected = expected.index(),
            actual = actual.index(),
            "is_consistent"
        );
        self.check(expected, actual)
    }

    /// Whether any query on this checker was cut off by a recursion limit.
    /// Sticky until [`reset`](Self::reset).
    pub fn depth_exceeded(&self) -> bool {
        self.guard.is_exceeded()
    }

    /// Clear recursion state between unrelated query batches.
    pub fn reset(&mut self) {
        self.guard.reset();
    }

    pub(crate) fn check(&mut self, expected: TypeId, actual: TypeId) -> bool {
        match self.guard.enter((expected, actual)) {
            RecursionResult::Entered => {
                let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    self.dispatch(expected, actual)
                });
                self.guard.leave((expected, actual));
                result
            }
            RecursionResult::Cycle => {
                warn!(
                    expected = expected.index(),
                    actual = actual.index(),
                    "self-referential consistency check; treating as inconsistent"
                );
                false
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                warn!(
                    expected = expected.index(),
                    actual = actual.index(),
                    "recursion limit reached; treating as inconsistent"
                );
                false
            }
        }
    }

    fn dispatch(&mut self, expected: TypeId, actual: TypeId) -> bool {
        let expected_key = expect_key(self.db, expected);
        let actual_key = expect_key(self.db, actual);

        // The dynamic type is consistent with everything, in both directions.
        if matches!(expected_key, TypeKey::Any) || matches!(actual_key, TypeKey::Any) {
            return true;
        }

        // Callable comparisons are unsupported, identity included.
        if matches!(expected_key, TypeKey::Callable(_))
            || matches!(actual_key, TypeKey::Callable(_))
        {
            return false;
        }

        // Interning is canonical: identical ids are identical types.
        if expected == actual {
            return true;
        }

        if matches!(expected_key, TypeKey::None) {
            return is_nullable(self.db, actual);
        }
        if matches!(actual_key, TypeKey::None) {
            return is_nullable(self.db, expected);
        }

        if let (
            TypeKey::Instance {
                def: expected_def,
                args: expected_args,
            },
            TypeKey::Instance {
                def: actual_def,
                args: actual_args,
            },
        ) = (expected_key, actual_key)
        {
            return self.check_nominal(expected, expected_def, expected_args, actual_def, actual_args);
        }

        // Two class objects compare by wrapped template. A class object
        // paired with anything else reaches the equivalence fallback,
        // which rejects it: a class object and an instance are never
        // consistent.
        if let (TypeKey::ClassObject(expected_inner), TypeKey::ClassObject(actual_inner)) =
            (expected_key, actual_key)
        {
            return self.check_class_objects(expected_inner, actual_inner);
        }

        if matches!(expected_key, TypeKey::Instance { .. }) {
            match actual_key {
                TypeKey::Union(list) => {
                    // Every possible runtime value must fit the target.
                    let members = self.union_members(list);
                    return members.iter().all(|&member| self.check(expected, member));
                }
                TypeKey::Optional(_) => return false,
                TypeKey::Literal(literal) => {
                    let widened = self.widen_literal(literal);
                    return self.check(expected, widened);
                }
                _ => {}
            }
        }

        match expected_key {
            TypeKey::Union(list) => {
                let members = self.union_members(list);
                return members.iter().any(|&member| self.check(member, actual));
            }
            TypeKey::Optional(wrapped) => {
                if self.check(wrapped, actual) {
                    return true;
                }
                return matches!(actual_key, TypeKey::None);
            }
            TypeKey::Literal(expected_literal) => {
                // Literal positions are invariant: only the identical value fits.
                return match actual_key {
                    TypeKey::Literal(actual_literal) => expected_literal == actual_literal,
                    _ => false,
                };
            }
            _ => {}
        }

        // Type variables, and any pairing not covered above, fall back to
        // the model's loose structural equivalence.
        are_types_equivalent(self.db, self.defs, expected, actual)
    }

    fn check_class_objects(&mut self, expected_inner: TypeId, actual_inner: TypeId) -> bool {
        // `type[Any]` on the expected side accepts any class object; the
        // actual side gets no such shortcut.
        if expected_inner == TypeId::ANY {
            return true;
        }
        match (
            expect_key(self.db, expected_inner),
            expect_key(self.db, actual_inner),
        ) {
            (
                TypeKey::Instance {
                    def: expected_def, ..
                },
                TypeKey::Instance { def: actual_def, .. },
            ) => expected_def == actual_def,
            _ => false,
        }
    }

    pub(crate) fn widen_literal(&self, literal: LiteralValue) -> TypeId {
        let def = self.defs.literal_class(literal);
        self.db.instance(def, Vec::new())
    }

    /// Union members, validated: a union reaching the engine with fewer
    /// than two members means the model bypassed normalization.
    pub(crate) fn union_members(&self, list: TypeListId) -> Arc<[TypeId]> {
        let members = self.db.type_list(list);
        if members.len() < 2 {
            model_defect("union with fewer than two members");
        }
        members
    }
}

/// One-shot convenience over a fresh checker.
pub fn is_consistent(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    expected: TypeId,
    actual: TypeId,
) -> bool {
    ConsistencyChecker::new(db, defs).is_consistent(expected, actual)
}

#[cfg(test)]
#[path = "tests/consistency_tests.rs"]
mod tests;

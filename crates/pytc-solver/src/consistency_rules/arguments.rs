//! Per-argument comparison under a declared variance.

use crate::consistent::ConsistencyChecker;
use crate::intern::are_types_identical;
use crate::types::{TypeId, Variance};

impl ConsistencyChecker<'_> {
    /// Compare one pair of bound arguments under `kind`.
    ///
    /// The direction of the enclosing check flows through covariant
    /// positions and flips through contravariant ones; invariant positions
    /// demand exact structural identity with no leniency.
    pub(crate) fn compatible_under(
        &mut self,
        kind: Variance,
        expected_arg: TypeId,
        actual_arg: TypeId,
    ) -> bool {
        match kind {
            Variance::Invariant => are_types_identical(self.db, expected_arg, actual_arg),
            Variance::Covariant => self.check(expected_arg, actual_arg),
            Variance::Contravariant => self.check(actual_arg, expected_arg),
        }
    }
}

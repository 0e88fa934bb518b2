//! Structured failure payloads and the fatal-defect path.
//!
//! Ordinary mismatches are just `false` from the engine; callers that want
//! to explain one to a user ask [`crate::ConsistencyChecker::explain_failure`]
//! for a structured reason and render it themselves. Text rendering is the
//! caller's concern; the payloads carry ids, not strings.

use crate::types::{TypeId, Variance};
use crate::def::DefId;

/// Why a consistency query failed.
///
/// One reason per failed top-level query, describing the outermost rule
/// that rejected the pair. Nested detail can be recovered by re-querying
/// the ids the payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyFailureReason {
    /// No more specific rule applied; the types are simply different.
    TypeMismatch { expected: TypeId, actual: TypeId },

    /// Two class instances whose templates are not related by ancestry.
    UnrelatedClasses { expected: DefId, actual: DefId },

    /// Same template, but one bound-argument position failed under the
    /// placeholder's variance.
    TypeArgumentMismatch {
        index: usize,
        variance: Variance,
        expected_arg: TypeId,
        actual_arg: TypeId,
    },

    /// Variadic instances with different lengths.
    ArityMismatch {
        expected_len: usize,
        actual_len: usize,
    },

    /// A non-nullable target cannot accept a nullable source.
    NonOptionalTarget { expected: TypeId, actual: TypeId },

    /// The actual type fits no member of the expected union.
    NoMatchingUnionMember { expected: TypeId, actual: TypeId },

    /// A member of the actual union does not fit the expected type.
    UnionMemberRejected { expected: TypeId, member: TypeId },

    /// Literal positions require an identical literal value.
    LiteralMismatch { expected: TypeId, actual: TypeId },

    /// Callable comparisons are unsupported.
    CallableUnsupported,

    /// Class objects over different templates.
    ClassObjectMismatch { expected: TypeId, actual: TypeId },

    /// The query was cut off by the recursion guard.
    RecursionLimit,
}

/// Fatal path for model-invariant violations.
///
/// Distinct from any mismatch result: a mismatch is `false`, a defect
/// means the finalized model contradicts its own invariants and no query
/// result would be meaningful.
#[cold]
pub(crate) fn model_defect(message: &str) -> ! {
    tracing::error!(message, "type model invariant violated");
    panic!("type model invariant violated: {message}");
}

//! Failure explanation.
//!
//! Re-derives the outermost rule that rejected a pair, as a structured
//! [`ConsistencyFailureReason`]. Callers turn the payload into diagnostics
//! with their own positional context; nothing here renders text.

use crate::consistent::ConsistencyChecker;
use crate::db::{TypeDatabase, expect_key};
use crate::def::DefId;
use crate::diagnostics::ConsistencyFailureReason;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::{Arity, TypeId, TypeKey, TypeListId, safe_bind};

impl ConsistencyChecker<'_> {
    /// Explain why `actual` does not fit `expected`.
    ///
    /// Returns `None` when the pair is in fact consistent.
    pub fn explain_failure(
        &mut self,
        expected: TypeId,
        actual: TypeId,
    ) -> Option<ConsistencyFailureReason> {
        if self.is_consistent(expected, actual) {
            return None;
        }
        if self.depth_exceeded() {
            return Some(ConsistencyFailureReason::RecursionLimit);
        }
        Some(self.classify(expected, actual))
    }

    fn classify(&mut self, expected: TypeId, actual: TypeId) -> ConsistencyFailureReason {
        let expected_key = expect_key(self.db, expected);
        let actual_key = expect_key(self.db, actual);

        if matches!(expected_key, TypeKey::Callable(_))
            || matches!(actual_key, TypeKey::Callable(_))
        {
            return ConsistencyFailureReason::CallableUnsupported;
        }

        match (expected_key, actual_key) {
            (
                TypeKey::Instance {
                    def: expected_def,
                    args: expected_args,
                },
                TypeKey::Instance {
                    def: actual_def,
                    args: actual_args,
                },
            ) => {
                if expected_def == actual_def {
                    return self.classify_arguments(
                        expected_def,
                        expected,
                        actual,
                        expected_args,
                        actual_args,
                    );
                }
                match self.specialized_ancestor(expected_def, actual_def, actual_args) {
                    Some(TypeKey::Instance {
                        args: specialized_args,
                        ..
                    }) => self.classify_arguments(
                        expected_def,
                        expected,
                        actual,
                        expected_args,
                        specialized_args,
                    ),
                    _ => ConsistencyFailureReason::UnrelatedClasses {
                        expected: expected_def,
                        actual: actual_def,
                    },
                }
            }
            (TypeKey::Instance { .. }, TypeKey::Optional(_)) => {
                ConsistencyFailureReason::NonOptionalTarget { expected, actual }
            }
            (TypeKey::Instance { .. }, TypeKey::Union(list)) => {
                let members = self.union_members(list);
                let rejected = members
                    .iter()
                    .copied()
                    .find(|&member| !self.check(expected, member));
                match rejected {
                    Some(member) => {
                        ConsistencyFailureReason::UnionMemberRejected { expected, member }
                    }
                    None => ConsistencyFailureReason::TypeMismatch { expected, actual },
                }
            }
            (TypeKey::Union(_), _) => {
                ConsistencyFailureReason::NoMatchingUnionMember { expected, actual }
            }
            (TypeKey::Optional(wrapped), _) => self.classify(wrapped, actual),
            (TypeKey::Literal(_), _) => {
                ConsistencyFailureReason::LiteralMismatch { expected, actual }
            }
            (TypeKey::ClassObject(_), TypeKey::ClassObject(_)) => {
                ConsistencyFailureReason::ClassObjectMismatch { expected, actual }
            }
            _ => ConsistencyFailureReason::TypeMismatch { expected, actual },
        }
    }

    /// The first MRO entry of `actual_def` over `expected_def`, specialized
    /// with the actual instance's bound arguments.
    fn specialized_ancestor(
        &mut self,
        expected_def: DefId,
        actual_def: DefId,
        actual_args: TypeListId,
    ) -> Option<TypeKey> {
        let mro = self.defs.mro(self.db, actual_def);
        for &ancestor in mro.iter() {
            let Some(TypeKey::Instance {
                def: ancestor_def, ..
            }) = self.db.lookup(ancestor)
            else {
                continue;
            };
            if ancestor_def != expected_def {
                continue;
            }
            let template = self.defs.class_def(actual_def);
            let args = self.db.type_list(actual_args);
            let subst = TypeSubstitution::from_params(&template.type_params, &args);
            let specialized = instantiate_type(self.db, ancestor, &subst);
            return self.db.lookup(specialized);
        }
        None
    }

    /// First failing bound-argument position, as a structured reason.
    fn classify_arguments(
        &mut self,
        def: DefId,
        expected: TypeId,
        actual: TypeId,
        expected_args: TypeListId,
        actual_args: TypeListId,
    ) -> ConsistencyFailureReason {
        let template = self.defs.class_def(def);
        let expected_args = self.db.type_list(expected_args);
        let actual_args = self.db.type_list(actual_args);

        match template.arity {
            Arity::Unbounded => {
                if expected_args.len() != actual_args.len() {
                    return ConsistencyFailureReason::ArityMismatch {
                        expected_len: expected_args.len(),
                        actual_len: actual_args.len(),
                    };
                }
                let Some(rule) = template.type_params.first().map(|p| p.variance) else {
                    return ConsistencyFailureReason::TypeMismatch { expected, actual };
                };
                for index in 0..expected_args.len() {
                    if !self.compatible_under(rule, expected_args[index], actual_args[index]) {
                        return ConsistencyFailureReason::TypeArgumentMismatch {
                            index,
                            variance: rule,
                            expected_arg: expected_args[index],
                            actual_arg: actual_args[index],
                        };
                    }
                }
            }
            Arity::Fixed(arity) => {
                for index in 0..arity as usize {
                    let param = &template.type_params[index];
                    let expected_arg = safe_bind(&expected_args, index);
                    let actual_arg = safe_bind(&actual_args, index);
                    if !self.compatible_under(param.variance, expected_arg, actual_arg) {
                        return ConsistencyFailureReason::TypeArgumentMismatch {
                            index,
                            variance: param.variance,
                            expected_arg,
                            actual_arg,
                        };
                    }
                }
            }
        }
        ConsistencyFailureReason::TypeMismatch { expected, actual }
    }
}

#[cfg(test)]
#[path = "tests/explain_tests.rs"]
mod tests;

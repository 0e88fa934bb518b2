//! Nominal subtyping between class instances.
//!
//! Two instances over the same template compare argument-by-argument under
//! each placeholder's declared variance. Instances over different
//! templates relate only through the actual side's ancestry: the first
//! MRO entry over the expected template decides, specialized with the
//! actual instance's bound arguments.

use crate::consistent::ConsistencyChecker;
use crate::db::TypeDatabase;
use crate::def::DefId;
use crate::diagnostics::model_defect;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::{Arity, TypeId, TypeKey, TypeListId, safe_bind};

impl ConsistencyChecker<'_> {
    pub(crate) fn check_nominal(
        &mut self,
        expected: TypeId,
        expected_def: DefId,
        expected_args: TypeListId,
        actual_def: DefId,
        actual_args: TypeListId,
    ) -> bool {
        if expected_def != actual_def {
            return self.check_via_ancestry(expected, expected_def, actual_def, actual_args);
        }
        self.check_type_arguments(expected_def, expected_args, actual_args)
    }

    /// Walk the actual template's ancestry for the expected template.
    ///
    /// Nearest ancestor first; the first matching entry wins, and multiple
    /// inheritance paths to the same template are not reconciled.
    fn check_via_ancestry(
        &mut self,
        expected: TypeId,
        expected_def: DefId,
        actual_def: DefId,
        actual_args: TypeListId,
    ) -> bool {
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

            // MRO entries are expressed in the actual template's own
            // placeholders; specialize with the bound arguments actually
            // supplied before re-checking.
            let template = self.defs.class_def(actual_def);
            let args = self.db.type_list(actual_args);
            let subst = TypeSubstitution::from_params(&template.type_params, &args);
            let specialized = instantiate_type(self.db, ancestor, &subst);
            return self.check(expected, specialized);
        }
        false
    }

    /// Same template on both sides: compare each bound-argument position.
    pub(crate) fn check_type_arguments(
        &mut self,
        def: DefId,
        expected_args: TypeListId,
        actual_args: TypeListId,
    ) -> bool {
        let template = self.defs.class_def(def);
        let expected_args = self.db.type_list(expected_args);
        let actual_args = self.db.type_list(actual_args);

        match template.arity {
            Arity::Unbounded => {
                // Variadic uses must agree on length, and every position is
                // compared under the template's single shared rule.
                if expected_args.len() != actual_args.len() {
                    return false;
                }
                let rule = match template.type_params.first() {
                    Some(param) => param.variance,
                    None => model_defect("variadic template declares no placeholder"),
                };
                (0..expected_args.len())
                    .all(|index| self.compatible_under(rule, expected_args[index], actual_args[index]))
            }
            Arity::Fixed(arity) => {
                for index in 0..arity as usize {
                    let param = &template.type_params[index];
                    let expected_arg = safe_bind(&expected_args, index);
                    let actual_arg = safe_bind(&actual_args, index);
                    if !self.compatible_under(param.variance, expected_arg, actual_arg) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

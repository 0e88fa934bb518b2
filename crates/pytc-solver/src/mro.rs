//! C3 linearization of class ancestry.
//!
//! Produces the ordered ancestor list the nominal resolver walks: the class
//! itself excluded, nearest ancestor first, each entry an instance type
//! expressed in the subject template's own placeholders. Results are
//! memoized in the [`DefinitionStore`].

use crate::db::TypeDatabase;
use crate::def::{DefId, DefinitionStore};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{TypeId, TypeKey};
use std::collections::VecDeque;
use std::sync::Arc;

/// Ways in which linearizing a hierarchy can fail.
///
/// The pipeline finalizes templates before queries run, so any of these
/// indicates a malformed model rather than a user-level type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MroError {
    /// The class reaches itself through its own bases.
    CyclicDefinition(DefId),

    /// A base entry is not a class instance.
    InvalidBase { class: DefId, base: TypeId },

    /// No ordering satisfies the C3 constraints (or the hierarchy is too
    /// deep to linearize within the traversal budget).
    UnresolvableMro(DefId),
}

/// Linearize `class`'s ancestry, memoizing every intermediate result.
pub fn linearize(
    db: &dyn TypeDatabase,
    store: &DefinitionStore,
    class: DefId,
) -> Result<Arc<[TypeId]>, MroError> {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::MroTraversal);
    linearize_inner(db, store, class, &mut guard)
}

fn linearize_inner(
    db: &dyn TypeDatabase,
    store: &DefinitionStore,
    class: DefId,
    guard: &mut RecursionGuard<DefId>,
) -> Result<Arc<[TypeId]>, MroError> {
    if let Some(cached) = store.cached_mro(class) {
        return Ok(cached);
    }

    match guard.enter(class) {
        RecursionResult::Entered => {}
        RecursionResult::Cycle => return Err(MroError::CyclicDefinition(class)),
        RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
            return Err(MroError::UnresolvableMro(class));
        }
    }
    let result = merge_bases(db, store, class, guard);
    guard.leave(class);

    let linear: Arc<[TypeId]> = result?.into();
    store.cache_mro(class, linear.clone());
    Ok(linear)
}

fn merge_bases(
    db: &dyn TypeDatabase,
    store: &DefinitionStore,
    class: DefId,
    guard: &mut RecursionGuard<DefId>,
) -> Result<Vec<TypeId>, MroError> {
    let def = store.class_def(class);
    if def.bases.is_empty() {
        return Ok(Vec::new());
    }

    let mut sequences: Vec<VecDeque<TypeId>> = Vec::with_capacity(def.bases.len() + 1);
    for &base in &def.bases {
        let (base_def, base_args) = match db.lookup(base) {
            Some(TypeKey::Instance { def, args }) => (def, args),
            _ => return Err(MroError::InvalidBase { class, base }),
        };
        if base_def == class {
            return Err(MroError::CyclicDefinition(class));
        }

        let base_mro = linearize_inner(db, store, base_def, guard)?;

        // Re-express the base's own ancestry in this class's placeholders
        // by substituting the base instance's bound arguments through.
        let base_template = store.class_def(base_def);
        let args = db.type_list(base_args);
        let subst = TypeSubstitution::from_params(&base_template.type_params, &args);

        let mut sequence = VecDeque::with_capacity(base_mro.len() + 1);
        sequence.push_back(base);
        for &ancestor in base_mro.iter() {
            sequence.push_back(instantiate_type(db, ancestor, &subst));
        }
        sequences.push(sequence);
    }
    sequences.push(def.bases.iter().copied().collect());

    c3_merge(db, sequences).ok_or(MroError::UnresolvableMro(class))
}

/// The C3 merge over ancestor sequences.
///
/// Candidates are compared by template: two entries over the same template
/// with different arguments count as the same class, and the first
/// encountered instance wins. Multiple inheritance paths to one template
/// are not reconciled.
fn c3_merge(db: &dyn TypeDatabase, mut sequences: Vec<VecDeque<TypeId>>) -> Option<Vec<TypeId>> {
    // Most MROs aren't that long...
    let mut mro = Vec::with_capacity(8);

    loop {
        sequences.retain(|sequence| !sequence.is_empty());

        if sequences.is_empty() {
            return Some(mro);
        }

        // A candidate that still appears "deeper down" in some sequence is
        // not ready yet. Take the first head for which this does not hold;
        // if every head is blocked, no consistent order exists.
        let mro_entry = sequences.iter().find_map(|outer_sequence| {
            let candidate = outer_sequence[0];
            let candidate_def = template_of(db, candidate)?;

            let not_in_tail = sequences.iter().all(|sequence| {
                sequence
                    .iter()
                    .skip(1)
                    .all(|&entry| template_of(db, entry) != Some(candidate_def))
            });

            not_in_tail.then_some(candidate)
        })?;

        let entry_def = template_of(db, mro_entry);
        mro.push(mro_entry);

        for sequence in &mut sequences {
            if let Some(&head) = sequence.front() {
                if template_of(db, head) == entry_def {
                    sequence.pop_front();
                }
            }
        }
    }
}

fn template_of(db: &dyn TypeDatabase, ty: TypeId) -> Option<DefId> {
    match db.lookup(ty) {
        Some(TypeKey::Instance { def, .. }) => Some(def),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/mro_tests.rs"]
mod tests;

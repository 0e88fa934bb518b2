//! Concurrent queries over a finalized model must agree with serial ones.

use crate::db::TypeDatabase;
use crate::def::{ClassDef, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::{TypeId, TypeParamInfo};
use crate::{ConsistencyChecker, is_consistent};
use rayon::prelude::*;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn parallel_queries_agree_with_serial_results() {
    init_tracing();

    let interner = TypeInterner::new();
    let defs = DefinitionStore::new(&interner);
    let core = defs.core().clone();

    let animal_def = defs.register(ClassDef::new(
        interner.intern_string("Animal"),
        vec![],
        vec![core.object_ty],
    ));
    let animal = interner.instance(animal_def, vec![]);
    let dog_def = defs.register(ClassDef::new(
        interner.intern_string("Dog"),
        vec![],
        vec![animal],
    ));
    let dog = interner.instance(dog_def, vec![]);

    let t = interner.intern_string("T");
    let box_def = defs.register(ClassDef::new(
        interner.intern_string("Box"),
        vec![TypeParamInfo::covariant(t)],
        vec![core.object_ty],
    ));

    // Model construction ends here; everything below only reads.
    let mut samples: Vec<TypeId> = vec![
        TypeId::ANY,
        TypeId::NONE,
        core.int_ty,
        core.float_ty,
        core.bool_ty,
        core.str_ty,
        animal,
        dog,
        interner.instance(box_def, vec![animal]),
        interner.instance(box_def, vec![dog]),
        interner.optional(core.int_ty),
        interner.union(vec![core.int_ty, core.str_ty]),
        interner.literal_int(1),
        interner.literal_int(2),
        interner.class_object(dog),
        interner.instance(core.tuple, vec![core.int_ty, core.str_ty]),
    ];
    samples.dedup();

    let pairs: Vec<(TypeId, TypeId)> = samples
        .iter()
        .flat_map(|&expected| samples.iter().map(move |&actual| (expected, actual)))
        .collect();

    let serial: Vec<bool> = pairs
        .iter()
        .map(|&(expected, actual)| is_consistent(&interner, &defs, expected, actual))
        .collect();

    let parallel: Vec<bool> = pairs
        .par_iter()
        .map(|&(expected, actual)| is_consistent(&interner, &defs, expected, actual))
        .collect();

    assert_eq!(serial, parallel);
}

#[test]
fn independent_checkers_share_one_model() {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new(&interner);
    let core = defs.core().clone();

    let results: Vec<bool> = (0..8)
        .into_par_iter()
        .map(|_| {
            let mut checker = ConsistencyChecker::new(&interner, &defs);
            checker.is_consistent(core.float_ty, core.int_ty)
                && !checker.is_consistent(core.int_ty, core.float_ty)
        })
        .collect();

    assert!(results.into_iter().all(|ok| ok));
}

use super::*;
use crate::db::TypeDatabase;
use crate::def::{ClassDef, CoreDefs, DefId, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::{TypeId, TypeParamInfo};

/// A small resolved model: the builtins plus `Animal`/`Dog` and one
/// generic template per variance kind.
struct Model {
    interner: TypeInterner,
    defs: DefinitionStore,
    animal: TypeId,
    dog: TypeId,
    box_def: DefId,
    cell_def: DefId,
    sink_def: DefId,
}

fn model() -> Model {
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
    let cell_def = defs.register(ClassDef::new(
        interner.intern_string("Cell"),
        vec![TypeParamInfo::new(t)],
        vec![core.object_ty],
    ));
    let sink_def = defs.register(ClassDef::new(
        interner.intern_string("Sink"),
        vec![TypeParamInfo::contravariant(t)],
        vec![core.object_ty],
    ));

    Model {
        interner,
        defs,
        animal,
        dog,
        box_def,
        cell_def,
        sink_def,
    }
}

impl Model {
    fn core(&self) -> CoreDefs {
        self.defs.core().clone()
    }

    fn consistent(&self, expected: TypeId, actual: TypeId) -> bool {
        is_consistent(&self.interner, &self.defs, expected, actual)
    }
}

// ---------------------------------------------------------------------------
// Any
// ---------------------------------------------------------------------------

#[test]
fn any_is_consistent_in_both_directions() {
    let m = model();
    let core = m.core();

    let samples = [
        core.int_ty,
        m.dog,
        m.interner.optional(core.str_ty),
        m.interner.union(vec![core.int_ty, core.str_ty]),
        m.interner.literal_int(1),
        m.interner.class_object(m.dog),
    ];
    for ty in samples {
        assert!(m.consistent(TypeId::ANY, ty));
        assert!(m.consistent(ty, TypeId::ANY));
    }
}

// ---------------------------------------------------------------------------
// Reflexivity
// ---------------------------------------------------------------------------

#[test]
fn every_well_formed_type_is_self_consistent() {
    let m = model();
    let core = m.core();

    let t = m.interner.intern_string("T");
    let samples = [
        core.int_ty,
        m.animal,
        m.interner.instance(m.box_def, vec![core.int_ty]),
        m.interner.instance(m.cell_def, vec![m.dog]),
        m.interner.optional(core.int_ty),
        m.interner.union(vec![core.int_ty, core.str_ty]),
        m.interner.literal_int(1),
        m.interner.literal_str("x"),
        m.interner
            .instance(core.tuple, vec![core.int_ty, core.str_ty]),
        m.interner.type_var(TypeParamInfo::new(t)),
        m.interner.class_object(m.dog),
        TypeId::NONE,
    ];
    for ty in samples {
        assert!(m.consistent(ty, ty), "expected {ty:?} ~ {ty:?}");
    }
}

// ---------------------------------------------------------------------------
// Numeric promotion (plain ancestry, one direction only)
// ---------------------------------------------------------------------------

#[test]
fn numeric_promotion_follows_the_tower() {
    let m = model();
    let core = m.core();

    assert!(m.consistent(core.float_ty, core.int_ty));
    assert!(!m.consistent(core.int_ty, core.float_ty));
    assert!(m.consistent(core.complex_ty, core.float_ty));
    assert!(!m.consistent(core.float_ty, core.complex_ty));
    assert!(m.consistent(core.int_ty, core.bool_ty));
    assert!(!m.consistent(core.bool_ty, core.int_ty));

    // Transitive through the memoized ancestry.
    assert!(m.consistent(core.complex_ty, core.bool_ty));
    assert!(m.consistent(core.float_ty, core.bool_ty));
}

// ---------------------------------------------------------------------------
// Nominal subtyping
// ---------------------------------------------------------------------------

#[test]
fn subclass_flows_into_superclass_position() {
    let m = model();
    let core = m.core();

    assert!(m.consistent(m.animal, m.dog));
    assert!(!m.consistent(m.dog, m.animal));
    assert!(m.consistent(core.object_ty, m.dog));
    assert!(!m.consistent(m.dog, core.str_ty));
    assert!(!m.consistent(core.str_ty, m.dog));
}

#[test]
fn ancestry_specializes_generic_bases() {
    let m = model();
    let core = m.core();

    // class Litter[T](Box[T])
    let t = m.interner.intern_string("T");
    let t_var = m.interner.type_var(TypeParamInfo::covariant(t));
    let litter_def = m.defs.register(ClassDef::new(
        m.interner.intern_string("Litter"),
        vec![TypeParamInfo::covariant(t)],
        vec![m.interner.instance(m.box_def, vec![t_var])],
    ));

    let litter_dog = m.interner.instance(litter_def, vec![m.dog]);
    let box_animal = m.interner.instance(m.box_def, vec![m.animal]);
    let box_str = m.interner.instance(m.box_def, vec![core.str_ty]);

    assert!(m.consistent(box_animal, litter_dog));
    assert!(!m.consistent(box_str, litter_dog));
    assert!(!m.consistent(litter_dog, box_animal));
}

// ---------------------------------------------------------------------------
// Variance
// ---------------------------------------------------------------------------

#[test]
fn covariant_arguments_follow_subtyping() {
    let m = model();

    let box_animal = m.interner.instance(m.box_def, vec![m.animal]);
    let box_dog = m.interner.instance(m.box_def, vec![m.dog]);

    assert!(m.consistent(box_animal, box_dog));
    assert!(!m.consistent(box_dog, box_animal));
}

#[test]
fn invariant_arguments_require_identity() {
    let m = model();

    let cell_animal = m.interner.instance(m.cell_def, vec![m.animal]);
    let cell_dog = m.interner.instance(m.cell_def, vec![m.dog]);

    assert!(!m.consistent(cell_animal, cell_dog));
    assert!(!m.consistent(cell_dog, cell_animal));
    assert!(m.consistent(cell_dog, cell_dog));
}

#[test]
fn contravariant_arguments_reverse_subtyping() {
    let m = model();

    let sink_animal = m.interner.instance(m.sink_def, vec![m.animal]);
    let sink_dog = m.interner.instance(m.sink_def, vec![m.dog]);

    assert!(m.consistent(sink_dog, sink_animal));
    assert!(!m.consistent(sink_animal, sink_dog));
}

#[test]
fn missing_arguments_read_as_any() {
    let m = model();
    let core = m.core();

    let box_bare = m.interner.instance(m.box_def, vec![]);
    let box_int = m.interner.instance(m.box_def, vec![core.int_ty]);
    assert!(m.consistent(box_bare, box_int));
    assert!(m.consistent(box_int, box_bare));

    // Invariant positions still demand identity, and `Any` padded on one
    // side only is not identical to a concrete binding.
    let cell_bare = m.interner.instance(m.cell_def, vec![]);
    let cell_int = m.interner.instance(m.cell_def, vec![core.int_ty]);
    assert!(!m.consistent(cell_bare, cell_int));
}

// ---------------------------------------------------------------------------
// Variadic arity
// ---------------------------------------------------------------------------

#[test]
fn variadic_uses_must_agree_on_length() {
    let m = model();
    let core = m.core();

    let pair = m
        .interner
        .instance(core.tuple, vec![core.int_ty, core.str_ty]);
    let triple = m.interner.instance(
        core.tuple,
        vec![core.int_ty, core.str_ty, core.bool_ty],
    );

    assert!(m.consistent(pair, pair));
    assert!(!m.consistent(pair, triple));
    assert!(!m.consistent(triple, pair));
}

#[test]
fn variadic_positions_share_one_variance_rule() {
    let m = model();
    let core = m.core();

    // tuple's single placeholder is covariant, applied to every position.
    let float_pair = m
        .interner
        .instance(core.tuple, vec![core.float_ty, core.str_ty]);
    let int_pair = m
        .interner
        .instance(core.tuple, vec![core.int_ty, core.str_ty]);
    assert!(m.consistent(float_pair, int_pair));
    assert!(!m.consistent(int_pair, float_pair));

    let single_int = m.interner.instance(core.tuple, vec![core.int_ty]);
    let single_bool = m.interner.instance(core.tuple, vec![core.bool_ty]);
    assert!(m.consistent(single_int, single_bool));
}

// ---------------------------------------------------------------------------
// None / Optional / Union
// ---------------------------------------------------------------------------

#[test]
fn optional_accepts_none_and_the_wrapped_type() {
    let m = model();
    let core = m.core();

    let optional_int = m.interner.optional(core.int_ty);
    assert!(m.consistent(optional_int, TypeId::NONE));
    assert!(m.consistent(optional_int, core.int_ty));
    assert!(m.consistent(optional_int, core.bool_ty));
    assert!(!m.consistent(optional_int, core.str_ty));
}

#[test]
fn non_nullable_targets_reject_nullable_sources() {
    let m = model();
    let core = m.core();

    assert!(!m.consistent(core.int_ty, TypeId::NONE));
    assert!(!m.consistent(core.int_ty, m.interner.optional(core.int_ty)));
    assert!(!m.consistent(
        core.int_ty,
        m.interner.union(vec![core.int_ty, TypeId::NONE])
    ));
}

#[test]
fn none_target_accepts_any_nullable_source() {
    let m = model();
    let core = m.core();

    assert!(m.consistent(TypeId::NONE, TypeId::NONE));
    assert!(m.consistent(TypeId::NONE, m.interner.optional(core.int_ty)));
    assert!(m.consistent(
        TypeId::NONE,
        m.interner.union(vec![core.str_ty, TypeId::NONE])
    ));
    assert!(!m.consistent(TypeId::NONE, core.int_ty));
}

#[test]
fn union_target_accepts_any_member() {
    let m = model();
    let core = m.core();

    let int_or_str = m.interner.union(vec![core.int_ty, core.str_ty]);
    assert!(m.consistent(int_or_str, core.int_ty));
    assert!(m.consistent(int_or_str, core.str_ty));
    assert!(m.consistent(int_or_str, core.bool_ty));
    assert!(!m.consistent(int_or_str, m.dog));
}

#[test]
fn union_source_must_fit_entirely() {
    let m = model();
    let core = m.core();

    let int_or_str = m.interner.union(vec![core.int_ty, core.str_ty]);
    assert!(!m.consistent(core.int_ty, int_or_str));

    // Every member promotes into the target.
    let int_or_bool = m.interner.union(vec![core.int_ty, core.bool_ty]);
    assert!(m.consistent(core.int_ty, int_or_bool));
    assert!(m.consistent(core.float_ty, int_or_bool));
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

#[test]
fn literal_positions_are_invariant() {
    let m = model();

    let one = m.interner.literal_int(1);
    let two = m.interner.literal_int(2);
    assert!(m.consistent(one, one));
    assert!(!m.consistent(one, two));

    let yes = m.interner.literal_bool(true);
    let no = m.interner.literal_bool(false);
    assert!(!m.consistent(yes, no));
}

#[test]
fn literals_widen_to_their_runtime_class() {
    let m = model();
    let core = m.core();

    let one = m.interner.literal_int(1);
    assert!(m.consistent(core.int_ty, one));
    assert!(m.consistent(core.float_ty, one));
    assert!(!m.consistent(core.str_ty, one));

    // Widening is one-way: a literal target accepts no plain instance.
    assert!(!m.consistent(one, core.int_ty));

    let hello = m.interner.literal_str("hello");
    assert!(m.consistent(core.str_ty, hello));

    let truthy = m.interner.literal_bool(true);
    assert!(m.consistent(core.bool_ty, truthy));
    assert!(m.consistent(core.int_ty, truthy));
}

// ---------------------------------------------------------------------------
// Class objects
// ---------------------------------------------------------------------------

#[test]
fn class_objects_compare_by_template() {
    let m = model();

    let type_animal = m.interner.class_object(m.animal);
    let type_dog = m.interner.class_object(m.dog);

    assert!(m.consistent(type_dog, type_dog));
    assert!(!m.consistent(type_animal, type_dog));
    assert!(!m.consistent(type_dog, type_animal));
}

#[test]
fn type_any_accepts_only_on_the_expected_side() {
    let m = model();

    let type_any = m.interner.class_object(TypeId::ANY);
    let type_dog = m.interner.class_object(m.dog);

    assert!(m.consistent(type_any, type_dog));
    assert!(!m.consistent(type_dog, type_any));
}

#[test]
fn class_object_and_instance_never_mix() {
    let m = model();

    let type_dog = m.interner.class_object(m.dog);
    assert!(!m.consistent(type_dog, m.dog));
    assert!(!m.consistent(m.dog, type_dog));
}

#[test]
fn union_of_class_objects_still_dispatches_members() {
    let m = model();
    let core = m.core();

    let type_dog = m.interner.class_object(m.dog);
    let target = m.interner.union(vec![type_dog, core.int_ty]);
    assert!(m.consistent(target, type_dog));
    assert!(m.consistent(target, core.bool_ty));
    assert!(!m.consistent(target, m.animal));
}

// ---------------------------------------------------------------------------
// Callables
// ---------------------------------------------------------------------------

#[test]
fn callable_comparisons_are_unsupported() {
    let m = model();
    let core = m.core();

    let callable = m.interner.callable(vec![core.int_ty], core.str_ty);
    assert!(!m.consistent(callable, callable));
    assert!(!m.consistent(callable, core.int_ty));
    assert!(!m.consistent(core.int_ty, callable));

    // The dynamic type still wins: it is checked before the callable
    // rejection.
    assert!(m.consistent(TypeId::ANY, callable));
    assert!(m.consistent(callable, TypeId::ANY));
}

// ---------------------------------------------------------------------------
// Type variables fall back to equivalence
// ---------------------------------------------------------------------------

#[test]
fn type_variables_use_the_equivalence_fallback() {
    let m = model();
    let core = m.core();

    let t = m.interner.intern_string("T");
    let u = m.interner.intern_string("U");
    let t_var = m.interner.type_var(TypeParamInfo::new(t));
    let t_cov = m.interner.type_var(TypeParamInfo::covariant(t));
    let u_var = m.interner.type_var(TypeParamInfo::new(u));

    assert!(m.consistent(t_var, t_var));
    // Same name, different declared variance: loosely equivalent.
    assert!(m.consistent(t_var, t_cov));
    assert!(!m.consistent(t_var, u_var));
    assert!(!m.consistent(t_var, core.int_ty));
    assert!(!m.consistent(core.int_ty, t_var));
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn annotated_assignment_float_accepts_int_literal() {
    // x: float = 3
    let m = model();
    let core = m.core();
    assert!(m.consistent(core.float_ty, m.interner.literal_int(3)));
}

#[test]
fn annotated_assignment_int_rejects_float() {
    // x: int = 3.0
    let m = model();
    let core = m.core();
    assert!(!m.consistent(core.int_ty, core.float_ty));
}

#[test]
fn optional_parameter_called_with_none() {
    // def f(s: Optional[str]); f(None)
    let m = model();
    let core = m.core();
    assert!(m.consistent(m.interner.optional(core.str_ty), TypeId::NONE));
}

#[test]
fn assignment_between_related_classes() {
    // a: Animal = Dog()  /  d: Dog = Animal()
    let m = model();
    assert!(m.consistent(m.animal, m.dog));
    assert!(!m.consistent(m.dog, m.animal));
}

#[test]
fn self_referential_generic_terminates() {
    // class Loop[T](Sink[Loop[Loop[T]]]) with a contravariant T: checking
    // Sink[Loop[int]] against Loop[int] recurs through ever-flipping
    // argument pairs until the visited set sees a repeat.
    let m = model();
    let core = m.core();

    let t = m.interner.intern_string("T");
    let loop_def = DefId(m.defs.len() as u32 + 1);
    let t_var = m.interner.type_var(TypeParamInfo::contravariant(t));
    let loop_t = m.interner.instance(loop_def, vec![t_var]);
    let loop_loop_t = m.interner.instance(loop_def, vec![loop_t]);
    let base = m.interner.instance(m.sink_def, vec![loop_loop_t]);

    let registered = m.defs.register(ClassDef::new(
        m.interner.intern_string("Loop"),
        vec![TypeParamInfo::contravariant(t)],
        vec![base],
    ));
    assert_eq!(registered, loop_def);

    let loop_int = m.interner.instance(loop_def, vec![core.int_ty]);
    let sink_loop_int = m
        .interner
        .instance(m.sink_def, vec![m.interner.instance(loop_def, vec![core.int_ty])]);

    let mut checker = ConsistencyChecker::new(&m.interner, &m.defs);
    assert!(!checker.is_consistent(sink_loop_int, loop_int));
    // The bailout was a detected cycle, not an exhausted budget.
    assert!(!checker.depth_exceeded());
}

#[test]
fn checker_reset_clears_sticky_state() {
    let m = model();
    let core = m.core();

    let mut checker = ConsistencyChecker::with_profile(
        &m.interner,
        &m.defs,
        crate::recursion::RecursionProfile::Custom {
            max_depth: 1,
            max_iterations: 100,
        },
    );
    // One level of nesting is allowed, the inner argument check is not.
    let box_int = m.interner.instance(m.box_def, vec![core.int_ty]);
    let box_bool = m.interner.instance(m.box_def, vec![core.bool_ty]);
    assert!(!checker.is_consistent(box_int, box_bool));
    assert!(checker.depth_exceeded());

    checker.reset();
    assert!(!checker.depth_exceeded());
    assert!(checker.is_consistent(core.int_ty, core.int_ty));
}

//! Nullability predicate: does a type admit the `None` value?

use crate::db::{TypeDatabase, expect_key};
use crate::types::{TypeId, TypeKey};

/// `true` if `ty` admits `None`.
///
/// `None` and `Any` do; `Optional[...]` does regardless of what it wraps;
/// a union does when any member does. Everything else does not; a
/// placeholder with a nullable bound still reads as non-nullable here.
pub fn is_nullable(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match expect_key(db, ty) {
        TypeKey::None | TypeKey::Any => true,
        TypeKey::Optional(_) => true,
        TypeKey::Union(list) => db
            .type_list(list)
            .iter()
            .any(|&member| is_nullable(db, member)),
        TypeKey::Instance { .. }
        | TypeKey::Literal(_)
        | TypeKey::Callable(_)
        | TypeKey::TypeVar(_)
        | TypeKey::ClassObject(_) => false,
    }
}

#[cfg(test)]
#[path = "tests/nullability_tests.rs"]
mod tests;

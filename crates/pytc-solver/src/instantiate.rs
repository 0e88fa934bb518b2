//! Placeholder substitution.
//!
//! Specializes a type by replacing placeholder uses with concrete
//! arguments. Used when MRO construction pushes a base's ancestry down to
//! a subclass, and when the nominal resolver specializes an ancestor entry
//! with a subject's bound arguments.

use crate::db::{TypeDatabase, expect_key};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeId, TypeKey, TypeParamInfo, safe_bind};
use pytc_common::interner::Atom;
use rustc_hash::FxHashMap;
use tracing::warn;

/// Depth limit for a single substitution pass. Self-referential generics
/// can grow a type on every expansion; past this depth the original type
/// is returned unchanged.
pub const MAX_INSTANTIATION_DEPTH: u32 = RecursionProfile::Instantiation.max_depth();

/// A mapping from placeholder names to replacement types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a template's placeholders with a use site's bound arguments.
    /// Slots the use site left unbound read as `Any`.
    pub fn from_params(params: &[TypeParamInfo], args: &[TypeId]) -> Self {
        let mut map = FxHashMap::default();
        for (index, param) in params.iter().enumerate() {
            map.insert(param.name, safe_bind(args, index));
        }
        Self { map }
    }

    pub fn insert(&mut self, name: Atom, replacement: TypeId) {
        self.map.insert(name, replacement);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Apply a substitution to a type, rebuilding only what changes.
pub fn instantiate_type(db: &dyn TypeDatabase, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    let mut depth = DepthCounter::with_profile(RecursionProfile::Instantiation);
    instantiate_inner(db, ty, subst, &mut depth)
}

fn instantiate_inner(
    db: &dyn TypeDatabase,
    ty: TypeId,
    subst: &TypeSubstitution,
    depth: &mut DepthCounter,
) -> TypeId {
    if !depth.enter() {
        warn!(ty = ty.index(), "substitution depth limit reached");
        return ty;
    }
    let result = match expect_key(db, ty) {
        TypeKey::Any | TypeKey::None | TypeKey::Literal(_) => ty,
        TypeKey::TypeVar(info) => subst.get(info.name).unwrap_or(ty),
        TypeKey::Instance { def, args } => {
            let members = db.type_list(args);
            let new_args = members
                .iter()
                .map(|&arg| instantiate_inner(db, arg, subst, depth))
                .collect();
            db.instance(def, new_args)
        }
        TypeKey::Optional(inner) => {
            let new_inner = instantiate_inner(db, inner, subst, depth);
            db.optional(new_inner)
        }
        TypeKey::Union(list) => {
            let members = db.type_list(list);
            let new_members = members
                .iter()
                .map(|&member| instantiate_inner(db, member, subst, depth))
                .collect();
            db.union(new_members)
        }
        TypeKey::Callable(id) => {
            let shape = db.callable_shape(id);
            let params = db.type_list(shape.params);
            let new_params = params
                .iter()
                .map(|&param| instantiate_inner(db, param, subst, depth))
                .collect();
            let new_ret = instantiate_inner(db, shape.ret, subst, depth);
            db.callable(new_params, new_ret)
        }
        TypeKey::ClassObject(inner) => {
            let new_inner = instantiate_inner(db, inner, subst, depth);
            db.class_object(new_inner)
        }
    };
    depth.leave();
    result
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;

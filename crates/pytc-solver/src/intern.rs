//! Type interning for structural deduplication.
//!
//! Converts [`TypeKey`] structures into lightweight [`TypeId`] handles.
//!
//! Benefits:
//! - O(1) type equality (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Cache-friendly (work with u32 handles instead of heap objects)
//!
//! The tables sit behind `RwLock`s so construction can run behind `&self`;
//! once the resolution pipeline finishes, queries only ever take read locks.

use crate::db::{TypeDatabase, expect_key};
use crate::def::DefinitionStore;
use crate::types::{
    Arity, CallableId, CallableShape, TypeId, TypeKey, TypeListId, safe_bind,
};
use pytc_common::interner::{Atom, ShardedInterner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::{Arc, RwLock};

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

#[derive(Default)]
struct TypeTable {
    map: FxHashMap<TypeKey, TypeId>,
    keys: Vec<TypeKey>,
}

#[derive(Default)]
struct ListTable {
    map: FxHashMap<Arc<[TypeId]>, TypeListId>,
    lists: Vec<Arc<[TypeId]>>,
}

#[derive(Default)]
struct CallableTable {
    map: FxHashMap<CallableShape, CallableId>,
    shapes: Vec<CallableShape>,
}

/// The concrete type store.
///
/// `Any` and `None` are pre-registered at fixed ids so `TypeId::ANY` and
/// `TypeId::NONE` are valid from the moment the interner exists.
pub struct TypeInterner {
    types: RwLock<TypeTable>,
    lists: RwLock<ListTable>,
    callables: RwLock<CallableTable>,
    atoms: ShardedInterner,
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut table = TypeTable::default();
        for key in [TypeKey::Any, TypeKey::None] {
            let id = TypeId(table.keys.len() as u32);
            table.keys.push(key);
            table.map.insert(key, id);
        }
        debug_assert_eq!(table.map[&TypeKey::Any], TypeId::ANY);
        debug_assert_eq!(table.map[&TypeKey::None], TypeId::NONE);

        let atoms = ShardedInterner::new();
        atoms.intern_common();

        TypeInterner {
            types: RwLock::new(table),
            lists: RwLock::new(ListTable::default()),
            callables: RwLock::new(CallableTable::default()),
            atoms,
        }
    }

    /// Number of distinct interned types.
    pub fn type_count(&self) -> usize {
        self.types.read().map(|t| t.keys.len()).unwrap_or(0)
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase for TypeInterner {
    fn intern(&self, key: TypeKey) -> TypeId {
        if let Ok(table) = self.types.read() {
            if let Some(&id) = table.map.get(&key) {
                return id;
            }
        }
        let mut table = self.types.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&id) = table.map.get(&key) {
            return id;
        }
        let id = TypeId(table.keys.len() as u32);
        table.keys.push(key);
        table.map.insert(key, id);
        id
    }

    fn lookup(&self, id: TypeId) -> Option<TypeKey> {
        let table = self.types.read().ok()?;
        table.keys.get(id.0 as usize).copied()
    }

    fn intern_string(&self, s: &str) -> Atom {
        self.atoms.intern(s)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.atoms.resolve(atom)
    }

    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId {
        let buffer: TypeListBuffer = items.into_iter().collect();
        if let Ok(table) = self.lists.read() {
            if let Some(&id) = table.map.get(buffer.as_slice()) {
                return id;
            }
        }
        let mut table = self.lists.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&id) = table.map.get(buffer.as_slice()) {
            return id;
        }
        let id = TypeListId(table.lists.len() as u32);
        let shared: Arc<[TypeId]> = buffer.into_vec().into();
        table.lists.push(shared.clone());
        table.map.insert(shared, id);
        id
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let table = self.lists.read().unwrap_or_else(|e| e.into_inner());
        table
            .lists
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    fn intern_callable(&self, shape: CallableShape) -> CallableId {
        if let Ok(table) = self.callables.read() {
            if let Some(&id) = table.map.get(&shape) {
                return id;
            }
        }
        let mut table = self.callables.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&id) = table.map.get(&shape) {
            return id;
        }
        let id = CallableId(table.shapes.len() as u32);
        table.shapes.push(shape);
        table.map.insert(shape, id);
        id
    }

    fn callable_shape(&self, id: CallableId) -> CallableShape {
        let table = self.callables.read().unwrap_or_else(|e| e.into_inner());
        table
            .shapes
            .get(id.0 as usize)
            .copied()
            .unwrap_or(CallableShape {
                params: TypeListId(0),
                ret: TypeId::ANY,
            })
    }
}

/// Strict structural identity: exact match, no leniency of any kind.
///
/// Interning is canonical, so identity is id equality.
#[inline]
pub fn are_types_identical(_db: &dyn TypeDatabase, left: TypeId, right: TypeId) -> bool {
    left == right
}

/// Loose structural equivalence.
///
/// Differences that the model treats as spelling rather than substance are
/// ignored: instance arguments missing on one side read as `Any`,
/// `Optional[T]` matches `T | None`, and unions match as member sets.
pub fn are_types_equivalent(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    left: TypeId,
    right: TypeId,
) -> bool {
    if left == right {
        return true;
    }
    match (expect_key(db, left), expect_key(db, right)) {
        (
            TypeKey::Instance { def: ld, args: la },
            TypeKey::Instance { def: rd, args: ra },
        ) => {
            if ld != rd {
                return false;
            }
            let left_args = db.type_list(la);
            let right_args = db.type_list(ra);
            let width = match defs.class_def(ld).arity {
                Arity::Fixed(n) => n as usize,
                Arity::Unbounded => {
                    if left_args.len() != right_args.len() {
                        return false;
                    }
                    left_args.len()
                }
            };
            (0..width).all(|i| {
                are_types_equivalent(
                    db,
                    defs,
                    safe_bind(&left_args, i),
                    safe_bind(&right_args, i),
                )
            })
        }
        (TypeKey::Optional(inner), TypeKey::Union(list))
        | (TypeKey::Union(list), TypeKey::Optional(inner)) => {
            let members = db.type_list(list);
            members.len() == 2
                && members.contains(&TypeId::NONE)
                && members
                    .iter()
                    .filter(|&&m| m != TypeId::NONE)
                    .all(|&m| are_types_equivalent(db, defs, inner, m))
        }
        (TypeKey::Optional(li), TypeKey::Optional(ri)) => are_types_equivalent(db, defs, li, ri),
        (TypeKey::Union(ll), TypeKey::Union(rl)) => {
            let left_members = db.type_list(ll);
            let right_members = db.type_list(rl);
            left_members.len() == right_members.len()
                && left_members
                    .iter()
                    .all(|&l| right_members.iter().any(|&r| are_types_equivalent(db, defs, l, r)))
                && right_members
                    .iter()
                    .all(|&r| left_members.iter().any(|&l| are_types_equivalent(db, defs, l, r)))
        }
        (TypeKey::TypeVar(l), TypeKey::TypeVar(r)) => l.name == r.name,
        (TypeKey::ClassObject(li), TypeKey::ClassObject(ri)) => {
            are_types_equivalent(db, defs, li, ri)
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;

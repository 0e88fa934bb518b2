//! Type database abstraction for the solver.
//!
//! This trait isolates solver logic from concrete storage so components
//! depend on queries, not on the interner's tables.

use crate::diagnostics::model_defect;
use crate::types::{CallableId, CallableShape, LiteralValue, TypeId, TypeKey, TypeListId, TypeParamInfo};
use pytc_common::interner::Atom;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Query interface for the solver.
///
/// The primitive methods are implemented by [`crate::TypeInterner`]; the
/// constructors are derived from them and shared by every implementation.
pub trait TypeDatabase {
    fn intern(&self, key: TypeKey) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeKey>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;
    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn intern_callable(&self, shape: CallableShape) -> CallableId;
    fn callable_shape(&self, id: CallableId) -> CallableShape;

    /// Intern an instance of `def` with the given bound arguments.
    fn instance(&self, def: crate::def::DefId, args: Vec<TypeId>) -> TypeId {
        let args = self.intern_type_list(args);
        self.intern(TypeKey::Instance { def, args })
    }

    fn optional(&self, inner: TypeId) -> TypeId {
        self.intern(TypeKey::Optional(inner))
    }

    /// Intern a union with the canonical member list: nested unions are
    /// flattened, duplicates dropped, and members sorted, so equal unions
    /// always share a `TypeId`. A union containing `Any` collapses to
    /// `Any`; a single surviving member is returned as-is.
    ///
    /// An empty member list is a model defect: the resolution pipeline
    /// never produces one.
    fn union(&self, members: Vec<TypeId>) -> TypeId {
        if members.is_empty() {
            model_defect("empty union");
        }
        let mut flat: indexmap::IndexSet<TypeId, rustc_hash::FxBuildHasher> =
            indexmap::IndexSet::default();
        let mut stack: Vec<TypeId> = members;
        stack.reverse();
        while let Some(member) = stack.pop() {
            match self.lookup(member) {
                Some(TypeKey::Any) => return TypeId::ANY,
                Some(TypeKey::Union(list)) => {
                    let nested = self.type_list(list);
                    stack.extend(nested.iter().rev().copied());
                }
                _ => {
                    flat.insert(member);
                }
            }
        }
        let mut canonical: Vec<TypeId> = flat.into_iter().collect();
        canonical.sort_unstable();
        match canonical.len() {
            0 => model_defect("union flattened to nothing"),
            1 => canonical[0],
            _ => {
                let list = self.intern_type_list(canonical);
                self.intern(TypeKey::Union(list))
            }
        }
    }

    fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union(vec![left, right])
    }

    fn literal_int(&self, value: i64) -> TypeId {
        self.intern(TypeKey::Literal(LiteralValue::Int(value)))
    }

    fn literal_bool(&self, value: bool) -> TypeId {
        self.intern(TypeKey::Literal(LiteralValue::Bool(value)))
    }

    fn literal_str(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeKey::Literal(LiteralValue::Str(atom)))
    }

    fn callable(&self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        let params = self.intern_type_list(params);
        let id = self.intern_callable(CallableShape { params, ret });
        self.intern(TypeKey::Callable(id))
    }

    fn type_var(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeKey::TypeVar(info))
    }

    fn class_object(&self, inner: TypeId) -> TypeId {
        self.intern(TypeKey::ClassObject(inner))
    }
}

/// Look up a key that the model guarantees to exist.
///
/// A dangling `TypeId` means the model handed out an id it never interned.
pub(crate) fn expect_key(db: &dyn TypeDatabase, id: TypeId) -> TypeKey {
    match db.lookup(id) {
        Some(key) => key,
        None => model_defect(&format!("dangling TypeId({})", id.index())),
    }
}

/// Memoization table for completed relation queries.
///
/// Results are only inserted once a top-level query has fully finished,
/// never mid-recursion, so cycle-policy outcomes are stable.
pub struct RelationCache<K: Hash + Eq> {
    entries: RwLock<FxHashMap<K, bool>>,
}

impl<K: Hash + Eq> RelationCache<K> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn get(&self, key: &K) -> Option<bool> {
        self.entries.read().ok()?.get(key).copied()
    }

    pub fn insert(&self, key: K, related: bool) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, related);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl<K: Hash + Eq> Default for RelationCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

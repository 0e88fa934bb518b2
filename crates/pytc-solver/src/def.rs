//! Class template identifiers and storage.
//!
//! The resolution pipeline registers every class template here before any
//! query runs; afterwards the store is read-only. `DefId` is owned by the
//! solver so templates can be created and tested without a binder.

use crate::db::TypeDatabase;
use crate::diagnostics::model_defect;
use crate::mro::{self, MroError};
use crate::types::{Arity, LiteralValue, TypeId, TypeParamInfo};
use dashmap::DashMap;
use pytc_common::interner::Atom;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Solver-owned class template identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `DefId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// A nominal type constructor: name, placeholders, and direct bases.
///
/// Bases are instance types over other templates, expressed in this
/// template's own placeholders.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    pub arity: Arity,
    pub bases: Vec<TypeId>,
}

impl ClassDef {
    /// A template with fixed arity equal to its placeholder count.
    pub fn new(name: Atom, type_params: Vec<TypeParamInfo>, bases: Vec<TypeId>) -> Self {
        let arity = Arity::Fixed(type_params.len() as u32);
        Self {
            name,
            type_params,
            arity,
            bases,
        }
    }

    /// A variadic template (tuple-like): uses may bind any number of
    /// arguments, all compared under `param`'s variance.
    pub fn variadic(name: Atom, param: TypeParamInfo, bases: Vec<TypeId>) -> Self {
        Self {
            name,
            type_params: vec![param],
            arity: Arity::Unbounded,
            bases,
        }
    }
}

/// The builtin templates every model starts from.
///
/// The numeric tower is ordinary ancestry: `bool` extends `int`, `int`
/// extends `float`, `float` extends `complex`. Nominal subtyping then
/// produces the numeric promotions in one direction with no special logic.
#[derive(Clone, Debug)]
pub struct CoreDefs {
    pub object: DefId,
    pub complex: DefId,
    pub float: DefId,
    pub int: DefId,
    pub bool: DefId,
    pub str: DefId,
    pub tuple: DefId,

    pub object_ty: TypeId,
    pub complex_ty: TypeId,
    pub float_ty: TypeId,
    pub int_ty: TypeId,
    pub bool_ty: TypeId,
    pub str_ty: TypeId,
}

/// Registry of class templates plus the memoized linearized ancestry.
pub struct DefinitionStore {
    defs: DashMap<DefId, Arc<ClassDef>>,
    mros: DashMap<DefId, Arc<[TypeId]>>,
    next_id: AtomicU32,
    core: CoreDefs,
}

impl DefinitionStore {
    /// Create a store with the builtin templates registered.
    pub fn new(db: &dyn TypeDatabase) -> Self {
        let mut store = Self {
            defs: DashMap::new(),
            mros: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
            core: CoreDefs {
                object: DefId::INVALID,
                complex: DefId::INVALID,
                float: DefId::INVALID,
                int: DefId::INVALID,
                bool: DefId::INVALID,
                str: DefId::INVALID,
                tuple: DefId::INVALID,
                object_ty: TypeId::ANY,
                complex_ty: TypeId::ANY,
                float_ty: TypeId::ANY,
                int_ty: TypeId::ANY,
                bool_ty: TypeId::ANY,
                str_ty: TypeId::ANY,
            },
        };

        let object = store.register(ClassDef::new(db.intern_string("object"), vec![], vec![]));
        let object_ty = db.instance(object, vec![]);

        let complex = store.register(ClassDef::new(
            db.intern_string("complex"),
            vec![],
            vec![object_ty],
        ));
        let complex_ty = db.instance(complex, vec![]);

        let float = store.register(ClassDef::new(
            db.intern_string("float"),
            vec![],
            vec![complex_ty],
        ));
        let float_ty = db.instance(float, vec![]);

        let int = store.register(ClassDef::new(
            db.intern_string("int"),
            vec![],
            vec![float_ty],
        ));
        let int_ty = db.instance(int, vec![]);

        let bool_def = store.register(ClassDef::new(
            db.intern_string("bool"),
            vec![],
            vec![int_ty],
        ));
        let bool_ty = db.instance(bool_def, vec![]);

        let str_def = store.register(ClassDef::new(
            db.intern_string("str"),
            vec![],
            vec![object_ty],
        ));
        let str_ty = db.instance(str_def, vec![]);

        let tuple = store.register(ClassDef::variadic(
            db.intern_string("tuple"),
            TypeParamInfo::covariant(db.intern_string("T")),
            vec![object_ty],
        ));

        store.core = CoreDefs {
            object,
            complex,
            float,
            int,
            bool: bool_def,
            str: str_def,
            tuple,
            object_ty,
            complex_ty,
            float_ty,
            int_ty,
            bool_ty,
            str_ty,
        };
        store
    }

    /// Register a class template.
    ///
    /// Rejects templates that violate model invariants: a fixed arity
    /// disagreeing with the placeholder count, a variadic template with no
    /// placeholder to supply the shared variance rule, or a placeholder
    /// carrying both a bound and a constraint set.
    pub fn register(&self, def: ClassDef) -> DefId {
        match def.arity {
            Arity::Fixed(n) => {
                if n as usize != def.type_params.len() {
                    model_defect("fixed arity disagrees with placeholder count");
                }
            }
            Arity::Unbounded => {
                if def.type_params.is_empty() {
                    model_defect("variadic template declares no placeholder");
                }
            }
        }
        for param in &def.type_params {
            if param.bound.is_some() && param.constraints.is_some() {
                model_defect("placeholder carries both a bound and a constraint set");
            }
        }

        let id = DefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(def = id.0, name = def.name.index(), "registered class template");
        self.defs.insert(id, Arc::new(def));
        id
    }

    pub fn try_class_def(&self, id: DefId) -> Option<Arc<ClassDef>> {
        self.defs.get(&id).map(|entry| entry.value().clone())
    }

    /// Look up a template the model guarantees to exist.
    pub fn class_def(&self, id: DefId) -> Arc<ClassDef> {
        self.try_class_def(id)
            .unwrap_or_else(|| model_defect(&format!("unknown DefId({})", id.0)))
    }

    /// The builtin templates.
    pub fn core(&self) -> &CoreDefs {
        &self.core
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The runtime class a literal widens to.
    pub fn literal_class(&self, literal: LiteralValue) -> DefId {
        match literal {
            LiteralValue::Int(_) => self.core.int,
            LiteralValue::Bool(_) => self.core.bool,
            LiteralValue::Str(_) => self.core.str,
        }
    }

    /// Linearized ancestry of a template: the class itself excluded,
    /// nearest ancestor first. Memoized after the first computation.
    ///
    /// A hierarchy that cannot be linearized is a model defect here; use
    /// [`try_mro`](Self::try_mro) to observe the error instead.
    pub fn mro(&self, db: &dyn TypeDatabase, id: DefId) -> Arc<[TypeId]> {
        match self.try_mro(db, id) {
            Ok(mro) => mro,
            Err(error) => model_defect(&format!(
                "unresolvable ancestry for DefId({}): {error:?}",
                id.0
            )),
        }
    }

    /// Fallible form of [`mro`](Self::mro).
    pub fn try_mro(&self, db: &dyn TypeDatabase, id: DefId) -> Result<Arc<[TypeId]>, MroError> {
        if let Some(cached) = self.cached_mro(id) {
            return Ok(cached);
        }
        mro::linearize(db, self, id)
    }

    pub(crate) fn cached_mro(&self, id: DefId) -> Option<Arc<[TypeId]>> {
        self.mros.get(&id).map(|entry| entry.value().clone())
    }

    pub(crate) fn cache_mro(&self, id: DefId, mro: Arc<[TypeId]>) {
        self.mros.insert(id, mro);
    }
}

#[cfg(test)]
#[path = "tests/def_tests.rs"]
mod tests;

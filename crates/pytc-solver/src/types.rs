//! Core type representation.
//!
//! Every type the solver reasons about is an interned [`TypeId`] backed by a
//! [`TypeKey`] structure. The enum is closed: the consistency engine matches
//! on it exhaustively, so adding a variant forces every dispatch site to be
//! revisited at compile time.

use crate::def::DefId;
use pytc_common::interner::Atom;
use serde::Serialize;

/// Interned type handle.
///
/// TypeIds are cheap to copy and compare; two types are structurally
/// identical exactly when their ids are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The dynamic type. Consistent with everything, in both directions.
    pub const ANY: TypeId = TypeId(0);

    /// The type of the `None` value.
    pub const NONE: TypeId = TypeId(1);

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Interned list of types (union members, bound arguments, parameters).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeListId(pub u32);

/// Interned callable signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CallableId(pub u32);

/// Declared variance of a generic placeholder.
///
/// Determines how consistency of a bound argument relates to consistency of
/// the enclosing instance:
/// - `Invariant`: the arguments must be structurally identical
/// - `Covariant`: follows the argument's own consistency direction
/// - `Contravariant`: reverses it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

/// Number of type parameters a template accepts.
///
/// `Unbounded` marks variadic constructors such as `tuple`, whose uses may
/// bind any number of arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    Fixed(u32),
    Unbounded,
}

/// A generic placeholder declared by a class template.
///
/// A placeholder carries either an upper bound or a constraint set, never
/// both; `DefinitionStore::register` rejects templates that violate this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub variance: Variance,
    pub bound: Option<TypeId>,
    pub constraints: Option<TypeListId>,
}

impl TypeParamInfo {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            variance: Variance::Invariant,
            bound: None,
            constraints: None,
        }
    }

    pub fn covariant(name: Atom) -> Self {
        Self {
            variance: Variance::Covariant,
            ..Self::new(name)
        }
    }

    pub fn contravariant(name: Atom) -> Self {
        Self {
            variance: Variance::Contravariant,
            ..Self::new(name)
        }
    }

    pub fn with_bound(mut self, bound: TypeId) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_constraints(mut self, constraints: TypeListId) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

/// A literal value together with its runtime class.
///
/// The runtime class is recovered through `DefinitionStore::literal_class`
/// when a literal has to widen to an ordinary instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    Str(Atom),
}

/// The closed structural representation behind every [`TypeId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// The dynamic type.
    Any,

    /// The type of `None`.
    None,

    /// A class instance: template plus bound arguments.
    ///
    /// The argument list may be shorter than the template's arity; missing
    /// slots read as `Any` (see [`safe_bind`]).
    Instance { def: DefId, args: TypeListId },

    /// `Optional[T]`. Kept as its own head rather than desugared to a
    /// union because the engine treats the two differently on the
    /// actual side of a check.
    Optional(TypeId),

    /// Flattened union of at least two distinct members.
    Union(TypeListId),

    /// A literal value type.
    Literal(LiteralValue),

    /// A callable signature. Comparisons involving callables are
    /// unsupported and always fail.
    Callable(CallableId),

    /// A generic placeholder used as a type.
    TypeVar(TypeParamInfo),

    /// The class object itself (`type[C]`), as opposed to an instance of
    /// the class. Wraps the instance type, or `Any` for `type[Any]`.
    ClassObject(TypeId),
}

/// A callable signature: positional parameter types and a return type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallableShape {
    pub params: TypeListId,
    pub ret: TypeId,
}

/// Read the i-th bound argument of an instance, or `Any` when the use
/// site left the slot unspecified.
#[inline]
pub fn safe_bind(args: &[TypeId], index: usize) -> TypeId {
    args.get(index).copied().unwrap_or(TypeId::ANY)
}

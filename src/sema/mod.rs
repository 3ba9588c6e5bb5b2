// src/sema/mod.rs
//! Type model and structural checker.
//!
//! Types are interned in a [`TypeArena`] and referenced by [`TypeId`]; a
//! [`Value`] is a type handle plus an optional literal payload and the
//! source context it came from. The [`Checker`] owns the arena, the
//! conformance cache and the builtin catalog, and answers the questions
//! the compiler asks: does this value fit that type, what is this member,
//! what does this call return, can this value cross a thread boundary.

pub mod builtin;
pub mod builtins;
pub mod checker;
pub mod class;
pub mod conformance;
pub mod declared;
pub mod function;
pub mod notation;
pub mod type_arena;
pub mod value;

pub use builtin::BuiltinType;
pub use builtins::WellKnown;
pub use checker::Checker;
pub use class::{ClassTarget, ClassType, CustomConstruct};
pub use conformance::{ConformanceCache, InterfaceDef, InterfaceId, Requirement};
pub use declared::{Access, ClassDecl, ClassDef, ClassDefId, InterfaceDecl, Member};
pub use function::{CustomReturn, FunctionType, Signature};
pub use notation::{parse_type, parse_type_list};
pub use type_arena::{EventKind, ObjectShape, PromiseContent, TypeArena, TypeId, TypeKind, TypedArrayKind};
pub use value::{Literal, Value};

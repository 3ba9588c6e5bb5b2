// src/sema/checker/mod.rs
//
// The structural compatibility checker.
//
// `Checker` owns everything a compilation unit's checks share: the type
// arena, the conformance cache and the configuration. It is passed around
// explicitly; there is no global state, so independent units can each own
// one.
//
// `check(expected, actual)` answers "may a value of `actual` flow where
// `expected` is required". The dispatch order is:
//   1. identical ids (interning makes this structural equality)
//   2. `any` on either side
//   3. literals (payloads must be equal; non-literal targets widen)
//   4. functions and classes (overload-list comparison)
//   5. structural interfaces (conformance cache)
//   6. same-shape prototypes (containers.rs), else one parent link up

mod boundary;
mod containers;
mod members;

use crate::config::CheckerConfig;
use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::builtins::WellKnown;
use crate::sema::class::CustomConstructFn;
use crate::sema::conformance::{ConformanceCache, Requirement};
use crate::sema::function::CustomReturnFn;
use crate::sema::type_arena::{TypeArena, TypeId, TypeKind};
use crate::sema::value::Value;

pub struct Checker {
    pub(crate) arena: TypeArena,
    pub(crate) conformance: ConformanceCache,
    pub(crate) config: CheckerConfig,
    pub(crate) well_known: WellKnown,
    pub(crate) custom_returns: Vec<CustomReturnFn>,
    pub(crate) custom_classes: Vec<CustomConstructFn>,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("arena", &self.arena)
            .field("conformance", &self.conformance)
            .field("config", &self.config)
            .field("custom_returns", &self.custom_returns.len())
            .field("custom_classes", &self.custom_classes.len())
            .finish()
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Self {
        let mut arena = TypeArena::new();
        let well_known = WellKnown::register(&mut arena);
        Self {
            arena,
            conformance: ConformanceCache::new(),
            config,
            well_known,
            custom_returns: Vec::new(),
            custom_classes: Vec::new(),
        }
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut TypeArena {
        &mut self.arena
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn conformance(&self) -> &ConformanceCache {
        &self.conformance
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    /// Fold another unit's cache into this one. Both must index this arena.
    pub fn merge_conformance(&mut self, other: ConformanceCache) {
        self.conformance.merge(other);
    }

    pub fn display(&self, id: TypeId) -> String {
        self.arena.display(id)
    }

    pub(crate) fn mismatch(&self, expected: TypeId, actual: TypeId, ctx: &Context) -> TypeError {
        TypeError::mismatch(self.arena.display(expected), self.arena.display(actual), ctx)
    }

    pub(crate) fn missing_member(&self, owner: TypeId, member: &str, ctx: &Context) -> TypeError {
        TypeError::new(
            CheckError::MissingMember {
                owner: self.arena.display(owner),
                member: member.to_string(),
            },
            ctx,
        )
    }

    // ========================================================================
    // Check
    // ========================================================================

    /// May a value of type `actual` be used where `expected` is required?
    pub fn check(&mut self, expected: TypeId, actual: TypeId, ctx: &Context) -> Result<(), TypeError> {
        self.check_at(expected, actual, ctx, 0)
    }

    /// `check` on values; literal payloads take part.
    pub fn check_value(
        &mut self,
        expected: &Value,
        actual: &Value,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        let expected = self.arena.value_type(expected);
        let actual = self.arena.value_type(actual);
        self.check(expected, actual, ctx)
    }

    /// `depth` counts parent links followed so far on this chain.
    pub(crate) fn check_at(
        &mut self,
        expected: TypeId,
        actual: TypeId,
        ctx: &Context,
        depth: usize,
    ) -> Result<(), TypeError> {
        if expected == actual || expected.is_any() {
            return Ok(());
        }
        if actual.is_any() {
            if self.config.strict_any_arguments {
                return Err(self.mismatch(expected, actual, ctx));
            }
            return Ok(());
        }

        let expected_kind = self.arena.get(expected).clone();
        let actual_kind = self.arena.get(actual).clone();

        match (&expected_kind, &actual_kind) {
            (
                TypeKind::Literal {
                    base: expected_base,
                    value: expected_value,
                },
                TypeKind::Literal {
                    base: actual_base,
                    value: actual_value,
                },
            ) => {
                if expected_value != actual_value {
                    return Err(self.literal_mismatch(expected, actual, ctx));
                }
                self.check_at(*expected_base, *actual_base, ctx, depth)
            }
            (TypeKind::Literal { .. }, _) => Err(self.literal_mismatch(expected, actual, ctx)),
            (_, TypeKind::Literal { base, .. }) => self.check_at(expected, *base, ctx, depth),

            (TypeKind::Function(e), TypeKind::Function(a)) => {
                self.check_function((expected, e), (actual, a), ctx)
            }
            (TypeKind::Class(e), TypeKind::Class(a)) => self.check_class(e, a, ctx),
            (TypeKind::Function(_) | TypeKind::Class(_), _)
            | (_, TypeKind::Function(_) | TypeKind::Class(_)) => {
                Err(self.mismatch(expected, actual, ctx))
            }

            (TypeKind::Interface(interface), _) => {
                self.check_interface(expected, *interface, actual, ctx)
            }
            (_, TypeKind::Interface(_)) => Err(self.mismatch(expected, actual, ctx)),

            _ => match self.check_same_shape(expected, &expected_kind, actual, &actual_kind, ctx) {
                Some(result) => result,
                None => self.check_parent(expected, actual, ctx, depth),
            },
        }
    }

    fn literal_mismatch(&self, expected: TypeId, actual: TypeId, ctx: &Context) -> TypeError {
        TypeError::new(
            CheckError::LiteralMismatch {
                expected: self.arena.display(expected),
                found: self.arena.display(actual),
            },
            ctx,
        )
    }

    /// Retry `expected` against `actual`'s parent. The error names the
    /// original `actual`, not the ancestor that was tried last.
    pub(crate) fn check_parent(
        &mut self,
        expected: TypeId,
        actual: TypeId,
        ctx: &Context,
        depth: usize,
    ) -> Result<(), TypeError> {
        if depth >= self.config.max_parent_depth {
            tracing::warn!(
                actual = %self.arena.display(actual),
                depth,
                "parent chain exceeds max_parent_depth"
            );
            return Err(TypeError::new(
                CheckError::ParentChainTooDeep {
                    type_name: self.arena.display(actual),
                    depth,
                },
                ctx,
            ));
        }

        let Some(parent) = self.parent_of(actual) else {
            return Err(self.mismatch(expected, actual, ctx));
        };
        tracing::trace!(
            expected = %self.arena.display(expected),
            actual = %self.arena.display(actual),
            parent = %self.arena.display(parent),
            "check_parent"
        );
        match self.check_at(expected, parent, ctx, depth + 1) {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.error, CheckError::ParentChainTooDeep { .. }) => Err(e),
            Err(_) => Err(self.mismatch(expected, actual, ctx)),
        }
    }

    /// The single parent link of a prototype.
    ///
    /// Generic shapes derive theirs: a tuple is an `Array` of its common
    /// element type, a typed array an `Array` of its element type, a
    /// specialised event the more general event with the same target.
    pub fn parent_of(&mut self, id: TypeId) -> Option<TypeId> {
        match self.arena.get(id).clone() {
            TypeKind::Builtin(b) => b.parent().map(TypeId::builtin),
            TypeKind::Tuple(items) => {
                let common = match items {
                    Some(items) => self.common_type(&items),
                    None => TypeId::ANY,
                };
                Some(self.arena.array(Some(common)))
            }
            TypeKind::TypedArray(kind) => Some(self.arena.array(Some(kind.element()))),
            TypeKind::Event { kind, target } => {
                let parent = kind.parent()?;
                Some(self.arena.event(parent, target))
            }
            TypeKind::Declared(class) => self.arena.class_def(class).parent,
            TypeKind::Literal { base, .. } => Some(base),
            _ => None,
        }
    }

    // ========================================================================
    // Common value
    // ========================================================================

    /// The first (widened) type that accepts all others, `any` if none does.
    pub fn common_value(&mut self, values: &[Value], ctx: &Context) -> Value {
        let types: Vec<TypeId> = values.iter().map(|v| self.arena.value_type(v)).collect();
        let common = self.common_type(&types);
        Value::new(common, ctx)
    }

    pub(crate) fn common_type(&mut self, types: &[TypeId]) -> TypeId {
        match types {
            [] => TypeId::ANY,
            [only] => self.arena.widen(*only),
            _ => {
                let ctx = Context::dummy();
                for candidate in types {
                    let candidate = self.arena.widen(*candidate);
                    let accepts_all = types
                        .iter()
                        .all(|other| self.check(candidate, *other, &ctx).is_ok());
                    if accepts_all {
                        return candidate;
                    }
                }
                TypeId::ANY
            }
        }
    }

    // ========================================================================
    // Universality
    // ========================================================================

    /// May values of this type cross a serialization boundary?
    ///
    /// Primitives are universal by declaration; containers and objects are
    /// universal when everything they hold is; host types never are. An
    /// interface is universal when all its known implementations are.
    pub fn is_universal(&self, id: TypeId) -> bool {
        match self.arena.get(id) {
            TypeKind::Any => false,
            TypeKind::Builtin(b) => b.is_universal(),
            TypeKind::Literal { base, .. } => self.is_universal(*base),
            TypeKind::Array(content) | TypeKind::Set(content) => {
                content.is_some_and(|c| self.is_universal(c))
            }
            TypeKind::Map { key, item } => {
                key.is_some_and(|k| self.is_universal(k)) && item.is_some_and(|i| self.is_universal(i))
            }
            TypeKind::Tuple(items) => items
                .as_ref()
                .is_some_and(|items| items.iter().all(|i| self.is_universal(*i))),
            TypeKind::TypedArray(_) => true,
            TypeKind::Object(shape) => match (&shape.members, shape.common) {
                (Some(members), _) if !members.is_empty() => {
                    members.iter().all(|(_, m)| self.is_universal(*m))
                }
                (_, Some(common)) => self.is_universal(common),
                _ => false,
            },
            TypeKind::Promise(_)
            | TypeKind::Request(_)
            | TypeKind::Event { .. }
            | TypeKind::Function(_)
            | TypeKind::Class(_) => false,
            TypeKind::Interface(interface) => match &self.arena.interface_def(*interface).requirement {
                Requirement::Members { .. } => self
                    .conformance
                    .implementations(*interface)
                    .iter()
                    .all(|proto| self.is_universal(*proto)),
                Requirement::OneOf(candidates) => candidates.iter().all(|c| self.is_universal(*c)),
            },
            TypeKind::Declared(class) => self.arena.class_def(*class).universal,
        }
    }

    /// Opt-in flag of interfaces designated for RPC.
    pub fn is_rpc(&self, id: TypeId) -> bool {
        match self.arena.get(id) {
            TypeKind::Interface(interface) => self.arena.interface_def(*interface).is_rpc,
            _ => false,
        }
    }
}

// src/sema/conformance.rs
//
// Structural interfaces and the conformance cache.
//
// Conformance is proven in two explicit phases:
//   1. `structurally_compatible` is a query: every getter must be present
//      and compatible, every setter assignable (or absent on a prototype
//      open to stamping). Nothing is recorded.
//   2. `register_conformance` appends the pair to the cache and stamps the
//      setter types the prototype didn't declare. Only `check_interface`
//      calls it, after phase 1 succeeded.
//
// Once registered, a pair is never compared again.

use hashbrown::HashMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::checker::Checker;
use crate::sema::type_arena::{TypeId, TypeKind};
use crate::sema::value::Value;

/// Index into the arena's interface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(u32);

impl InterfaceId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a prototype must offer to satisfy an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Duck typing over named members.
    Members {
        getters: Vec<(String, TypeId)>,
        setters: Vec<(String, TypeId)>,
    },
    /// Satisfied by any of a fixed list of types (`CanvasImageSource`).
    OneOf(Vec<TypeId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDef {
    pub name: String,
    pub requirement: Requirement,
    pub extends: Vec<InterfaceId>,
    pub is_rpc: bool,
}

impl InterfaceDef {
    pub fn getter(&self, key: &str) -> Option<TypeId> {
        match &self.requirement {
            Requirement::Members { getters, .. } => {
                getters.iter().find(|(k, _)| k == key).map(|(_, t)| *t)
            }
            Requirement::OneOf(_) => None,
        }
    }

    pub fn setter(&self, key: &str) -> Option<TypeId> {
        match &self.requirement {
            Requirement::Members { setters, .. } => {
                setters.iter().find(|(k, _)| k == key).map(|(_, t)| *t)
            }
            Requirement::OneOf(_) => None,
        }
    }
}

/// Memo of proven `(interface, prototype)` pairs, plus the member types
/// stamped onto prototypes when they were registered.
///
/// Append-only. Registering a pair twice is a no-op, so two units that
/// discover the same conformance can be merged without duplicates.
#[derive(Debug, Clone, Default)]
pub struct ConformanceCache {
    implementations: FxHashMap<InterfaceId, Vec<TypeId>>,
    proven: FxHashSet<(InterfaceId, TypeId)>,
    rejected: FxHashSet<(InterfaceId, TypeId)>,
    stamps: FxHashMap<TypeId, HashMap<String, TypeId>>,
    comparisons: usize,
}

impl ConformanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_proven(&self, interface: InterfaceId, proto: TypeId) -> bool {
        self.proven.contains(&(interface, proto))
    }

    pub fn is_rejected(&self, interface: InterfaceId, proto: TypeId) -> bool {
        self.rejected.contains(&(interface, proto))
    }

    /// Returns false if the pair was already registered.
    pub fn register(&mut self, interface: InterfaceId, proto: TypeId) -> bool {
        if !self.proven.insert((interface, proto)) {
            return false;
        }
        self.rejected.remove(&(interface, proto));
        self.implementations.entry(interface).or_default().push(proto);
        true
    }

    pub fn reject(&mut self, interface: InterfaceId, proto: TypeId) {
        if !self.is_proven(interface, proto) {
            self.rejected.insert((interface, proto));
        }
    }

    /// Prototypes proven to implement `interface`, in discovery order.
    pub fn implementations(&self, interface: InterfaceId) -> &[TypeId] {
        self.implementations
            .get(&interface)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stamp(&mut self, proto: TypeId, key: &str, ty: TypeId) {
        self.stamps
            .entry(proto)
            .or_default()
            .entry(key.to_string())
            .or_insert(ty);
    }

    pub fn stamped(&self, proto: TypeId, key: &str) -> Option<TypeId> {
        self.stamps.get(&proto)?.get(key).copied()
    }

    /// How many member-by-member comparisons have run.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    pub fn len(&self) -> usize {
        self.proven.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proven.is_empty()
    }

    /// Fold in a cache built over the same arena.
    pub fn merge(&mut self, other: ConformanceCache) {
        let mut interfaces: Vec<_> = other.implementations.into_iter().collect();
        interfaces.sort_by_key(|(interface, _)| *interface);
        for (interface, protos) in interfaces {
            for proto in protos {
                self.register(interface, proto);
            }
        }
        for (interface, proto) in other.rejected {
            self.reject(interface, proto);
        }
        for (proto, members) in other.stamps {
            for (key, ty) in members {
                self.stamp(proto, &key, ty);
            }
        }
        self.comparisons += other.comparisons;
    }
}

impl Checker {
    /// `expected` is the interned `Interface(interface)` type.
    pub(crate) fn check_interface(
        &mut self,
        expected: TypeId,
        interface: InterfaceId,
        actual: TypeId,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if let TypeKind::Interface(other) = self.arena.get(actual) {
            if self.interface_extends(*other, interface) {
                return Ok(());
            }
            return Err(self.mismatch(expected, actual, ctx));
        }

        let def = self.arena.interface_def(interface).clone();
        if let Requirement::OneOf(candidates) = &def.requirement {
            for candidate in candidates {
                if self.check(*candidate, actual, ctx).is_ok() {
                    return Ok(());
                }
            }
            return Err(self.mismatch(expected, actual, ctx));
        }

        if self.conformance.is_proven(interface, actual) {
            tracing::trace!(
                interface = %def.name,
                proto = %self.arena.display(actual),
                "conformance cache hit"
            );
            return Ok(());
        }
        if self.config.memoize_failures && self.conformance.is_rejected(interface, actual) {
            return Err(self
                .mismatch(expected, actual, ctx)
                .with_note("previously rejected"));
        }

        self.conformance.comparisons += 1;
        match self.structurally_compatible(&def, actual, ctx) {
            Ok(()) => {
                self.register_conformance(interface, actual);
                Ok(())
            }
            Err(inner) => {
                if self.config.memoize_failures {
                    self.conformance.reject(interface, actual);
                }
                Err(self
                    .mismatch(expected, actual, ctx)
                    .with_note(inner.to_string()))
            }
        }
    }

    fn interface_extends(&self, interface: InterfaceId, target: InterfaceId) -> bool {
        if interface == target {
            return true;
        }
        self.arena
            .interface_def(interface)
            .extends
            .iter()
            .any(|parent| self.interface_extends(*parent, target))
    }

    /// Phase 1. Records nothing in the cache.
    fn structurally_compatible(
        &mut self,
        def: &InterfaceDef,
        proto: TypeId,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if !self.arena.get(proto).is_prototype() {
            return Err(TypeError::mismatch(def.name.clone(), self.arena.display(proto), ctx));
        }
        for getters in self.all_getters(def) {
            let (key, want) = getters;
            let Some(have) = self.find_instance_member(proto, &key, ctx)? else {
                return Err(self.missing_member(proto, &key, ctx));
            };
            let have = self.arena.value_type(&have);
            self.check(want, have, ctx).map_err(|_| {
                TypeError::new(
                    CheckError::MemberMismatch {
                        owner: self.arena.display(proto),
                        member: key.clone(),
                        expected: self.arena.display(want),
                        found: self.arena.display(have),
                    },
                    ctx,
                )
            })?;
        }
        for (key, want) in self.all_setters(def) {
            let sample = self.arena.value(want, ctx);
            match self.setter_accepts(proto, &key, &sample, ctx)? {
                true => {}
                false if self.accepts_stamps(proto) => {}
                false => return Err(self.not_settable(proto, &key, ctx)),
            }
        }
        Ok(())
    }

    /// Whether some prototype on the chain takes `key = sample`.
    fn setter_accepts(
        &mut self,
        proto: TypeId,
        key: &str,
        sample: &Value,
        ctx: &Context,
    ) -> Result<bool, TypeError> {
        let mut current = Some(proto);
        while let Some(p) = current {
            if self.set_instance_member(p, key, sample, ctx)? {
                return Ok(true);
            }
            if let Some(stamped) = self.conformance.stamped(p, key) {
                let want = self.arena.value_type(sample);
                self.check(stamped, want, ctx)?;
                return Ok(true);
            }
            current = self.parent_of(p);
        }
        Ok(false)
    }

    /// Declared classes may receive members they didn't declare; host
    /// prototypes may not.
    fn accepts_stamps(&self, proto: TypeId) -> bool {
        matches!(self.arena.get(proto), TypeKind::Declared(_))
    }

    /// Phase 2.
    pub(crate) fn register_conformance(&mut self, interface: InterfaceId, proto: TypeId) {
        if !self.conformance.register(interface, proto) {
            return;
        }
        let def = self.arena.interface_def(interface).clone();
        tracing::debug!(
            interface = %def.name,
            proto = %self.arena.display(proto),
            "registered conformance"
        );
        let ctx = Context::dummy();
        for (key, ty) in self.all_setters(&def) {
            let declared = matches!(self.find_instance_member(proto, &key, &ctx), Ok(Some(_)))
                || self.declares_setter(proto, &key);
            if !declared {
                tracing::debug!(
                    proto = %self.arena.display(proto),
                    member = %key,
                    ty = %self.arena.display(ty),
                    "stamped member"
                );
                self.conformance.stamp(proto, &key, ty);
            }
        }
    }

    fn declares_setter(&mut self, proto: TypeId, key: &str) -> bool {
        let ctx = Context::dummy();
        let sample = Value::any(&ctx);
        let mut current = Some(proto);
        while let Some(p) = current {
            if matches!(self.set_instance_member(p, key, &sample, &ctx), Ok(true)) {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// Own getters first, then inherited ones; a key appears once.
    fn all_getters(&self, def: &InterfaceDef) -> Vec<(String, TypeId)> {
        let mut out = Vec::new();
        self.collect_members(def, true, &mut out);
        out
    }

    fn all_setters(&self, def: &InterfaceDef) -> Vec<(String, TypeId)> {
        let mut out = Vec::new();
        self.collect_members(def, false, &mut out);
        out
    }

    fn collect_members(&self, def: &InterfaceDef, getters: bool, out: &mut Vec<(String, TypeId)>) {
        if let Requirement::Members {
            getters: own_getters,
            setters: own_setters,
        } = &def.requirement
        {
            let own = if getters { own_getters } else { own_setters };
            for (key, ty) in own {
                if !out.iter().any(|(k, _)| k == key) {
                    out.push((key.clone(), *ty));
                }
            }
        }
        for parent in &def.extends {
            self.collect_members(self.arena.interface_def(*parent), getters, out);
        }
    }

    /// Member of a value typed by the interface itself.
    pub(crate) fn interface_member(
        &mut self,
        owner: TypeId,
        interface: InterfaceId,
        key: &str,
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        let def = self.arena.interface_def(interface).clone();
        if let Some((_, ty)) = self.all_getters(&def).into_iter().find(|(k, _)| k == key) {
            return Ok(Some(self.arena.value(ty, ctx)));
        }
        if self.all_setters(&def).iter().any(|(k, _)| k == key) {
            return Err(self.setter_only(owner, key, ctx));
        }
        Ok(None)
    }

    pub(crate) fn set_interface_member(
        &mut self,
        _owner: TypeId,
        interface: InterfaceId,
        key: &str,
        arg: &Value,
        _ctx: &Context,
    ) -> Result<bool, TypeError> {
        let def = self.arena.interface_def(interface).clone();
        match self.all_setters(&def).into_iter().find(|(k, _)| k == key) {
            Some((_, want)) => {
                let actual = self.arena.value_type(arg);
                self.check(want, actual, arg.context())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckerConfig;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::declared::{ClassDecl, InterfaceDecl};
    use crate::sema::function::{FunctionType, Signature};

    fn ctx() -> Context {
        Context::dummy()
    }

    fn closable(checker: &mut Checker) -> TypeId {
        let close = checker
            .arena_mut()
            .function(FunctionType::new([Signature::void([])]));
        checker
            .declare_interface(InterfaceDecl::new("Closable").getter("close", close), &ctx())
            .unwrap()
    }

    #[test]
    fn cache_register_is_idempotent() {
        let mut cache = ConformanceCache::new();
        let i = InterfaceId::new(0);
        assert!(cache.register(i, TypeId::STRING));
        assert!(!cache.register(i, TypeId::STRING));
        assert_eq!(cache.implementations(i), &[TypeId::STRING]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn merge_deduplicates() {
        let i = InterfaceId::new(0);
        let mut a = ConformanceCache::new();
        a.register(i, TypeId::STRING);
        let mut b = ConformanceCache::new();
        b.register(i, TypeId::STRING);
        b.register(i, TypeId::INT);
        b.stamp(TypeId::INT, "onload", TypeId::STRING);
        a.merge(b);
        assert_eq!(a.implementations(i), &[TypeId::STRING, TypeId::INT]);
        assert_eq!(a.stamped(TypeId::INT, "onload"), Some(TypeId::STRING));
    }

    #[test]
    fn rejection_never_overrides_proof() {
        let i = InterfaceId::new(0);
        let mut cache = ConformanceCache::new();
        cache.register(i, TypeId::STRING);
        cache.reject(i, TypeId::STRING);
        assert!(!cache.is_rejected(i, TypeId::STRING));
    }

    #[test]
    fn second_check_hits_the_cache() {
        let mut checker = Checker::default();
        let closable = closable(&mut checker);
        let close = checker
            .arena_mut()
            .function(FunctionType::new([Signature::void([])]));
        let file = checker
            .declare_class(ClassDecl::new("File").method("close", close), &ctx())
            .unwrap();

        assert!(checker.check(closable, file, &ctx()).is_ok());
        assert_eq!(checker.conformance().comparisons(), 1);
        assert!(checker.check(closable, file, &ctx()).is_ok());
        assert_eq!(checker.conformance().comparisons(), 1);
    }

    #[test]
    fn failures_are_retried_by_default() {
        let mut checker = Checker::default();
        let closable = closable(&mut checker);
        let blank = checker.declare_class(ClassDecl::new("Blank"), &ctx()).unwrap();

        let err = checker.check(closable, blank, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "expected Closable, got Blank");
        assert!(err.notes().iter().any(|n| n.contains("close not found")), "{:?}", err.notes());
        let err = checker.check(closable, blank, &ctx()).unwrap_err();
        assert!(!err.notes().iter().any(|n| n == "previously rejected"));
        assert_eq!(checker.conformance().comparisons(), 2);
    }

    #[test]
    fn failures_are_memoized_on_request() {
        let config = CheckerConfig {
            memoize_failures: true,
            ..CheckerConfig::default()
        };
        let mut checker = Checker::new(config);
        let closable = closable(&mut checker);
        let blank = checker.declare_class(ClassDecl::new("Blank"), &ctx()).unwrap();

        assert!(checker.check(closable, blank, &ctx()).is_err());
        let err = checker.check(closable, blank, &ctx()).unwrap_err();
        assert_eq!(err.notes(), ["previously rejected"]);
        assert_eq!(checker.conformance().comparisons(), 1);
    }

    #[test]
    fn host_window_can_be_closed() {
        let mut checker = Checker::default();
        let closable = closable(&mut checker);
        let window = TypeId::builtin(BuiltinType::Window);
        assert!(checker.check(closable, window, &ctx()).is_ok());
    }

    #[test]
    fn setters_are_stamped_onto_declared_classes() {
        let mut checker = Checker::default();
        let handler = checker
            .arena_mut()
            .function(FunctionType::new([Signature::void([TypeId::STRING])]));
        let listener = checker
            .declare_interface(InterfaceDecl::new("Listener").setter("onchange", handler), &ctx())
            .unwrap();
        let widget = checker.declare_class(ClassDecl::new("Widget"), &ctx()).unwrap();

        assert!(checker.conformance().stamped(widget, "onchange").is_none());
        checker.check(listener, widget, &ctx()).unwrap();
        assert_eq!(checker.conformance().stamped(widget, "onchange"), Some(handler));

        // The stamped member is now part of Widget.
        let w = Value::new(widget, &ctx());
        let member = checker.get_member(&w, "onchange", &ctx()).unwrap();
        assert_eq!(member.type_id(), handler);
        let bad = Value::new(TypeId::STRING, &ctx());
        assert!(checker.set_member(&w, "onchange", &bad, &ctx()).is_err());
    }

    #[test]
    fn host_prototypes_are_never_stamped() {
        let mut checker = Checker::default();
        let listener = checker
            .declare_interface(InterfaceDecl::new("Resizable").setter("onresize", TypeId::STRING), &ctx())
            .unwrap();
        let window = TypeId::builtin(BuiltinType::Window);
        let err = checker.check(listener, window, &ctx()).unwrap_err();
        assert!(err.notes().iter().any(|n| n.contains("not setable")));
    }

    #[test]
    fn interfaces_accept_their_extensions() {
        let mut checker = Checker::default();
        let base = closable(&mut checker);
        let TypeKind::Interface(base_id) = *checker.arena().get(base) else {
            panic!("not an interface");
        };
        let derived = checker
            .declare_interface(InterfaceDecl::new("Stream").extends(base_id), &ctx())
            .unwrap();
        assert!(checker.check(base, derived, &ctx()).is_ok());
        assert!(checker.check(derived, base, &ctx()).is_err());
    }

    #[test]
    fn one_of_requirement() {
        let mut checker = Checker::default();
        let source = checker.well_known().canvas_image_source;
        let canvas = TypeId::builtin(BuiltinType::HTMLCanvasElement);
        let image = TypeId::builtin(BuiltinType::HTMLImageElement);
        let input = TypeId::builtin(BuiltinType::HTMLInputElement);
        assert!(checker.check(source, canvas, &ctx()).is_ok());
        assert!(checker.check(source, image, &ctx()).is_ok());
        assert!(checker.check(source, input, &ctx()).is_err());
    }
}

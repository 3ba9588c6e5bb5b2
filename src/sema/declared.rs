// src/sema/declared.rs
//
// User-declared prototypes and interfaces.
//
// The host's own classes (Element, Worker, ...) live in `builtins`. Code
// under compilation declares more through `ClassDecl` / `InterfaceDecl`;
// once declared they behave exactly like builtin prototypes: they have a
// parent link, members, a class value and a place in the conformance cache.

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::checker::Checker;
use crate::sema::conformance::{InterfaceDef, InterfaceId, Requirement};
use crate::sema::type_arena::{TypeId, TypeIdVec, TypeKind};
use crate::sema::value::Value;

/// Index into the arena's class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassDefId(u32);

impl ClassDefId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
    WriteOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub ty: TypeId,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<TypeId>,
    pub members: Vec<Member>,
    pub statics: Vec<(String, TypeId)>,
    /// Empty means a single no-argument constructor.
    pub constructors: Vec<TypeIdVec>,
    pub is_final: bool,
    pub is_abstract: bool,
    pub universal: bool,
}

impl ClassDef {
    pub fn member(&self, key: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == key)
    }

    pub fn static_member(&self, key: &str) -> Option<TypeId> {
        self.statics.iter().find(|(k, _)| k == key).map(|(_, t)| *t)
    }
}

/// Builder for a class declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    def: ClassDef,
    implements: Vec<TypeId>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: ClassDef {
                name: name.into(),
                parent: None,
                members: Vec::new(),
                statics: Vec::new(),
                constructors: Vec::new(),
                is_final: false,
                is_abstract: false,
                universal: false,
            },
            implements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn extends(mut self, parent: TypeId) -> Self {
        self.def.parent = Some(parent);
        self
    }

    fn member(mut self, name: impl Into<String>, ty: TypeId, access: Access) -> Self {
        let name = name.into();
        self.def.members.retain(|m| m.name != name);
        self.def.members.push(Member { name, ty, access });
        self
    }

    /// Read-write field.
    pub fn property(self, name: impl Into<String>, ty: TypeId) -> Self {
        self.member(name, ty, Access::ReadWrite)
    }

    pub fn readonly(self, name: impl Into<String>, ty: TypeId) -> Self {
        self.member(name, ty, Access::ReadOnly)
    }

    /// Methods are read-only members of function type.
    pub fn method(self, name: impl Into<String>, ty: TypeId) -> Self {
        self.readonly(name, ty)
    }

    pub fn setter(self, name: impl Into<String>, ty: TypeId) -> Self {
        self.member(name, ty, Access::WriteOnly)
    }

    pub fn static_member(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.def.statics.push((name.into(), ty));
        self
    }

    pub fn constructor(mut self, params: impl IntoIterator<Item = TypeId>) -> Self {
        self.def.constructors.push(params.into_iter().collect());
        self
    }

    /// Checked against the class once it is declared.
    pub fn implements(mut self, interface: TypeId) -> Self {
        self.implements.push(interface);
        self
    }

    pub fn final_class(mut self) -> Self {
        self.def.is_final = true;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.def.is_abstract = true;
        self
    }

    pub fn universal(mut self) -> Self {
        self.def.universal = true;
        self
    }
}

/// Builder for a structural interface.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    name: String,
    getters: Vec<(String, TypeId)>,
    setters: Vec<(String, TypeId)>,
    extends: Vec<InterfaceId>,
    is_rpc: bool,
}

impl InterfaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getters: Vec::new(),
            setters: Vec::new(),
            extends: Vec::new(),
            is_rpc: false,
        }
    }

    pub fn getter(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.getters.push((name.into(), ty));
        self
    }

    pub fn setter(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.setters.push((name.into(), ty));
        self
    }

    pub fn extends(mut self, parent: InterfaceId) -> Self {
        self.extends.push(parent);
        self
    }

    pub fn rpc(mut self) -> Self {
        self.is_rpc = true;
        self
    }
}

impl Checker {
    /// Declare a class. `implements` clauses are checked right away, so a
    /// class that fails one is still declared but the error is returned.
    #[tracing::instrument(skip(self, decl, ctx), fields(class = %decl.name()))]
    pub fn declare_class(&mut self, decl: ClassDecl, ctx: &Context) -> Result<TypeId, TypeError> {
        let ClassDecl { def, implements } = decl;
        self.ensure_name_free(&def.name, ctx)?;

        if let Some(parent) = def.parent {
            if !self.arena.get(parent).is_prototype() {
                return Err(TypeError::mismatch("a prototype", self.arena.display(parent), ctx)
                    .with_note(format!("{} can't extend it", def.name)));
            }
            if let TypeKind::Declared(id) = self.arena.get(parent) {
                if self.arena.class_def(*id).is_final {
                    return Err(TypeError::new(
                        CheckError::FinalParent {
                            type_name: self.arena.display(parent),
                        },
                        ctx,
                    ));
                }
            }
        }

        if def.universal {
            self.ensure_universal_fields(&def, ctx)?;
        }

        let (_, ty) = self.arena.add_class(def);
        tracing::debug!(ty = %self.arena.display(ty), "declared class");
        for interface in implements {
            self.check(interface, ty, ctx)?;
        }
        Ok(ty)
    }

    /// Methods are code, not data, and don't take part.
    fn ensure_universal_fields(&self, def: &ClassDef, ctx: &Context) -> Result<(), TypeError> {
        let offender = |part: String| {
            TypeError::new(
                CheckError::UniversalMember {
                    owner: def.name.clone(),
                    part,
                },
                ctx,
            )
        };
        if let Some(parent) = def.parent {
            if !self.is_universal(parent) {
                return Err(offender(format!("parent {}", self.arena.display(parent))));
            }
        }
        for member in &def.members {
            if matches!(self.arena.get(member.ty), TypeKind::Function(_)) {
                continue;
            }
            if !self.is_universal(member.ty) {
                return Err(offender(format!(
                    "member {}: {}",
                    member.name,
                    self.arena.display(member.ty)
                )));
            }
        }
        Ok(())
    }

    pub fn declare_interface(&mut self, decl: InterfaceDecl, ctx: &Context) -> Result<TypeId, TypeError> {
        self.ensure_name_free(&decl.name, ctx)?;
        let def = InterfaceDef {
            name: decl.name,
            requirement: Requirement::Members {
                getters: decl.getters,
                setters: decl.setters,
            },
            extends: decl.extends,
            is_rpc: decl.is_rpc,
        };
        let (_, ty) = self.arena.add_interface(def);
        tracing::debug!(ty = %self.arena.display(ty), "declared interface");
        Ok(ty)
    }

    fn ensure_name_free(&self, name: &str, ctx: &Context) -> Result<(), TypeError> {
        if self.arena.is_name_taken(name) {
            return Err(TypeError::new(
                CheckError::DuplicateType {
                    name: name.to_string(),
                },
                ctx,
            ));
        }
        Ok(())
    }

    pub(crate) fn declared_member(
        &mut self,
        owner: TypeId,
        class: ClassDefId,
        key: &str,
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        let Some(member) = self.arena.class_def(class).member(key).cloned() else {
            return Ok(None);
        };
        match member.access {
            Access::WriteOnly => Err(self.setter_only(owner, key, ctx)),
            Access::ReadOnly | Access::ReadWrite => Ok(Some(self.arena.value(member.ty, ctx))),
        }
    }

    pub(crate) fn set_declared_member(
        &mut self,
        owner: TypeId,
        class: ClassDefId,
        key: &str,
        arg: &Value,
        ctx: &Context,
    ) -> Result<bool, TypeError> {
        let Some(member) = self.arena.class_def(class).member(key).cloned() else {
            return Ok(false);
        };
        match member.access {
            Access::ReadOnly => Err(self.not_settable(owner, key, ctx)),
            Access::ReadWrite | Access::WriteOnly => {
                let actual = self.arena.value_type(arg);
                self.check(member.ty, actual, arg.context())?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::function::{FunctionType, Signature};

    fn ctx() -> Context {
        Context::dummy()
    }

    #[test]
    fn names_are_unique() {
        let mut checker = Checker::default();
        checker.declare_class(ClassDecl::new("Point"), &ctx()).unwrap();
        let err = checker.declare_class(ClassDecl::new("Point"), &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Point is already declared");
        // Host names are taken too.
        assert!(checker.declare_interface(InterfaceDecl::new("Element"), &ctx()).is_err());
        assert!(checker.declare_class(ClassDecl::new("MouseEvent"), &ctx()).is_err());
    }

    #[test]
    fn final_classes_cannot_be_extended() {
        let mut checker = Checker::default();
        let sealed = checker
            .declare_class(ClassDecl::new("Sealed").final_class(), &ctx())
            .unwrap();
        let err = checker
            .declare_class(ClassDecl::new("Sub").extends(sealed), &ctx())
            .unwrap_err();
        assert!(matches!(err.error, CheckError::FinalParent { .. }));
    }

    #[test]
    fn universal_classes_hold_only_universal_fields() {
        let mut checker = Checker::default();
        let window = TypeId::builtin(BuiltinType::Window);
        let err = checker
            .declare_class(ClassDecl::new("Leak").property("w", window).universal(), &ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "universal class Leak holds non-universal member w: Window");
        assert!(checker.arena().lookup_name("Leak").is_none());

        let err = checker
            .declare_class(
                ClassDecl::new("Panel")
                    .extends(TypeId::builtin(BuiltinType::HTMLElement))
                    .universal(),
                &ctx(),
            )
            .unwrap_err();
        assert!(matches!(err.error, CheckError::UniversalMember { .. }));

        // Methods don't count.
        let describe = checker
            .arena_mut()
            .function(FunctionType::new([Signature::returning([], TypeId::STRING)]));
        let point = checker
            .declare_class(
                ClassDecl::new("Point")
                    .property("x", TypeId::NUMBER)
                    .method("describe", describe)
                    .universal(),
                &ctx(),
            )
            .unwrap();
        assert!(checker.is_universal(point));
        let p = Value::new(point, &ctx());
        assert!(checker.check_boundary(&p, "postMessage", &ctx()).is_ok());
    }

    #[test]
    fn parent_must_be_a_prototype() {
        let mut checker = Checker::default();
        let f = checker.arena_mut().function(FunctionType::generic());
        assert!(checker.declare_class(ClassDecl::new("Odd").extends(f), &ctx()).is_err());
    }

    #[test]
    fn declared_classes_join_the_hierarchy() {
        let mut checker = Checker::default();
        let html = TypeId::builtin(BuiltinType::HTMLElement);
        let widget = checker
            .declare_class(ClassDecl::new("Widget").extends(html).property("label", TypeId::STRING), &ctx())
            .unwrap();
        let node = TypeId::builtin(BuiltinType::Node);
        assert!(checker.check(node, widget, &ctx()).is_ok());
        assert!(checker.check(widget, html, &ctx()).is_err());

        let w = Value::new(widget, &ctx());
        assert_eq!(checker.get_member(&w, "label", &ctx()).unwrap().type_id(), TypeId::STRING);
        // Inherited from Element.
        assert_eq!(checker.get_member(&w, "id", &ctx()).unwrap().type_id(), TypeId::STRING);
    }

    #[test]
    fn member_access_modes() {
        let mut checker = Checker::default();
        let ty = checker
            .declare_class(
                ClassDecl::new("Gauge")
                    .readonly("value", TypeId::NUMBER)
                    .setter("target", TypeId::NUMBER),
                &ctx(),
            )
            .unwrap();
        let g = Value::new(ty, &ctx());
        let n = Value::literal_int(4, &ctx());

        let err = checker.set_member(&g, "value", &n, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Gauge.value not setable");

        assert!(checker.set_member(&g, "target", &n, &ctx()).is_ok());
        let err = checker.get_member(&g, "target", &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Gauge.target is a setter only");
    }

    #[test]
    fn implements_is_checked_at_declaration() {
        let mut checker = Checker::default();
        let size = checker
            .arena_mut()
            .function(FunctionType::new([Signature::returning([], TypeId::INT)]));
        let sized = checker
            .declare_interface(InterfaceDecl::new("Sized").getter("size", size), &ctx())
            .unwrap();

        let ok = ClassDecl::new("Bag").method("size", size).implements(sized);
        let bag = checker.declare_class(ok, &ctx()).unwrap();
        assert!(checker.conformance().implementations(match checker.arena().get(sized) {
            TypeKind::Interface(id) => *id,
            _ => unreachable!(),
        })
        .contains(&bag));

        let bad = ClassDecl::new("Empty").implements(sized);
        let err = checker.declare_class(bad, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "expected Sized, got Empty");
    }
}

// src/sema/class.rs
//
// Class values: constructor overloads plus what `new` produces.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::builtins;
use crate::sema::checker::Checker;
use crate::sema::function::Signature;
use crate::sema::type_arena::{TypeId, TypeIdVec, TypeKind};
use crate::sema::value::Value;

/// Constructed types computed from the actual arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomConstruct {
    /// `new Tuple(a, b, ..)`: `Tuple<A,B,..>`.
    Tuple,
    /// `new Promise(executor)`: content from the executor's resolve
    /// parameter.
    Promise,
    /// `new Set(array?)`: `Set<content>`.
    Set,
    User(u32),
}

impl fmt::Display for CustomConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomConstruct::Tuple => write!(f, "Tuple"),
            CustomConstruct::Promise => write!(f, "Promise"),
            CustomConstruct::Set => write!(f, "Set"),
            CustomConstruct::User(i) => write!(f, "user#{}", i),
        }
    }
}

/// Callback behind `CustomConstruct::User`.
pub type CustomConstructFn =
    Arc<dyn Fn(&mut Checker, &[Value], &Context) -> Result<TypeId, TypeError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTarget {
    /// `new` yields an instance of the owner (or `any` without one).
    Fixed,
    Custom(CustomConstruct),
    /// Host types only the environment creates.
    Unconstructable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    /// The prototype this class constructs and holds statics for.
    pub owner: Option<TypeId>,
    pub constructors: SmallVec<[TypeIdVec; 2]>,
    pub target: ClassTarget,
}

impl ClassType {
    pub fn new(owner: TypeId, constructors: impl IntoIterator<Item = TypeIdVec>) -> Self {
        Self {
            owner: Some(owner),
            constructors: constructors.into_iter().collect(),
            target: ClassTarget::Fixed,
        }
    }

    pub fn custom(
        owner: Option<TypeId>,
        constructors: impl IntoIterator<Item = TypeIdVec>,
        rule: CustomConstruct,
    ) -> Self {
        Self {
            owner,
            constructors: constructors.into_iter().collect(),
            target: ClassTarget::Custom(rule),
        }
    }

    pub fn unconstructable(owner: TypeId) -> Self {
        Self {
            owner: Some(owner),
            constructors: SmallVec::new(),
            target: ClassTarget::Unconstructable,
        }
    }

    pub fn target_type(&self) -> Option<TypeId> {
        self.owner
    }

    fn signatures(&self) -> Vec<Signature> {
        self.constructors
            .iter()
            .map(|params| Signature::void(params.iter().copied()))
            .collect()
    }
}

impl Checker {
    /// The class value of a prototype (`Array`, `Promise`, a declared class).
    /// `None` for types without one (interfaces, callables, `any`).
    pub fn class_of(&mut self, proto: TypeId) -> Option<TypeId> {
        let class = match self.arena.get(proto).clone() {
            TypeKind::Declared(id) => {
                let def = self.arena.class_def(id);
                let constructors: Vec<TypeIdVec> = if def.constructors.is_empty() {
                    vec![TypeIdVec::new()]
                } else {
                    def.constructors.clone()
                };
                ClassType::new(proto, constructors)
            }
            TypeKind::Any | TypeKind::Function(_) | TypeKind::Class(_) | TypeKind::Interface(_) => {
                return None;
            }
            _ => builtins::class_for(self, proto)?,
        };
        Some(self.arena.class(class))
    }

    /// `new C(args)`.
    #[tracing::instrument(skip(self, class, args, ctx), fields(class = %self.arena.display(class.type_id())))]
    pub fn eval_constructor(
        &mut self,
        class: &Value,
        args: &[Value],
        ctx: &Context,
    ) -> Result<Value, TypeError> {
        let class_ty = class.type_id();
        let class_type = match self.arena.get(class_ty) {
            TypeKind::Any => return Ok(Value::any(ctx)),
            TypeKind::Class(c) => (**c).clone(),
            _ => {
                return Err(TypeError::new(
                    CheckError::NotConstructable {
                        type_name: self.arena.display(class_ty),
                    },
                    ctx,
                ));
            }
        };

        let owner_name = class_type
            .owner
            .map(|o| self.arena.display(o))
            .unwrap_or_else(|| self.arena.display(class_ty));

        if class_type.target == ClassTarget::Unconstructable {
            return Err(TypeError::new(
                CheckError::NotConstructable { type_name: owner_name },
                ctx,
            ));
        }
        if let Some(TypeKind::Declared(id)) = class_type.owner.map(|o| self.arena.get(o)) {
            if self.arena.class_def(*id).is_abstract {
                return Err(TypeError::new(
                    CheckError::AbstractConstruction { type_name: owner_name },
                    ctx,
                ));
            }
        }

        let index = self.check_any_overload(class_ty, &class_type.constructors, args, ctx)?;
        tracing::debug!(index, "selected constructor");

        match class_type.target {
            ClassTarget::Custom(rule) => {
                let ty = self.eval_custom_construct(rule, args, ctx)?;
                tracing::debug!(%rule, constructed = %self.arena.display(ty), "custom constructor");
                Ok(self.arena.value(ty, ctx))
            }
            _ => Ok(match class_type.owner {
                Some(owner) => Value::new(owner, ctx),
                None => Value::any(ctx),
            }),
        }
    }

    /// Static member of a class value (`Array.isArray`, `Promise.all`).
    pub fn get_class_member(&mut self, class: &Value, key: &str, ctx: &Context) -> Result<Value, TypeError> {
        let class_ty = class.type_id();
        let owner = match self.arena.get(class_ty) {
            TypeKind::Any => return Ok(Value::any(ctx)),
            TypeKind::Class(c) => c.owner,
            _ => None,
        };
        let Some(owner) = owner else {
            return Err(self.missing_member(class_ty, key, ctx));
        };
        let found = match self.arena.get(owner).clone() {
            TypeKind::Declared(id) => self
                .arena
                .class_def(id)
                .static_member(key)
                .map(|ty| self.arena.value(ty, ctx)),
            _ => builtins::class_member(self, owner, key, ctx)?,
        };
        found.ok_or_else(|| self.missing_member(class_ty, key, ctx))
    }

    /// Class-to-class compatibility: constructor lists, then constructed
    /// types.
    pub(crate) fn check_class(
        &mut self,
        expected: &ClassType,
        actual: &ClassType,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        self.check_all_overloads(&expected.signatures(), &actual.signatures(), ctx)?;
        match (expected.owner, actual.owner) {
            (None, _) => Ok(()),
            (Some(e), None) => Err(self.mismatch(e, TypeId::ANY, ctx)),
            (Some(e), Some(a)) => self.check(e, a, ctx),
        }
    }

    /// Plug in a constructor rule computed by caller code.
    pub fn register_custom_class(&mut self, rule: CustomConstructFn) -> CustomConstruct {
        let index = self.custom_classes.len() as u32;
        self.custom_classes.push(rule);
        CustomConstruct::User(index)
    }

    fn eval_custom_construct(
        &mut self,
        rule: CustomConstruct,
        args: &[Value],
        ctx: &Context,
    ) -> Result<TypeId, TypeError> {
        match rule {
            CustomConstruct::User(index) => {
                let Some(rule) = self.custom_classes.get(index as usize).cloned() else {
                    panic!("custom constructor #{} was never registered", index);
                };
                rule(self, args, ctx)
            }
            builtin => builtins::eval_custom_construct(self, builtin, args, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::declared::ClassDecl;
    use smallvec::smallvec;

    #[test]
    fn unconstructable_host_types() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let css = TypeId::builtin(BuiltinType::CSSStyleDeclaration);
        let class = checker.class_of(css).unwrap();
        let err = checker
            .eval_constructor(&Value::new(class, &ctx), &[], &ctx)
            .unwrap_err();
        assert_eq!(err.to_string(), "CSSStyleDeclaration doesn't have a constructor");
    }

    #[test]
    fn abstract_classes_cannot_be_constructed() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let shape = checker
            .declare_class(ClassDecl::new("Shape").abstract_class(), &ctx)
            .unwrap();
        let class = checker.class_of(shape).unwrap();
        let err = checker
            .eval_constructor(&Value::new(class, &ctx), &[], &ctx)
            .unwrap_err();
        assert!(matches!(err.error, CheckError::AbstractConstruction { .. }));
    }

    #[test]
    fn constructor_overloads_are_checked() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let point = checker
            .declare_class(
                ClassDecl::new("Point").constructor([TypeId::NUMBER, TypeId::NUMBER]),
                &ctx,
            )
            .unwrap();
        let class = Value::new(checker.class_of(point).unwrap(), &ctx);

        let made = checker
            .eval_constructor(&class, &[Value::literal_int(1, &ctx), Value::literal_int(2, &ctx)], &ctx)
            .unwrap();
        assert_eq!(made.type_id(), point);

        let err = checker
            .eval_constructor(&class, &[Value::literal_int(1, &ctx)], &ctx)
            .unwrap_err();
        assert!(matches!(err.error, CheckError::ArgumentCount { expected: 2, found: 1 }));
    }

    #[test]
    fn classes_without_owner_construct_any() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let class = checker.arena_mut().class(ClassType {
            owner: None,
            constructors: smallvec![TypeIdVec::new()],
            target: ClassTarget::Fixed,
        });
        let made = checker
            .eval_constructor(&Value::new(class, &ctx), &[], &ctx)
            .unwrap();
        assert!(made.is_any());
    }

    #[test]
    fn class_to_class_compares_constructed_types() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let html = checker.arena_mut().class(ClassType::new(
            TypeId::builtin(BuiltinType::HTMLElement),
            [TypeIdVec::new()],
        ));
        let canvas = checker.arena_mut().class(ClassType::new(
            TypeId::builtin(BuiltinType::HTMLCanvasElement),
            [TypeIdVec::new()],
        ));
        assert!(checker.check(html, canvas, &ctx).is_ok());
        assert!(checker.check(canvas, html, &ctx).is_err());
    }

    #[test]
    fn user_constructor_rule() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let rule = checker.register_custom_class(Arc::new(|checker, args, _ctx| {
            let content = args.first().map(|a| a.remove_literalness().type_id());
            Ok(checker.arena_mut().set(content))
        }));
        let class = checker.arena_mut().class(ClassType::custom(
            None,
            [TypeIdVec::from_slice(&[TypeId::ANY])],
            rule,
        ));
        let made = checker
            .eval_constructor(&Value::new(class, &ctx), &[Value::literal_string("x", &ctx)], &ctx)
            .unwrap();
        assert_eq!(checker.display(made.type_id()), "Set<String>");
    }

    #[test]
    fn static_members_of_declared_classes() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let counter = checker
            .declare_class(ClassDecl::new("Counter").static_member("count", TypeId::INT), &ctx)
            .unwrap();
        let class = Value::new(checker.class_of(counter).unwrap(), &ctx);
        let count = checker.get_class_member(&class, "count", &ctx).unwrap();
        assert_eq!(count.type_id(), TypeId::INT);
        assert!(checker.get_class_member(&class, "total", &ctx).is_err());
    }
}

// src/sema/builtins/mod.rs
//
// The host environment's own prototypes.
//
// Every builtin prototype answers member lookups through a `Slot`: the
// member's type and whether it can be read, written or both. The
// submodules only describe slots; reading, writing and the error messages
// for the wrong direction are handled once, here.

mod collections;
mod dom;
mod events;
mod idb;
mod interfaces;
mod object;
mod primitives;
mod promise;

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::builtin::BuiltinType;
use crate::sema::checker::Checker;
use crate::sema::class::{ClassType, CustomConstruct};
use crate::sema::declared::Access;
use crate::sema::function::{CustomReturn, FunctionType, Signature};
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec, TypeKind, TypedArrayKind};
use crate::sema::value::{Literal, Value};

pub use interfaces::WellKnown;

/// A builtin member: its type and how it may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub ty: TypeId,
    pub access: Access,
}

impl Slot {
    pub fn read(ty: TypeId) -> Self {
        Self {
            ty,
            access: Access::ReadOnly,
        }
    }

    pub fn read_write(ty: TypeId) -> Self {
        Self {
            ty,
            access: Access::ReadWrite,
        }
    }

    pub fn write(ty: TypeId) -> Self {
        Self {
            ty,
            access: Access::WriteOnly,
        }
    }
}

// ============================================================================
// Construction helpers
// ============================================================================

pub(crate) fn function(arena: &mut TypeArena, overloads: impl IntoIterator<Item = Signature>) -> TypeId {
    arena.function(FunctionType::new(overloads))
}

/// Produces no value when called with a receiver (`arr.push(x)`).
pub(crate) fn method(arena: &mut TypeArena, overloads: impl IntoIterator<Item = Signature>) -> TypeId {
    arena.function(FunctionType::new(overloads).method_like())
}

pub(crate) fn custom(
    arena: &mut TypeArena,
    overloads: impl IntoIterator<Item = Signature>,
    rule: CustomReturn,
) -> TypeId {
    arena.function(FunctionType::custom(overloads, rule))
}

/// `fn(params) -> void`, the shape of event callbacks.
pub(crate) fn callback(arena: &mut TypeArena, params: impl IntoIterator<Item = TypeId>) -> TypeId {
    function(arena, [Signature::void(params)])
}

pub(crate) fn literal_string(arena: &mut TypeArena, s: &str) -> TypeId {
    arena.literal(TypeId::STRING, Literal::String(s.to_string()))
}

pub(crate) fn unsupported(checker: &Checker, owner: TypeId, key: &str, hint: &str, ctx: &Context) -> TypeError {
    TypeError::new(
        CheckError::Unsupported {
            owner: checker.arena.display(owner),
            member: key.to_string(),
            hint: hint.to_string(),
        },
        ctx,
    )
}

// ============================================================================
// Instance members
// ============================================================================

fn slot(checker: &mut Checker, proto: TypeId, key: &str, ctx: &Context) -> Result<Option<Slot>, TypeError> {
    match checker.arena.get(proto).clone() {
        TypeKind::Builtin(b) if primitives::is_primitive(b) => Ok(primitives::member(checker, b, key)),
        TypeKind::Builtin(b) => Ok(dom::member(checker, b, key)),
        TypeKind::Array(content) => collections::array_member(checker, proto, content, key, ctx),
        TypeKind::Set(content) => Ok(collections::set_member(checker, proto, content, key)),
        TypeKind::Map { key: k, item } => Ok(collections::map_member(checker, k, item, key)),
        TypeKind::Tuple(_) => Ok(collections::tuple_member(checker, proto, key)),
        TypeKind::TypedArray(kind) => Ok(collections::typed_array_member(checker, proto, kind, key)),
        TypeKind::Promise(content) => Ok(promise::member(checker, proto, content, key)),
        TypeKind::Request(content) => Ok(idb::member(checker, content, key)),
        TypeKind::Event { kind, target } => Ok(events::member(checker, kind, target, key)),
        TypeKind::Object(shape) => object::member(checker, proto, &shape, key, ctx),
        _ => Ok(None),
    }
}

pub(crate) fn instance_member(
    checker: &mut Checker,
    proto: TypeId,
    key: &str,
    ctx: &Context,
) -> Result<Option<Value>, TypeError> {
    match slot(checker, proto, key, ctx)? {
        None => Ok(None),
        Some(Slot {
            access: Access::WriteOnly,
            ..
        }) => Err(checker.setter_only(proto, key, ctx)),
        Some(slot) => Ok(Some(checker.arena.value(slot.ty, ctx))),
    }
}

pub(crate) fn set_instance_member(
    checker: &mut Checker,
    proto: TypeId,
    key: &str,
    arg: &Value,
    ctx: &Context,
) -> Result<bool, TypeError> {
    if let TypeKind::Object(shape) = checker.arena.get(proto) {
        if shape.members.is_none() {
            return Err(unsupported(checker, proto, key, "object has unknown content, use [...] instead", ctx));
        }
    }
    match slot(checker, proto, key, ctx)? {
        None => Ok(false),
        Some(Slot {
            access: Access::ReadOnly,
            ..
        }) => Err(checker.not_settable(proto, key, ctx)),
        Some(slot) => {
            let actual = checker.arena.value_type(arg);
            checker.check(slot.ty, actual, arg.context())?;
            Ok(true)
        }
    }
}

// ============================================================================
// Class values
// ============================================================================

/// Constructor signatures of a builtin prototype.
pub(crate) fn class_for(checker: &mut Checker, proto: TypeId) -> Option<ClassType> {
    let arena = &mut checker.arena;
    let class = match arena.get(proto).clone() {
        TypeKind::Builtin(b) if b.is_unconstructable() => ClassType::unconstructable(proto),
        TypeKind::Builtin(b) => ClassType::new(proto, builtin_constructors(arena, b)),
        TypeKind::Array(_) => {
            let owner = arena.array(None);
            ClassType::new(owner, [params([]), params([TypeId::INT])])
        }
        TypeKind::Set(_) => {
            let owner = arena.set(None);
            let array = arena.array(None);
            ClassType::custom(Some(owner), [params([]), params([array])], CustomConstruct::Set)
        }
        TypeKind::Map { .. } => ClassType::new(arena.map(None, None), [params([])]),
        TypeKind::Tuple(_) => {
            let owner = arena.tuple(None::<[TypeId; 0]>);
            let arities = (2..=7).map(|n| std::iter::repeat_n(TypeId::ANY, n).collect());
            ClassType::custom(Some(owner), arities, CustomConstruct::Tuple)
        }
        TypeKind::TypedArray(TypedArrayKind::Generic) => ClassType::unconstructable(proto),
        TypeKind::TypedArray(kind) => {
            let numbers = arena.array(Some(kind.element()));
            ClassType::new(proto, [params([TypeId::INT]), params([numbers])])
        }
        TypeKind::Promise(_) => promise::class(arena),
        TypeKind::Request(_) => ClassType::unconstructable(arena.request(None)),
        TypeKind::Event { kind, .. } => ClassType::new(arena.event(kind, None), [params([TypeId::STRING])]),
        TypeKind::Object(_) => ClassType::new(arena.map_like_object(None), [params([])]),
        _ => return None,
    };
    Some(class)
}

fn params<const N: usize>(types: [TypeId; N]) -> TypeIdVec {
    types.into_iter().collect()
}

fn builtin_constructors(arena: &mut TypeArena, b: BuiltinType) -> Vec<TypeIdVec> {
    match b {
        BuiltinType::String
        | BuiltinType::Number
        | BuiltinType::Int
        | BuiltinType::BigInt
        | BuiltinType::Boolean => vec![params([TypeId::ANY])],
        BuiltinType::Date => vec![
            params([]),
            params([TypeId::INT]),
            params([TypeId::STRING]),
            params([TypeId::INT, TypeId::INT, TypeId::INT]),
        ],
        BuiltinType::Error => vec![params([]), params([TypeId::STRING])],
        BuiltinType::RegExp => vec![params([TypeId::STRING]), params([TypeId::STRING, TypeId::STRING])],
        BuiltinType::HTMLImageElement => vec![params([]), params([TypeId::INT, TypeId::INT])],
        BuiltinType::Worker => {
            let options = arena.config_object([("type".to_string(), TypeId::STRING)]);
            vec![params([TypeId::STRING]), params([TypeId::STRING, options])]
        }
        _ => vec![params([])],
    }
}

/// Static members (`Array.isArray`, `Promise.all`, `Object.assign`).
pub(crate) fn class_member(
    checker: &mut Checker,
    owner: TypeId,
    key: &str,
    ctx: &Context,
) -> Result<Option<Value>, TypeError> {
    let ty = match checker.arena.get(owner).clone() {
        TypeKind::Builtin(b) => primitives::static_member(checker, b, key),
        TypeKind::Array(_) => collections::array_static(checker, key),
        TypeKind::TypedArray(kind) => collections::typed_array_static(checker, owner, kind, key),
        TypeKind::Promise(_) => promise::static_member(checker, key),
        TypeKind::Object(_) => object::static_member(checker, key),
        _ => None,
    };
    Ok(ty.map(|ty| checker.arena.value(ty, ctx)))
}

pub(crate) fn eval_custom_construct(
    checker: &mut Checker,
    rule: CustomConstruct,
    args: &[Value],
    ctx: &Context,
) -> Result<TypeId, TypeError> {
    match rule {
        CustomConstruct::Tuple => {
            let items: Vec<TypeId> = args.iter().map(|a| a.remove_literalness().type_id()).collect();
            Ok(checker.arena.tuple(Some(items)))
        }
        CustomConstruct::Promise => promise::construct(checker, args, ctx),
        CustomConstruct::Set => {
            let content = match args.first().map(|a| checker.arena.get(a.type_id())) {
                Some(TypeKind::Array(content)) => *content,
                _ => None,
            };
            Ok(checker.arena.set(content))
        }
        CustomConstruct::User(_) => {
            panic!("user constructor rules are dispatched by the checker")
        }
    }
}

impl Checker {
    /// Result of a function whose return type depends on its arguments.
    /// The arguments have already matched one of its overloads.
    pub(crate) fn eval_custom_return(
        &mut self,
        rule: CustomReturn,
        args: &[Value],
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        match rule {
            CustomReturn::ArrayMap => collections::eval_map(self, args, ctx).map(Some),
            CustomReturn::ArrayFrom => collections::eval_from(self, args, ctx).map(Some),
            CustomReturn::PromiseAll => promise::eval_all(self, args, ctx).map(Some),
            CustomReturn::ObjectAssign => object::eval_assign(self, args, ctx).map(Some),
            CustomReturn::PostMessage => {
                let message = first_arg(args, rule);
                self.check_boundary(message, "postMessage", message.context())?;
                Ok(None)
            }
            CustomReturn::TupleGetIndex(tuple) => collections::eval_tuple_get(self, tuple, args, ctx).map(Some),
            CustomReturn::TupleSetIndex(tuple) => {
                collections::eval_tuple_set(self, tuple, args, ctx)?;
                Ok(None)
            }
            CustomReturn::ObjectGetIndex(object) => object::eval_get_index(self, object, args, ctx).map(Some),
            CustomReturn::ObjectSetIndex(object) => {
                object::eval_set_index(self, object, args, ctx)?;
                Ok(None)
            }
            CustomReturn::User(index) => self.eval_user_return(index, args, ctx),
        }
    }
}

/// Argument `n` of a call that already matched an overload of this arity.
pub(crate) fn arg(args: &[Value], n: usize, rule: CustomReturn) -> &Value {
    match args.get(n) {
        Some(arg) => arg,
        None => panic!("{} called with {} arguments after overload matching", rule, args.len()),
    }
}

fn first_arg(args: &[Value], rule: CustomReturn) -> &Value {
    arg(args, 0, rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::dummy()
    }

    #[test]
    fn builtin_classes() {
        let mut checker = Checker::default();
        let date = TypeId::builtin(BuiltinType::Date);
        let class = Value::new(checker.class_of(date).unwrap(), &ctx());
        let made = checker
            .eval_constructor(&class, &[Value::literal_string("2024-01-01", &ctx())], &ctx())
            .unwrap();
        assert_eq!(made.type_id(), date);
        assert!(checker.eval_constructor(&class, &[Value::literal_bool(true, &ctx())], &ctx()).is_err());

        let window = TypeId::builtin(BuiltinType::Window);
        let class = Value::new(checker.class_of(window).unwrap(), &ctx());
        assert!(checker.eval_constructor(&class, &[], &ctx()).is_err());
    }

    #[test]
    fn tuple_constructor_sizes_to_the_call() {
        let mut checker = Checker::default();
        let tuple = checker.arena_mut().tuple(None::<[TypeId; 0]>);
        let class = Value::new(checker.class_of(tuple).unwrap(), &ctx());
        let made = checker
            .eval_constructor(
                &class,
                &[Value::literal_int(1, &ctx()), Value::literal_string("a", &ctx())],
                &ctx(),
            )
            .unwrap();
        assert_eq!(checker.display(made.type_id()), "Tuple<Int,String>");
        assert!(checker
            .eval_constructor(&class, &[Value::literal_int(1, &ctx())], &ctx())
            .is_err());
    }

    #[test]
    fn set_constructor_takes_array_content() {
        let mut checker = Checker::default();
        let set = checker.arena_mut().set(None);
        let class = Value::new(checker.class_of(set).unwrap(), &ctx());
        let strings = checker.arena_mut().array(Some(TypeId::STRING));
        let made = checker
            .eval_constructor(&class, &[Value::new(strings, &ctx())], &ctx())
            .unwrap();
        assert_eq!(checker.display(made.type_id()), "Set<String>");
        let empty = checker.eval_constructor(&class, &[], &ctx()).unwrap();
        assert_eq!(checker.display(empty.type_id()), "Set");
    }

    #[test]
    fn post_message_requires_universal_values() {
        let mut checker = Checker::default();
        let worker = Value::new(TypeId::builtin(BuiltinType::Worker), &ctx());
        let post = checker.get_member(&worker, "postMessage", &ctx()).unwrap();

        let ok = checker.arena_mut().object([("n".to_string(), TypeId::INT)]);
        assert!(checker
            .eval_function(&post, &[Value::new(ok, &ctx())], true, &ctx())
            .is_ok());

        let canvas = Value::new(TypeId::builtin(BuiltinType::HTMLCanvasElement), &ctx());
        let err = checker.eval_function(&post, &[canvas], true, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "HTMLCanvasElement can't cross a postMessage boundary");
    }

    #[test]
    fn map_like_objects_reject_named_writes() {
        let mut checker = Checker::default();
        let dict = checker.arena_mut().map_like_object(Some(TypeId::INT));
        let d = Value::new(dict, &ctx());
        let err = checker
            .set_member(&d, "x", &Value::literal_int(1, &ctx()), &ctx())
            .unwrap_err();
        assert!(matches!(err.error, CheckError::Unsupported { .. }));
    }
}

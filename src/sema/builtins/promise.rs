// src/sema/builtins/promise.rs

use crate::context::Context;
use crate::errors::TypeError;
use crate::sema::builtin::BuiltinType;
use crate::sema::checker::Checker;
use crate::sema::class::{ClassType, CustomConstruct};
use crate::sema::function::{CustomReturn, Signature};
use crate::sema::type_arena::{PromiseContent, TypeArena, TypeId, TypeKind};
use crate::sema::value::Value;

use super::{Slot, arg, callback, custom, function, method};

const ANY: TypeId = TypeId::ANY;

pub(super) fn member(checker: &mut Checker, this: TypeId, content: PromiseContent, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let error = TypeId::builtin(BuiltinType::Error);
    let ty = match key {
        "then" => {
            let handlers: Vec<TypeId> = match content {
                PromiseContent::Void => vec![callback(arena, []), chain(arena, [], this)],
                PromiseContent::Any => any_handlers(arena, this),
                PromiseContent::Of(c) => vec![callback(arena, [c]), chain(arena, [c], this)],
            };
            method(
                arena,
                handlers.into_iter().map(|h| Signature::returning([h], this)),
            )
        }
        "catch" => {
            let handlers: Vec<TypeId> = match content {
                PromiseContent::Any => any_handlers(arena, this),
                _ => vec![callback(arena, [error]), chain(arena, [error], this)],
            };
            method(
                arena,
                handlers.into_iter().map(|h| Signature::returning([h], this)),
            )
        }
        "finally" => {
            let f = callback(arena, []);
            method(arena, [Signature::returning([f], this)])
        }
        // Reads the content: `void` promises resolve to nothing.
        ".resolve" => match content {
            PromiseContent::Void => function(arena, [Signature::void([])]),
            PromiseContent::Any => function(arena, [Signature::returning([], ANY)]),
            PromiseContent::Of(c) => function(arena, [Signature::returning([], c)]),
        },
        _ => return None,
    };
    Some(Slot::read(ty))
}

/// Handlers for an untyped promise: up to three `any` parameters, each
/// arity either plain or chaining.
fn any_handlers(arena: &mut TypeArena, this: TypeId) -> Vec<TypeId> {
    vec![
        callback(arena, []),
        chain(arena, [], this),
        callback(arena, [ANY]),
        chain(arena, [ANY], this),
        callback(arena, [ANY, ANY]),
        chain(arena, [ANY, ANY], this),
        callback(arena, [ANY, ANY, ANY]),
        chain(arena, [ANY, ANY, ANY], this),
    ]
}

/// `fn(params) -> Promise<..>`: a handler that chains another promise.
fn chain<const N: usize>(arena: &mut TypeArena, params: [TypeId; N], promise: TypeId) -> TypeId {
    function(arena, [Signature::returning(params, promise)])
}

pub(super) fn static_member(checker: &mut Checker, key: &str) -> Option<TypeId> {
    let arena = &mut checker.arena;
    match key {
        "all" => {
            let any_promise = arena.promise(None);
            let promises = arena.array(Some(any_promise));
            Some(custom(
                arena,
                [Signature::returning([promises], any_promise)],
                CustomReturn::PromiseAll,
            ))
        }
        "reject" => {
            let any_promise = arena.promise(None);
            let error = TypeId::builtin(BuiltinType::Error);
            Some(function(arena, [Signature::returning([error], any_promise)]))
        }
        _ => None,
    }
}

/// `Promise.all(Array<Promise<T>>)` is `Promise<Array<T>>`; all-void
/// promises give `Promise<void>`.
pub(super) fn eval_all(checker: &mut Checker, args: &[Value], ctx: &Context) -> Result<Value, TypeError> {
    let promises = arg(args, 0, CustomReturn::PromiseAll);
    let promise = checker.get_member(promises, ".getof", ctx)?;
    let content = match checker.arena.get(promise.type_id()) {
        TypeKind::Promise(content) => *content,
        _ => PromiseContent::Any,
    };
    let result = match content {
        PromiseContent::Void => checker.arena.void_promise(),
        PromiseContent::Any => {
            let array = checker.arena.array(None);
            checker.arena.promise(Some(array))
        }
        PromiseContent::Of(c) => {
            let array = checker.arena.array(Some(c));
            checker.arena.promise(Some(array))
        }
    };
    tracing::debug!(result = %checker.arena.display(result), "Promise.all");
    Ok(Value::new(result, ctx))
}

/// `new Promise((resolve, reject) => ..)`.
pub(super) fn class(arena: &mut TypeArena) -> ClassType {
    let owner = arena.promise(None);
    let error = TypeId::builtin(BuiltinType::Error);
    let resolve_any = callback(arena, [ANY]);
    let resolve_void = callback(arena, []);
    let reject = callback(arena, [error]);
    let executors = [
        function(arena, [Signature::void([resolve_any, reject])]),
        function(arena, [Signature::void([resolve_void, reject])]),
        function(arena, [Signature::void([resolve_any])]),
        function(arena, [Signature::void([resolve_void])]),
    ];
    ClassType::custom(
        Some(owner),
        executors.into_iter().map(|e| std::iter::once(e).collect()),
        CustomConstruct::Promise,
    )
}

/// The content is the executor's `resolve` parameter: `Promise<T>` for
/// `resolve(T)`, `Promise<void>` for `resolve()`.
pub(super) fn construct(checker: &mut Checker, args: &[Value], ctx: &Context) -> Result<TypeId, TypeError> {
    let Some(executor) = args.first() else {
        panic!("Promise constructor called without an executor after overload matching");
    };
    let resolve = checker.get_member(executor, ".arg0", ctx)?;
    let param = match checker.arena.get(resolve.type_id()) {
        TypeKind::Function(f) => match f.overloads().first() {
            Some(sig) => Some(sig.params.first().copied()),
            None => None,
        },
        _ => None,
    };
    Ok(match param {
        Some(Some(content)) => checker.arena.promise(Some(content)),
        Some(None) => checker.arena.void_promise(),
        None => checker.arena.promise(None),
    })
}

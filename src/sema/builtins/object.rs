// src/sema/builtins/object.rs
//
// Object literals, map-like objects and the `Object` class.

use crate::context::Context;
use crate::errors::TypeError;
use crate::sema::checker::Checker;
use crate::sema::function::{CustomReturn, Signature};
use crate::sema::type_arena::{ObjectShape, TypeId, TypeKind};
use crate::sema::value::Value;

use super::{Slot, arg, custom, function, unsupported};

pub(super) fn member(
    checker: &mut Checker,
    this: TypeId,
    shape: &ObjectShape,
    key: &str,
    ctx: &Context,
) -> Result<Option<Slot>, TypeError> {
    let slot = match key {
        ".getindex" => Slot::read(custom(
            &mut checker.arena,
            [Signature::returning([TypeId::STRING], TypeId::ANY)],
            CustomReturn::ObjectGetIndex(this),
        )),
        ".setindex" => Slot::read(custom(
            &mut checker.arena,
            [Signature::void([TypeId::STRING, TypeId::ANY])],
            CustomReturn::ObjectSetIndex(this),
        )),
        ".getin" => Slot::read(TypeId::STRING),
        ".getof" => {
            return Err(unsupported(checker, this, key, "loop over the keys with 'for in'", ctx));
        }
        _ => match shape.member(key) {
            Some(ty) => Slot::read_write(ty),
            None => return Ok(None),
        },
    };
    Ok(Some(slot))
}

pub(super) fn static_member(checker: &mut Checker, key: &str) -> Option<TypeId> {
    let arena = &mut checker.arena;
    let object = arena.map_like_object(None);
    match key {
        "assign" => Some(custom(
            arena,
            [Signature::returning([object, object], object)],
            CustomReturn::ObjectAssign,
        )),
        "keys" => {
            let strings = arena.array(Some(TypeId::STRING));
            Some(function(arena, [Signature::returning([object], strings)]))
        }
        "values" => {
            let any = arena.array(None);
            Some(function(arena, [Signature::returning([object], any)]))
        }
        _ => None,
    }
}

fn shape_of(checker: &Checker, ty: TypeId) -> Option<ObjectShape> {
    match checker.arena.get(ty) {
        TypeKind::Object(shape) => Some((**shape).clone()),
        _ => None,
    }
}

/// Members of the first argument overwritten by those of the second. Two
/// map-like objects merge into a map-like object of their common type.
pub(super) fn eval_assign(checker: &mut Checker, args: &[Value], ctx: &Context) -> Result<Value, TypeError> {
    let rule = CustomReturn::ObjectAssign;
    let target = shape_of(checker, arg(args, 0, rule).type_id());
    let source = shape_of(checker, arg(args, 1, rule).type_id());
    let merged = match (target, source) {
        (
            Some(ObjectShape {
                members: Some(target),
                ..
            }),
            Some(ObjectShape {
                members: Some(source),
                ..
            }),
        ) => {
            let mut members = target;
            for (key, ty) in source {
                members.retain(|(k, _)| *k != key);
                members.push((key, ty));
            }
            checker.arena.object(members)
        }
        (Some(target), Some(source)) => {
            let commons = [
                target.common.unwrap_or(TypeId::ANY),
                source.common.unwrap_or(TypeId::ANY),
            ];
            let common = checker.common_type(&commons);
            checker.arena.map_like_object(Some(common))
        }
        _ => checker.arena.map_like_object(None),
    };
    tracing::debug!(result = %checker.arena.display(merged), "Object.assign");
    Ok(Value::new(merged, ctx))
}

/// A literal key picks its member; other keys give the common type.
pub(super) fn eval_get_index(
    checker: &mut Checker,
    object: TypeId,
    args: &[Value],
    ctx: &Context,
) -> Result<Value, TypeError> {
    let key = arg(args, 0, CustomReturn::ObjectGetIndex(object));
    let Some(shape) = shape_of(checker, object) else {
        return Ok(Value::any(ctx));
    };
    if let (Some(k), Some(_)) = (key.literal_string_value(), &shape.members) {
        return match shape.member(k) {
            Some(ty) => Ok(checker.arena.value(ty, ctx)),
            None => Err(checker.missing_member(object, k, key.context())),
        };
    }
    Ok(checker.arena.value(shape.common.unwrap_or(TypeId::ANY), ctx))
}

pub(super) fn eval_set_index(
    checker: &mut Checker,
    object: TypeId,
    args: &[Value],
    _ctx: &Context,
) -> Result<(), TypeError> {
    let rule = CustomReturn::ObjectSetIndex(object);
    let key = arg(args, 0, rule);
    let value = arg(args, 1, rule);
    let Some(shape) = shape_of(checker, object) else {
        return Ok(());
    };
    let expected = key
        .literal_string_value()
        .and_then(|k| shape.member(k))
        .or(shape.common);
    match expected {
        Some(expected) => {
            let actual = checker.arena.value_type(value);
            checker.check(expected, actual, value.context())
        }
        None => Ok(()),
    }
}

// src/sema/builtins/collections.rs
//
// Array, Set, Map, Tuple and the typed arrays.

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::checker::Checker;
use crate::sema::function::{CustomReturn, Signature};
use crate::sema::type_arena::{TypeId, TypeKind, TypedArrayKind};
use crate::sema::value::Value;

use super::{Slot, arg, callback, custom, function, method, unsupported};

const S: TypeId = TypeId::STRING;
const I: TypeId = TypeId::INT;
const N: TypeId = TypeId::NUMBER;
const B: TypeId = TypeId::BOOLEAN;
const ANY: TypeId = TypeId::ANY;

// ============================================================================
// Array
// ============================================================================

pub(super) fn array_member(
    checker: &mut Checker,
    this: TypeId,
    content: Option<TypeId>,
    key: &str,
    ctx: &Context,
) -> Result<Option<Slot>, TypeError> {
    let c = content.unwrap_or(ANY);
    let arena = &mut checker.arena;
    let ty = match key {
        "length" => I,
        ".getof" => c,
        ".getindex" => function(arena, [Signature::returning([I], c)]),
        ".setindex" => function(arena, [Signature::void([I, c])]),
        ".getin" => {
            return Err(unsupported(
                checker,
                this,
                key,
                "use a regular 'for', or 'for of' if only the items matter",
                ctx,
            ));
        }
        "concat" => function(arena, [Signature::returning([this], this)]),
        "every" | "some" => {
            let p1 = function(arena, [Signature::returning([c], B)]);
            let p2 = function(arena, [Signature::returning([c, I], B)]);
            function(arena, [Signature::returning([p1], B), Signature::returning([p2], B)])
        }
        "fill" => method(arena, [Signature::returning([c], this)]),
        "filter" => {
            let p1 = function(arena, [Signature::returning([c], B)]);
            let p2 = function(arena, [Signature::returning([c, I], B)]);
            function(
                arena,
                [Signature::returning([p1], this), Signature::returning([p2], this)],
            )
        }
        "findIndex" => {
            let p1 = function(arena, [Signature::returning([c], B)]);
            let p2 = function(arena, [Signature::returning([c, I], B)]);
            function(arena, [Signature::returning([p1], I), Signature::returning([p2], I)])
        }
        "forEach" => {
            let f1 = callback(arena, [c]);
            let f2 = callback(arena, [c, I]);
            function(arena, [Signature::void([f1]), Signature::void([f2])])
        }
        "includes" => function(arena, [Signature::returning([c], B)]),
        "indexOf" | "lastIndexOf" => function(
            arena,
            [Signature::returning([c], I), Signature::returning([c, I], I)],
        ),
        "join" => function(arena, [Signature::returning([], S), Signature::returning([S], S)]),
        "map" => {
            let f1 = function(arena, [Signature::returning([c], ANY)]);
            let f2 = function(arena, [Signature::returning([c, I], ANY)]);
            custom(
                arena,
                [Signature::returning([f1], ANY), Signature::returning([f2], ANY)],
                CustomReturn::ArrayMap,
            )
        }
        "pop" | "shift" => function(arena, [Signature::returning([], c)]),
        "push" | "unshift" => method(arena, [Signature::returning([c], this)]),
        "reduce" | "reduceRight" => {
            let f1 = function(arena, [Signature::returning([c, c], c)]);
            let f2 = function(arena, [Signature::returning([c, c, I], c)]);
            function(
                arena,
                [
                    Signature::returning([f1], c),
                    Signature::returning([f2], c),
                    Signature::returning([f1, c], c),
                    Signature::returning([f2, c], c),
                ],
            )
        }
        "reverse" => method(arena, [Signature::returning([], this)]),
        "slice" => function(
            arena,
            [
                Signature::returning([], this),
                Signature::returning([I], this),
                Signature::returning([I, I], this),
            ],
        ),
        "sort" => {
            let cmp = function(arena, [Signature::returning([c, c], N)]);
            method(arena, [Signature::returning([], this), Signature::returning([cmp], this)])
        }
        "splice" => method(
            arena,
            [Signature::returning([I], this), Signature::returning([I, I], this)],
        ),
        _ => return Ok(None),
    };
    Ok(Some(Slot::read(ty)))
}

pub(super) fn array_static(checker: &mut Checker, key: &str) -> Option<TypeId> {
    let arena = &mut checker.arena;
    let ty = match key {
        "isArray" => function(arena, [Signature::returning([ANY], B)]),
        "from" => {
            let any_array = arena.array(None);
            let any_set = arena.set(None);
            let any_map = arena.map(None, None);
            custom(
                arena,
                [
                    Signature::returning([any_array], any_array),
                    Signature::returning([any_set], any_array),
                    Signature::returning([any_map], any_array),
                    Signature::returning([S], any_array),
                ],
                CustomReturn::ArrayFrom,
            )
        }
        _ => return None,
    };
    Some(ty)
}

/// `Array<callback.return>`
pub(super) fn eval_map(checker: &mut Checker, args: &[Value], ctx: &Context) -> Result<Value, TypeError> {
    let callback = arg(args, 0, CustomReturn::ArrayMap);
    let ret = checker.get_member(callback, ".return", ctx)?;
    let ret = ret.remove_literalness().type_id();
    let array = checker.arena.array(Some(ret));
    tracing::debug!(result = %checker.arena.display(array), "Array.map");
    Ok(Value::new(array, ctx))
}

/// `Array<iterable.getof>`
pub(super) fn eval_from(checker: &mut Checker, args: &[Value], ctx: &Context) -> Result<Value, TypeError> {
    let iterable = arg(args, 0, CustomReturn::ArrayFrom);
    let item = checker.get_member(iterable, ".getof", ctx)?;
    let item = item.remove_literalness().type_id();
    Ok(Value::new(checker.arena.array(Some(item)), ctx))
}

// ============================================================================
// Set and Map
// ============================================================================

pub(super) fn set_member(checker: &mut Checker, this: TypeId, content: Option<TypeId>, key: &str) -> Option<Slot> {
    let c = content.unwrap_or(ANY);
    let arena = &mut checker.arena;
    let ty = match key {
        "size" => I,
        ".getof" => c,
        "add" => method(arena, [Signature::returning([c], this)]),
        "clear" => function(arena, [Signature::void([])]),
        "delete" => method(arena, [Signature::returning([c], B)]),
        "has" => function(arena, [Signature::returning([c], B)]),
        "forEach" => {
            let f = callback(arena, [c]);
            function(arena, [Signature::void([f])])
        }
        _ => return None,
    };
    Some(Slot::read(ty))
}

pub(super) fn map_member(
    checker: &mut Checker,
    key_type: Option<TypeId>,
    item: Option<TypeId>,
    key: &str,
) -> Option<Slot> {
    let k = key_type.unwrap_or(ANY);
    let v = item.unwrap_or(ANY);
    let arena = &mut checker.arena;
    let ty = match key {
        "size" => I,
        ".getof" => arena.tuple(Some([k, v])),
        "clear" => function(arena, [Signature::void([])]),
        "delete" => method(arena, [Signature::returning([k], B)]),
        "get" => function(arena, [Signature::returning([k], v)]),
        "set" => function(arena, [Signature::void([k, v])]),
        "has" => function(arena, [Signature::returning([k], B)]),
        "forEach" => {
            let f = callback(arena, [v, k]);
            function(arena, [Signature::void([f])])
        }
        _ => return None,
    };
    Some(Slot::read(ty))
}

// ============================================================================
// Tuple
// ============================================================================

/// Only the index pseudo-keys; everything else comes from the `Array`
/// parent.
pub(super) fn tuple_member(checker: &mut Checker, this: TypeId, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let ty = match key {
        ".getindex" => custom(arena, [Signature::returning([I], ANY)], CustomReturn::TupleGetIndex(this)),
        ".setindex" => custom(arena, [Signature::void([I, ANY])], CustomReturn::TupleSetIndex(this)),
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn tuple_items(checker: &Checker, tuple: TypeId) -> Option<Vec<TypeId>> {
    match checker.arena.get(tuple) {
        TypeKind::Tuple(items) => items.as_ref().map(|items| items.to_vec()),
        _ => None,
    }
}

/// A literal index picks its element; anything else the common type.
fn tuple_element(
    checker: &mut Checker,
    tuple: TypeId,
    index: &Value,
    rule: CustomReturn,
) -> Result<TypeId, TypeError> {
    let Some(items) = tuple_items(checker, tuple) else {
        return Ok(ANY);
    };
    match index.literal_int_value() {
        Some(i) => {
            let Some(item) = usize::try_from(i).ok().and_then(|i| items.get(i)) else {
                return Err(TypeError::new(
                    CheckError::OutOfRange {
                        index: i,
                        len: items.len(),
                    },
                    index.context(),
                ));
            };
            tracing::trace!(%rule, index = i, "literal tuple index");
            Ok(*item)
        }
        None => Ok(checker.common_type(&items)),
    }
}

pub(super) fn eval_tuple_get(
    checker: &mut Checker,
    tuple: TypeId,
    args: &[Value],
    ctx: &Context,
) -> Result<Value, TypeError> {
    let rule = CustomReturn::TupleGetIndex(tuple);
    let element = tuple_element(checker, tuple, arg(args, 0, rule), rule)?;
    Ok(checker.arena.value(element, ctx))
}

pub(super) fn eval_tuple_set(
    checker: &mut Checker,
    tuple: TypeId,
    args: &[Value],
    _ctx: &Context,
) -> Result<(), TypeError> {
    let rule = CustomReturn::TupleSetIndex(tuple);
    let element = tuple_element(checker, tuple, arg(args, 0, rule), rule)?;
    let value = arg(args, 1, rule);
    let actual = checker.arena.value_type(value);
    checker.check(element, actual, value.context())
}

// ============================================================================
// Typed arrays
// ============================================================================

pub(super) fn typed_array_member(
    checker: &mut Checker,
    this: TypeId,
    kind: TypedArrayKind,
    key: &str,
) -> Option<Slot> {
    let e = kind.element();
    let arena = &mut checker.arena;
    let ty = match key {
        "length" | "BYTES_PER_ELEMENT" | "byteLength" | "byteOffset" => I,
        ".getof" => e,
        ".getindex" => function(arena, [Signature::returning([I], e)]),
        ".setindex" => function(arena, [Signature::void([I, e])]),
        "set" => {
            let elements = arena.array(Some(e));
            function(
                arena,
                [
                    Signature::void([this]),
                    Signature::void([this, I]),
                    Signature::void([elements]),
                    Signature::void([elements, I]),
                ],
            )
        }
        "slice" | "subarray" => function(
            arena,
            [
                Signature::returning([], this),
                Signature::returning([I], this),
                Signature::returning([I, I], this),
            ],
        ),
        "fill" => method(arena, [Signature::returning([e], this)]),
        _ => return None,
    };
    Some(Slot::read(ty))
}

pub(super) fn typed_array_static(
    checker: &mut Checker,
    this: TypeId,
    kind: TypedArrayKind,
    key: &str,
) -> Option<TypeId> {
    match key {
        "BYTES_PER_ELEMENT" => Some(I),
        "from" => {
            let elements = checker.arena.array(Some(kind.element()));
            Some(function(&mut checker.arena, [Signature::returning([elements], this)]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::errors::CheckError;
    use crate::sema::checker::Checker;
    use crate::sema::function::{FunctionType, Signature};
    use crate::sema::type_arena::{TypeId, TypedArrayKind};
    use crate::sema::value::Value;

    fn ctx() -> Context {
        Context::dummy()
    }

    #[test]
    fn map_returns_array_of_callback_result() {
        let mut checker = Checker::default();
        let ints = checker.arena_mut().array(Some(TypeId::INT));
        let cb = checker
            .arena_mut()
            .function(FunctionType::new([Signature::returning([TypeId::INT], TypeId::STRING)]));
        let map = checker.get_member(&Value::new(ints, &ctx()), "map", &ctx()).unwrap();
        let out = checker
            .eval_function(&map, &[Value::new(cb, &ctx())], false, &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(checker.display(out.type_id()), "Array<String>");

        // The callback must take the array's content.
        let bad = checker
            .arena_mut()
            .function(FunctionType::new([Signature::returning([TypeId::STRING], TypeId::STRING)]));
        assert!(checker
            .eval_function(&map, &[Value::new(bad, &ctx())], false, &ctx())
            .is_err());
    }

    #[test]
    fn push_is_method_like() {
        let mut checker = Checker::default();
        let ints = checker.arena_mut().array(Some(TypeId::INT));
        let push = checker.get_member(&Value::new(ints, &ctx()), "push", &ctx()).unwrap();
        let args = [Value::literal_int(1, &ctx())];
        assert!(checker.eval_function(&push, &args, true, &ctx()).unwrap().is_none());
        let out = checker.eval_function(&push, &args, false, &ctx()).unwrap().unwrap();
        assert_eq!(out.type_id(), ints);
        assert!(checker
            .eval_function(&push, &[Value::literal_string("x", &ctx())], true, &ctx())
            .is_err());
    }

    #[test]
    fn array_for_in_is_refused() {
        let mut checker = Checker::default();
        let ints = checker.arena_mut().array(Some(TypeId::INT));
        let err = checker
            .get_member(&Value::new(ints, &ctx()), ".getin", &ctx())
            .unwrap_err();
        assert!(matches!(err.error, CheckError::Unsupported { .. }));
    }

    #[test]
    fn array_from_set() {
        let mut checker = Checker::default();
        let array = checker.arena_mut().array(None);
        let class = Value::new(checker.class_of(array).unwrap(), &ctx());
        let from = checker.get_class_member(&class, "from", &ctx()).unwrap();
        let set = checker.arena_mut().set(Some(TypeId::STRING));
        let out = checker
            .eval_function(&from, &[Value::new(set, &ctx())], false, &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(checker.display(out.type_id()), "Array<String>");
    }

    #[test]
    fn tuple_indexing() {
        let mut checker = Checker::default();
        let tuple = checker.arena_mut().tuple(Some([TypeId::INT, TypeId::STRING]));
        let t = Value::new(tuple, &ctx());
        let get = checker.get_member(&t, ".getindex", &ctx()).unwrap();

        let second = checker
            .eval_function(&get, &[Value::literal_int(1, &ctx())], false, &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(second.type_id(), TypeId::STRING);

        let err = checker
            .eval_function(&get, &[Value::literal_int(2, &ctx())], false, &ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "index 2 out of tuple range (length 2)");

        let dynamic = checker
            .eval_function(&get, &[Value::new(TypeId::INT, &ctx())], false, &ctx())
            .unwrap()
            .unwrap();
        assert!(dynamic.is_any());

        let set = checker.get_member(&t, ".setindex", &ctx()).unwrap();
        let args = [Value::literal_int(0, &ctx()), Value::literal_string("x", &ctx())];
        let err = checker.eval_function(&set, &args, true, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "expected Int, got String");
    }

    #[test]
    fn tuple_inherits_array_members() {
        let mut checker = Checker::default();
        let tuple = checker.arena_mut().tuple(Some([TypeId::INT, TypeId::NUMBER]));
        let len = checker.get_member(&Value::new(tuple, &ctx()), "length", &ctx()).unwrap();
        assert_eq!(len.type_id(), TypeId::INT);
    }

    #[test]
    fn typed_array_elements() {
        let mut checker = Checker::default();
        let bytes = checker.arena_mut().typed_array(TypedArrayKind::Uint8);
        let get = checker
            .get_member(&Value::new(bytes, &ctx()), ".getindex", &ctx())
            .unwrap();
        let out = checker
            .eval_function(&get, &[Value::literal_int(0, &ctx())], false, &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(out.type_id(), TypeId::INT);
    }
}

// src/sema/builtins/primitives.rs
//
// String, Number, Int, BigInt, Boolean, Date, Error, RegExp.

use crate::sema::builtin::BuiltinType;
use crate::sema::checker::Checker;
use crate::sema::function::Signature;
use crate::sema::type_arena::TypeId;

use super::{Slot, function, method};

const S: TypeId = TypeId::STRING;
const I: TypeId = TypeId::INT;
const N: TypeId = TypeId::NUMBER;
const B: TypeId = TypeId::BOOLEAN;
const ANY: TypeId = TypeId::ANY;

pub(super) fn is_primitive(b: BuiltinType) -> bool {
    matches!(
        b,
        BuiltinType::String
            | BuiltinType::Number
            | BuiltinType::Int
            | BuiltinType::BigInt
            | BuiltinType::Boolean
            | BuiltinType::Date
            | BuiltinType::Error
            | BuiltinType::RegExp
    )
}

pub(super) fn member(checker: &mut Checker, b: BuiltinType, key: &str) -> Option<Slot> {
    match b {
        BuiltinType::String => string_member(checker, key),
        BuiltinType::Number => number_member(checker, key),
        BuiltinType::Int | BuiltinType::BigInt => match key {
            "toString" => Some(Slot::read(to_string(checker))),
            _ => None,
        },
        BuiltinType::Date => date_member(checker, key),
        BuiltinType::Error => match key {
            "message" | "name" | "stack" => Some(Slot::read(S)),
            _ => None,
        },
        BuiltinType::RegExp => regexp_member(checker, key),
        _ => None,
    }
}

fn to_string(checker: &mut Checker) -> TypeId {
    function(
        &mut checker.arena,
        [Signature::returning([], S), Signature::returning([I], S)],
    )
}

fn string_member(checker: &mut Checker, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let strings = arena.array(Some(S));
    let regexp = TypeId::builtin(BuiltinType::RegExp);
    let ty = match key {
        "length" => I,
        ".getof" => S,
        ".getindex" | "charAt" => function(arena, [Signature::returning([I], S)]),
        "charCodeAt" | "codePointAt" => function(arena, [Signature::returning([I], I)]),
        "concat" => function(
            arena,
            [
                Signature::returning([S], S),
                Signature::returning([S, S], S),
                Signature::returning([S, S, S], S),
            ],
        ),
        "endsWith" | "includes" | "startsWith" => function(
            arena,
            [Signature::returning([S], B), Signature::returning([S, I], B)],
        ),
        "indexOf" | "lastIndexOf" => function(
            arena,
            [Signature::returning([S], I), Signature::returning([S, I], I)],
        ),
        "match" => function(arena, [Signature::returning([regexp], strings)]),
        "padEnd" | "padStart" => function(
            arena,
            [Signature::returning([I], S), Signature::returning([I, S], S)],
        ),
        "repeat" => function(arena, [Signature::returning([I], S)]),
        "replace" | "replaceAll" => {
            let replacer = function(arena, [Signature::returning([S], S)]);
            function(
                arena,
                [
                    Signature::returning([S, S], S),
                    Signature::returning([S, replacer], S),
                    Signature::returning([regexp, S], S),
                    Signature::returning([regexp, replacer], S),
                ],
            )
        }
        "search" => function(
            arena,
            [Signature::returning([S], I), Signature::returning([regexp], I)],
        ),
        "slice" | "substring" => function(
            arena,
            [Signature::returning([I], S), Signature::returning([I, I], S)],
        ),
        "split" => function(
            arena,
            [
                Signature::returning([S], strings),
                Signature::returning([S, I], strings),
                Signature::returning([regexp], strings),
                Signature::returning([regexp, I], strings),
            ],
        ),
        "toLowerCase" | "toUpperCase" | "trim" | "trimEnd" | "trimStart" => {
            function(arena, [Signature::returning([], S)])
        }
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn number_member(checker: &mut Checker, key: &str) -> Option<Slot> {
    match key {
        "toExponential" | "toFixed" | "toPrecision" | "toString" => Some(Slot::read(to_string(checker))),
        "toLocaleString" => Some(Slot::read(function(
            &mut checker.arena,
            [Signature::returning([], S), Signature::returning([S], S)],
        ))),
        _ => None,
    }
}

fn date_member(checker: &mut Checker, key: &str) -> Option<Slot> {
    let arena = &mut checker.arena;
    let ty = match key {
        "getDate" | "getDay" | "getFullYear" | "getHours" | "getMilliseconds" | "getMinutes"
        | "getMonth" | "getSeconds" | "getTime" | "getTimezoneOffset" => {
            function(arena, [Signature::returning([], I)])
        }
        "setTime" => method(arena, [Signature::returning([I], I)]),
        "toISOString" | "toGMTString" | "toUTCString" | "toDateString" => {
            function(arena, [Signature::returning([], S)])
        }
        "toLocaleString" | "toLocaleDateString" | "toLocaleTimeString" => function(
            arena,
            [Signature::returning([], S), Signature::returning([S], S)],
        ),
        _ => return None,
    };
    Some(Slot::read(ty))
}

fn regexp_member(checker: &mut Checker, key: &str) -> Option<Slot> {
    let slot = match key {
        "exec" => {
            let strings = checker.arena.array(Some(S));
            Slot::read(function(&mut checker.arena, [Signature::returning([S], strings)]))
        }
        "global" | "ignoreCase" | "multiline" => Slot::read(B),
        "lastIndex" => Slot::read_write(I),
        "source" | "flags" => Slot::read(S),
        "test" => Slot::read(function(&mut checker.arena, [Signature::returning([S], B)])),
        _ => return None,
    };
    Some(slot)
}

/// `String.fromCharCode`, `Number.parseFloat`, `Date.now`, ...
pub(super) fn static_member(checker: &mut Checker, b: BuiltinType, key: &str) -> Option<TypeId> {
    let arena = &mut checker.arena;
    let ty = match (b, key) {
        (BuiltinType::String, "fromCharCode" | "fromCodePoint") => function(
            arena,
            [
                Signature::returning([I], S),
                Signature::returning([I, I], S),
                Signature::returning([I, I, I], S),
            ],
        ),
        (
            BuiltinType::Number,
            "EPSILON" | "MAX_VALUE" | "MIN_VALUE" | "NaN" | "NEGATIVE_INFINITY" | "POSITIVE_INFINITY",
        ) => N,
        (BuiltinType::Number, "MAX_SAFE_INTEGER" | "MIN_SAFE_INTEGER") => I,
        (BuiltinType::Number, "isFinite" | "isInteger" | "isNaN" | "isSafeInteger") => {
            function(arena, [Signature::returning([ANY], B)])
        }
        (BuiltinType::Number, "parseFloat") => function(arena, [Signature::returning([S], N)]),
        (BuiltinType::Number | BuiltinType::Int, "parseInt") => function(
            arena,
            [Signature::returning([S], I), Signature::returning([S, I], I)],
        ),
        (BuiltinType::Date, "now") => function(arena, [Signature::returning([], I)]),
        (BuiltinType::Date, "parse") => function(arena, [Signature::returning([S], I)]),
        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::checker::Checker;
    use crate::sema::type_arena::TypeId;
    use crate::sema::value::Value;

    #[test]
    fn string_methods() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let s = Value::literal_string("a,b", &ctx);
        let split = checker.get_member(&s, "split", &ctx).unwrap();
        let parts = checker
            .eval_function(&split, &[Value::literal_string(",", &ctx)], false, &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(checker.display(parts.type_id()), "Array<String>");

        let slice = checker.get_member(&s, "slice", &ctx).unwrap();
        let err = checker
            .eval_function(&slice, &[Value::literal_string("x", &ctx)], false, &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("no overload of"));
    }

    #[test]
    fn int_finds_number_methods_through_its_parent() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let i = Value::literal_int(3, &ctx);
        let fixed = checker.get_member(&i, "toFixed", &ctx).unwrap();
        let out = checker
            .eval_function(&fixed, &[Value::literal_int(2, &ctx)], false, &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(out.type_id(), TypeId::STRING);
    }

    #[test]
    fn statics() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let class = checker.class_of(TypeId::NUMBER).unwrap();
        let parse = checker
            .get_class_member(&Value::new(class, &ctx), "parseFloat", &ctx)
            .unwrap();
        let n = checker
            .eval_function(&parse, &[Value::literal_string("1.5", &ctx)], false, &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(n.type_id(), TypeId::NUMBER);

        let date = checker.class_of(TypeId::builtin(BuiltinType::Date)).unwrap();
        assert!(checker
            .get_class_member(&Value::new(date, &ctx), "now", &ctx)
            .is_ok());
    }
}

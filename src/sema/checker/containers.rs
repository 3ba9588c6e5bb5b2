// src/sema/checker/containers.rs
//
// Same-shape comparison of generic containers and object literals.
//
// Covariance is one-directional: an unconstrained expected slot accepts any
// held type, but an unconstrained actual slot never satisfies a constrained
// expected one (`Array<Int>` rejects `Array<any>`).

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::type_arena::{ObjectShape, PromiseContent, TypeId, TypeKind, TypedArrayKind};

use super::Checker;

impl Checker {
    /// `None` when the two kinds aren't the same shape, so the caller falls
    /// back to the parent chain.
    pub(super) fn check_same_shape(
        &mut self,
        expected: TypeId,
        expected_kind: &TypeKind,
        actual: TypeId,
        actual_kind: &TypeKind,
        ctx: &Context,
    ) -> Option<Result<(), TypeError>> {
        let result = match (expected_kind, actual_kind) {
            (TypeKind::Array(e), TypeKind::Array(a))
            | (TypeKind::Set(e), TypeKind::Set(a))
            | (TypeKind::Request(e), TypeKind::Request(a)) => {
                self.check_slot(expected, *e, actual, *a, ctx)
            }
            (
                TypeKind::Map {
                    key: expected_key,
                    item: expected_item,
                },
                TypeKind::Map {
                    key: actual_key,
                    item: actual_item,
                },
            ) => self
                .check_slot(expected, *expected_key, actual, *actual_key, ctx)
                .and_then(|()| self.check_slot(expected, *expected_item, actual, *actual_item, ctx)),
            (TypeKind::Promise(e), TypeKind::Promise(a)) => {
                self.check_promise(expected, *e, actual, *a, ctx)
            }
            (TypeKind::Tuple(e), TypeKind::Tuple(a)) => {
                let (e, a) = (e.clone(), a.clone());
                self.check_tuple(expected, e.as_deref(), actual, a.as_deref(), ctx)
            }
            (TypeKind::TypedArray(e), TypeKind::TypedArray(_)) => {
                if *e == TypedArrayKind::Generic {
                    Ok(())
                } else {
                    Err(self.mismatch(expected, actual, ctx))
                }
            }
            (
                TypeKind::Event {
                    kind: expected_event,
                    target: e,
                },
                TypeKind::Event {
                    kind: actual_event,
                    target: a,
                },
            ) if expected_event == actual_event => self.check_slot(expected, *e, actual, *a, ctx),
            (TypeKind::Object(e), TypeKind::Object(a)) => {
                self.check_object(expected, e, actual, a, ctx)
            }
            _ => return None,
        };
        Some(result)
    }

    /// One held slot. Errors name the containers; the held mismatch is
    /// kept as a note.
    fn check_slot(
        &mut self,
        expected: TypeId,
        expected_slot: Option<TypeId>,
        actual: TypeId,
        actual_slot: Option<TypeId>,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        match (expected_slot, actual_slot) {
            (None, _) => Ok(()),
            (Some(_), None) => Err(self.mismatch(expected, actual, ctx)),
            (Some(e), Some(a)) => self
                .check(e, a, ctx)
                .map_err(|inner| self.mismatch(expected, actual, ctx).with_note(inner.to_string())),
        }
    }

    fn check_promise(
        &mut self,
        expected: TypeId,
        expected_content: PromiseContent,
        actual: TypeId,
        actual_content: PromiseContent,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        match (expected_content, actual_content) {
            (PromiseContent::Any, _) | (PromiseContent::Void, PromiseContent::Void) => Ok(()),
            (PromiseContent::Void, _)
            | (PromiseContent::Of(_), PromiseContent::Any)
            | (PromiseContent::Of(_), PromiseContent::Void) => Err(self.mismatch(expected, actual, ctx)),
            (PromiseContent::Of(e), PromiseContent::Of(a)) => {
                self.check_slot(expected, Some(e), actual, Some(a), ctx)
            }
        }
    }

    fn check_tuple(
        &mut self,
        expected: TypeId,
        expected_items: Option<&[TypeId]>,
        actual: TypeId,
        actual_items: Option<&[TypeId]>,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        let Some(expected_items) = expected_items else {
            return Ok(());
        };
        let Some(actual_items) = actual_items else {
            return Err(self.mismatch(expected, actual, ctx));
        };
        if expected_items.len() != actual_items.len() {
            return Err(TypeError::new(
                CheckError::TupleLength {
                    expected: expected_items.len(),
                    found: actual_items.len(),
                },
                ctx,
            ));
        }
        for (e, a) in expected_items.iter().zip(actual_items) {
            self.check_slot(expected, Some(*e), actual, Some(*a), ctx)?;
        }
        Ok(())
    }

    fn check_object(
        &mut self,
        expected: TypeId,
        expected_shape: &ObjectShape,
        actual: TypeId,
        actual_shape: &ObjectShape,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        if !expected_shape.has_members() {
            let Some(common) = expected_shape.common else {
                return Ok(());
            };
            return match (&actual_shape.members, actual_shape.common) {
                (Some(members), _) if !members.is_empty() => {
                    for (_, member) in members {
                        self.check_slot(expected, Some(common), actual, Some(*member), ctx)?;
                    }
                    Ok(())
                }
                (_, actual_common) => self.check_slot(expected, Some(common), actual, actual_common, ctx),
            };
        }

        let expected_members = expected_shape.members.as_deref().unwrap_or(&[]);
        let Some(actual_members) = actual_shape.members.as_deref() else {
            return Err(self.mismatch(expected, actual, ctx));
        };

        if expected_shape.is_config {
            for (key, have) in actual_members {
                let Some(want) = expected_shape.member(key) else {
                    let allowed = expected_members
                        .iter()
                        .map(|(k, _)| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(TypeError::new(
                        CheckError::UnrecognizedOption {
                            option: key.clone(),
                            allowed,
                        },
                        ctx,
                    ));
                };
                self.check_member(actual, key, want, *have, ctx)?;
            }
            return Ok(());
        }

        for (key, want) in expected_members {
            let Some(have) = actual_shape.member(key) else {
                return Err(self.missing_member(actual, key, ctx));
            };
            self.check_member(actual, key, *want, have, ctx)?;
        }
        Ok(())
    }

    fn check_member(
        &mut self,
        owner: TypeId,
        key: &str,
        want: TypeId,
        have: TypeId,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        self.check(want, have, ctx).map_err(|inner| {
            TypeError::new(
                CheckError::MemberMismatch {
                    owner: self.arena.display(owner),
                    member: key.to_string(),
                    expected: self.arena.display(want),
                    found: self.arena.display(have),
                },
                ctx,
            )
            .with_note(inner.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::errors::CheckError;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::checker::Checker;
    use crate::sema::type_arena::{TypeId, TypedArrayKind};

    fn ctx() -> Context {
        Context::dummy()
    }

    #[test]
    fn array_covariance_is_one_directional() {
        let mut checker = Checker::default();
        let ints = checker.arena_mut().array(Some(TypeId::INT));
        let numbers = checker.arena_mut().array(Some(TypeId::NUMBER));
        let open = checker.arena_mut().array(None);

        assert!(checker.check(numbers, ints, &ctx()).is_ok());
        let err = checker.check(ints, numbers, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "expected Array<Int>, got Array<Number>");

        assert!(checker.check(open, ints, &ctx()).is_ok());
        let err = checker.check(ints, open, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "expected Array<Int>, got Array");
    }

    #[test]
    fn set_and_array_are_different_shapes() {
        let mut checker = Checker::default();
        let set = checker.arena_mut().set(Some(TypeId::INT));
        let arr = checker.arena_mut().array(Some(TypeId::INT));
        assert!(checker.check(arr, set, &ctx()).is_err());
    }

    #[test]
    fn map_slots_are_checked_separately() {
        let mut checker = Checker::default();
        let keyed = checker.arena_mut().map(Some(TypeId::STRING), None);
        let full = checker.arena_mut().map(Some(TypeId::STRING), Some(TypeId::INT));
        let wrong_key = checker.arena_mut().map(Some(TypeId::INT), Some(TypeId::INT));
        assert!(checker.check(keyed, full, &ctx()).is_ok());
        assert!(checker.check(keyed, wrong_key, &ctx()).is_err());
        assert!(checker.check(full, keyed, &ctx()).is_err());
    }

    #[test]
    fn void_promise_only_accepts_void() {
        let mut checker = Checker::default();
        let void = checker.arena_mut().void_promise();
        let strings = checker.arena_mut().promise(Some(TypeId::STRING));
        let open = checker.arena_mut().promise(None);

        assert!(checker.check(open, void, &ctx()).is_ok());
        assert!(checker.check(open, strings, &ctx()).is_ok());
        assert!(checker.check(void, strings, &ctx()).is_err());
        assert!(checker.check(strings, void, &ctx()).is_err());
        assert!(checker.check(strings, open, &ctx()).is_err());
    }

    #[test]
    fn tuple_arity_is_exact() {
        let mut checker = Checker::default();
        let ab = checker.arena_mut().tuple(Some([TypeId::INT, TypeId::STRING]));
        let abc = checker
            .arena_mut()
            .tuple(Some([TypeId::INT, TypeId::STRING, TypeId::BOOLEAN]));
        let open = checker.arena_mut().tuple(None::<Vec<TypeId>>);

        let err = checker.check(ab, abc, &ctx()).unwrap_err();
        assert!(matches!(err.error, CheckError::TupleLength { expected: 2, found: 3 }));
        assert!(checker.check(open, abc, &ctx()).is_ok());
        assert!(checker.check(ab, open, &ctx()).is_err());
    }

    #[test]
    fn generic_typed_array_accepts_all_flavours() {
        let mut checker = Checker::default();
        let generic = checker.arena_mut().typed_array(TypedArrayKind::Generic);
        let u8s = checker.arena_mut().typed_array(TypedArrayKind::Uint8);
        let i8s = checker.arena_mut().typed_array(TypedArrayKind::Int8);
        assert!(checker.check(generic, u8s, &ctx()).is_ok());
        assert!(checker.check(u8s, i8s, &ctx()).is_err());
        assert!(checker.check(u8s, generic, &ctx()).is_err());
    }

    #[test]
    fn object_requires_expected_members() {
        let mut checker = Checker::default();
        let want = checker.arena_mut().object([("a".to_string(), TypeId::NUMBER)]);
        let have = checker
            .arena_mut()
            .object([("a".to_string(), TypeId::INT), ("b".to_string(), TypeId::STRING)]);
        let missing = checker.arena_mut().object([("b".to_string(), TypeId::STRING)]);
        let wrong = checker.arena_mut().object([("a".to_string(), TypeId::STRING)]);

        assert!(checker.check(want, have, &ctx()).is_ok());
        let err = checker.check(want, missing, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "{b:String}.a not found");
        let err = checker.check(want, wrong, &ctx()).unwrap_err();
        assert!(matches!(err.error, CheckError::MemberMismatch { .. }));
    }

    #[test]
    fn config_objects_accept_subsets_only() {
        let mut checker = Checker::default();
        let options = checker.arena_mut().config_object([
            ("alpha".to_string(), TypeId::BOOLEAN),
            ("depth".to_string(), TypeId::BOOLEAN),
        ]);
        let subset = checker.arena_mut().object([("alpha".to_string(), TypeId::BOOLEAN)]);
        let unknown = checker.arena_mut().object([("stencil".to_string(), TypeId::BOOLEAN)]);

        assert!(checker.check(options, subset, &ctx()).is_ok());
        let err = checker.check(options, unknown, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized option stencil");
    }

    #[test]
    fn map_like_object_checks_every_value() {
        let mut checker = Checker::default();
        let numbers = checker.arena_mut().map_like_object(Some(TypeId::NUMBER));
        let ok = checker
            .arena_mut()
            .object([("x".to_string(), TypeId::INT), ("y".to_string(), TypeId::NUMBER)]);
        let bad = checker.arena_mut().object([("x".to_string(), TypeId::STRING)]);
        let plain = checker.arena_mut().map_like_object(None);

        assert!(checker.check(numbers, ok, &ctx()).is_ok());
        assert!(checker.check(numbers, bad, &ctx()).is_err());
        assert!(checker.check(numbers, plain, &ctx()).is_err());
        assert!(checker.check(plain, bad, &ctx()).is_ok());
    }

    #[test]
    fn object_rejects_non_objects() {
        let mut checker = Checker::default();
        let want = checker.arena_mut().object([("a".to_string(), TypeId::NUMBER)]);
        let window = TypeId::builtin(BuiltinType::Window);
        assert!(checker.check(want, window, &ctx()).is_err());
    }
}

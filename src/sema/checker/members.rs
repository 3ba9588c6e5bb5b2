// src/sema/checker/members.rs
//
// Member access on values.
//
// Instance lookup walks the parent chain one link at a time, asking each
// prototype for the key and then the conformance stamps recorded for it.
// The first prototype that answers owns the member.

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::builtins;
use crate::sema::type_arena::{TypeId, TypeKind};
use crate::sema::value::Value;

use super::Checker;

impl Checker {
    /// `value.key`. Pseudo-keys (`.getindex`, `.setindex`, `.getof`,
    /// `.getin`, `.argN`, `.return`) go through here too.
    pub fn get_member(&mut self, value: &Value, key: &str, ctx: &Context) -> Result<Value, TypeError> {
        let ty = value.type_id();
        match self.arena.get(ty).clone() {
            TypeKind::Any => Ok(Value::any(ctx)),
            TypeKind::Function(f) => self.function_member(&f, ty, key, ctx),
            TypeKind::Class(_) => self.get_class_member(value, key, ctx),
            _ => match self.find_instance_member(ty, key, ctx)? {
                Some(member) => Ok(member),
                None => Err(self.missing_member(ty, key, ctx)),
            },
        }
    }

    /// `value.key = arg`.
    pub fn set_member(
        &mut self,
        value: &Value,
        key: &str,
        arg: &Value,
        ctx: &Context,
    ) -> Result<(), TypeError> {
        let ty = value.type_id();
        match self.arena.get(ty) {
            TypeKind::Any => return Ok(()),
            TypeKind::Function(_) | TypeKind::Class(_) => {
                return Err(self.not_settable(ty, key, ctx));
            }
            _ => {}
        }

        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(proto) = current {
            self.guard_member_depth(ty, depth, ctx)?;
            if self.set_instance_member(proto, key, arg, ctx)? {
                return Ok(());
            }
            if let Some(stamped) = self.conformance.stamped(proto, key) {
                let actual = self.arena.value_type(arg);
                return self.check(stamped, actual, arg.context());
            }
            current = self.parent_of(proto);
            depth += 1;
        }

        match self.find_instance_member(ty, key, ctx) {
            Ok(Some(_)) => Err(self.not_settable(ty, key, ctx)),
            Ok(None) => Err(self.missing_member(ty, key, ctx)),
            Err(e) => Err(e),
        }
    }

    /// Walk the chain from `ty`; `Ok(None)` when no prototype has `key`.
    pub(crate) fn find_instance_member(
        &mut self,
        ty: TypeId,
        key: &str,
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(proto) = current {
            self.guard_member_depth(ty, depth, ctx)?;
            if let Some(member) = self.instance_member(proto, key, ctx)? {
                return Ok(Some(member));
            }
            if let Some(stamped) = self.conformance.stamped(proto, key) {
                return Ok(Some(self.arena.value(stamped, ctx)));
            }
            current = self.parent_of(proto);
            depth += 1;
        }
        Ok(None)
    }

    /// Members declared directly on `proto` (no parent walk).
    pub(crate) fn instance_member(
        &mut self,
        proto: TypeId,
        key: &str,
        ctx: &Context,
    ) -> Result<Option<Value>, TypeError> {
        match self.arena.get(proto).clone() {
            TypeKind::Interface(interface) => self.interface_member(proto, interface, key, ctx),
            TypeKind::Declared(class) => self.declared_member(proto, class, key, ctx),
            _ => builtins::instance_member(self, proto, key, ctx),
        }
    }

    /// `Ok(false)` when `proto` doesn't declare `key` itself.
    pub(crate) fn set_instance_member(
        &mut self,
        proto: TypeId,
        key: &str,
        arg: &Value,
        ctx: &Context,
    ) -> Result<bool, TypeError> {
        match self.arena.get(proto).clone() {
            TypeKind::Interface(interface) => self.set_interface_member(proto, interface, key, arg, ctx),
            TypeKind::Declared(class) => self.set_declared_member(proto, class, key, arg, ctx),
            _ => builtins::set_instance_member(self, proto, key, arg, ctx),
        }
    }

    fn guard_member_depth(&self, ty: TypeId, depth: usize, ctx: &Context) -> Result<(), TypeError> {
        if depth > self.config.max_parent_depth {
            tracing::warn!(ty = %self.arena.display(ty), depth, "member lookup exceeds max_parent_depth");
            return Err(TypeError::new(
                CheckError::ParentChainTooDeep {
                    type_name: self.arena.display(ty),
                    depth,
                },
                ctx,
            ));
        }
        Ok(())
    }

    pub(crate) fn not_settable(&self, owner: TypeId, key: &str, ctx: &Context) -> TypeError {
        TypeError::new(
            CheckError::NotSettable {
                owner: self.arena.display(owner),
                member: key.to_string(),
            },
            ctx,
        )
    }

    pub(crate) fn setter_only(&self, owner: TypeId, key: &str, ctx: &Context) -> TypeError {
        TypeError::new(
            CheckError::SetterOnly {
                owner: self.arena.display(owner),
                member: key.to_string(),
            },
            ctx,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::errors::CheckError;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::checker::Checker;
    use crate::sema::type_arena::TypeId;
    use crate::sema::value::Value;

    #[test]
    fn lookup_walks_parents() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let canvas = Value::new(TypeId::builtin(BuiltinType::HTMLCanvasElement), &ctx);
        // `id` is declared on Element, two links up.
        let id = checker.get_member(&canvas, "id", &ctx).unwrap();
        assert_eq!(id.type_id(), TypeId::STRING);
        // `addEventListener` on EventTarget, four links up.
        assert!(checker.get_member(&canvas, "addEventListener", &ctx).is_ok());
    }

    #[test]
    fn missing_member_names_the_receiver() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let canvas = Value::new(TypeId::builtin(BuiltinType::HTMLCanvasElement), &ctx);
        let err = checker.get_member(&canvas, "nope", &ctx).unwrap_err();
        assert_eq!(err.to_string(), "HTMLCanvasElement.nope not found");
    }

    #[test]
    fn setting_checks_the_declared_type() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let canvas = Value::new(TypeId::builtin(BuiltinType::HTMLCanvasElement), &ctx);
        assert!(checker
            .set_member(&canvas, "width", &Value::literal_int(640, &ctx), &ctx)
            .is_ok());
        let err = checker
            .set_member(&canvas, "width", &Value::literal_string("wide", &ctx), &ctx)
            .unwrap_err();
        assert_eq!(err.to_string(), "expected Int, got String");
    }

    #[test]
    fn read_only_members_are_not_settable() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let s = Value::new(TypeId::STRING, &ctx);
        let err = checker
            .set_member(&s, "length", &Value::literal_int(1, &ctx), &ctx)
            .unwrap_err();
        assert!(matches!(err.error, CheckError::NotSettable { .. }));
        let err = checker
            .set_member(&s, "nope", &Value::literal_int(1, &ctx), &ctx)
            .unwrap_err();
        assert!(matches!(err.error, CheckError::MissingMember { .. }));
    }

    #[test]
    fn any_has_every_member() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let any = Value::any(&ctx);
        assert!(checker.get_member(&any, "whatever", &ctx).unwrap().is_any());
        assert!(checker.set_member(&any, "whatever", &any, &ctx).is_ok());
    }
}

// src/sema/checker/boundary.rs
//
// Serialization boundaries (worker messages, RPC).

use crate::context::Context;
use crate::errors::{CheckError, TypeError};
use crate::sema::type_arena::TypeId;
use crate::sema::value::Value;

use super::Checker;

impl Checker {
    /// A value about to cross `boundary` (e.g. "postMessage") must be
    /// universal.
    pub fn check_boundary(&self, value: &Value, boundary: &str, ctx: &Context) -> Result<(), TypeError> {
        let ty = value.type_id();
        if self.is_universal(ty) {
            return Ok(());
        }
        tracing::debug!(ty = %self.arena.display(ty), boundary, "non-universal value at boundary");
        Err(TypeError::new(
            CheckError::NotUniversal {
                type_name: self.arena.display(ty),
                boundary: boundary.to_string(),
            },
            ctx,
        ))
    }

    /// RPC client/server construction: the interface must be RPC or
    /// universal.
    pub fn check_rpc_interface(&self, interface: TypeId, ctx: &Context) -> Result<(), TypeError> {
        if self.is_rpc(interface) || self.is_universal(interface) {
            return Ok(());
        }
        Err(TypeError::new(
            CheckError::NotRpc {
                type_name: self.arena.display(interface),
            },
            ctx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::builtin::BuiltinType;
    use crate::sema::declared::InterfaceDecl;
    use crate::sema::function::{FunctionType, Signature};

    #[test]
    fn host_types_cannot_cross() {
        let checker = Checker::default();
        let ctx = Context::dummy();
        let window = Value::new(TypeId::builtin(BuiltinType::Window), &ctx);
        let err = checker.check_boundary(&window, "postMessage", &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Window can't cross a postMessage boundary");
        assert!(checker
            .check_boundary(&Value::new(TypeId::STRING, &ctx), "postMessage", &ctx)
            .is_ok());
    }

    #[test]
    fn rpc_flag_opts_in() {
        let mut checker = Checker::default();
        let ctx = Context::dummy();
        let get = checker
            .arena_mut()
            .function(FunctionType::new([Signature::returning([TypeId::STRING], TypeId::INT)]));
        let api = checker
            .declare_interface(InterfaceDecl::new("Api").getter("get", get).rpc(), &ctx)
            .unwrap();
        let plain = checker
            .declare_interface(InterfaceDecl::new("Plain").getter("get", get), &ctx)
            .unwrap();
        assert!(checker.check_rpc_interface(api, &ctx).is_ok());
        // No implementations yet: vacuously universal.
        assert!(checker.check_rpc_interface(plain, &ctx).is_ok());

        let window = TypeId::builtin(BuiltinType::Window);
        let err = checker.check_rpc_interface(window, &ctx).unwrap_err();
        assert!(matches!(err.error, CheckError::NotRpc { .. }));
    }
}

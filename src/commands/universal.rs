// src/commands/universal.rs

use std::process::ExitCode;

use super::common::{Session, finish};

/// Prints `universal`, `rpc` or fails with the boundary error.
pub fn universal_type(session: &mut Session, ty: &str, rpc: bool) -> ExitCode {
    finish(run(session, ty, rpc))
}

fn run(session: &mut Session, ty: &str, rpc: bool) -> Result<(), ExitCode> {
    let value = session.value("type", ty)?;
    let ctx = value.context().clone();
    let checker = &session.checker;
    let result = if rpc {
        checker.check_rpc_interface(value.type_id(), &ctx)
    } else {
        checker.check_boundary(&value, "thread", &ctx)
    };
    match result {
        Ok(()) if checker.is_universal(value.type_id()) => {
            println!("universal");
            Ok(())
        }
        Ok(()) => {
            println!("rpc");
            Ok(())
        }
        Err(e) => Err(session.report(e)),
    }
}

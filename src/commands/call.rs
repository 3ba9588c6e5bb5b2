// src/commands/call.rs
//! `call` and `new`: overload resolution from the command line.

use std::process::ExitCode;

use crate::errors::{CheckError, TypeError};
use crate::sema::Value;

use super::common::{Session, finish};

pub fn call_function(session: &mut Session, function: &str, args: &[String], method: bool) -> ExitCode {
    finish(run_call(session, function, args, method))
}

pub fn construct(session: &mut Session, ty: &str, args: &[String]) -> ExitCode {
    finish(run_new(session, ty, args))
}

fn arguments(session: &mut Session, args: &[String]) -> Result<Vec<Value>, ExitCode> {
    args.iter()
        .enumerate()
        .map(|(i, text)| session.value(&format!("arg{}", i), text))
        .collect()
}

fn run_call(session: &mut Session, function: &str, args: &[String], method: bool) -> Result<(), ExitCode> {
    let callee = session.value("function", function)?;
    let args = arguments(session, args)?;
    let ctx = callee.context().clone();
    match session.checker.eval_function(&callee, &args, method, &ctx) {
        Ok(Some(ret)) => {
            let ty = session.checker.arena_mut().value_type(&ret);
            println!("{}", session.checker.display(ty));
            Ok(())
        }
        Ok(None) => {
            println!("void");
            Ok(())
        }
        Err(e) => Err(session.report(e)),
    }
}

fn run_new(session: &mut Session, ty: &str, args: &[String]) -> Result<(), ExitCode> {
    let proto = session.value("type", ty)?;
    let args = arguments(session, args)?;
    let ctx = proto.context().clone();
    let Some(class) = session.checker.class_of(proto.type_id()) else {
        let error = TypeError::new(
            CheckError::NotConstructable {
                type_name: session.checker.display(proto.type_id()),
            },
            &ctx,
        );
        return Err(session.report(error));
    };
    let class = Value::new(class, &ctx);
    match session.checker.eval_constructor(&class, &args, &ctx) {
        Ok(made) => {
            let ty = session.checker.arena_mut().value_type(&made);
            println!("{}", session.checker.display(ty));
            Ok(())
        }
        Err(e) => Err(session.report(e)),
    }
}

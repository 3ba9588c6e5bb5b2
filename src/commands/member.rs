// src/commands/member.rs

use std::process::ExitCode;

use crate::errors::{CheckError, TypeError};

use super::common::{Session, finish};

/// Print the type of `ty.key`, or of the static member with `is_static`.
pub fn member_type(session: &mut Session, ty: &str, key: &str, is_static: bool) -> ExitCode {
    finish(run(session, ty, key, is_static))
}

fn run(session: &mut Session, ty: &str, key: &str, is_static: bool) -> Result<(), ExitCode> {
    let value = session.value("type", ty)?;
    let ctx = value.context().clone();
    let target = if is_static {
        match session.checker.class_of(value.type_id()) {
            Some(class) => session.checker.arena().value(class, &ctx),
            None => {
                let error = TypeError::new(
                    CheckError::NotConstructable {
                        type_name: session.checker.display(value.type_id()),
                    },
                    &ctx,
                );
                return Err(session.report(error));
            }
        }
    } else {
        value
    };
    match session.checker.get_member(&target, key, &ctx) {
        Ok(member) => {
            let ty = session.checker.arena_mut().value_type(&member);
            println!("{}", session.checker.display(ty));
            Ok(())
        }
        Err(e) => Err(session.report(e)),
    }
}

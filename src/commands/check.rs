// src/commands/check.rs

use std::process::ExitCode;

use super::common::{Session, finish};

/// May a value of `actual` flow where `expected` is required?
pub fn check_types(session: &mut Session, expected: &str, actual: &str) -> ExitCode {
    finish(run(session, expected, actual))
}

fn run(session: &mut Session, expected: &str, actual: &str) -> Result<(), ExitCode> {
    let expected = session.value("expected", expected)?;
    let actual = session.value("actual", actual)?;
    let ctx = actual.context().clone();
    match session.checker.check_value(&expected, &actual, &ctx) {
        Ok(()) => {
            println!("ok");
            Ok(())
        }
        Err(e) => Err(session.report(e)),
    }
}

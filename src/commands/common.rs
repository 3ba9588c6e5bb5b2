// src/commands/common.rs
//! Shared setup for CLI commands.

use std::path::Path;
use std::process::ExitCode;

use miette::NamedSource;

use crate::config::CheckerConfig;
use crate::context::{Context, Span};
use crate::errors::report::with_source;
use crate::errors::{NotationError, TypeError, render_to_stderr};
use crate::sema::{Checker, TypeId, Value, parse_type};

use super::declarations::{DeclarationError, Declarations};

/// A checker plus the argument texts it has parsed, so type errors can be
/// rendered against the argument they point into.
pub struct Session {
    pub checker: Checker,
    sources: Vec<(String, String)>,
}

impl Session {
    /// Build a checker from an optional config file and declarations file.
    /// Failures are rendered before returning.
    pub fn open(config: Option<&Path>, types: Option<&Path>) -> Result<Self, ExitCode> {
        let config = match config {
            Some(path) => CheckerConfig::load(path).map_err(|e| {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            })?,
            None => CheckerConfig::default(),
        };
        let mut session = Self {
            checker: Checker::new(config),
            sources: Vec::new(),
        };
        if let Some(path) = types {
            let declared = Declarations::load(path)
                .and_then(|decls| decls.declare_all(&mut session.checker, &path.display().to_string()));
            if let Err(e) = declared {
                return Err(session.report_declaration(e));
            }
        }
        Ok(session)
    }

    /// Parse one argument; `role` names it in diagnostics.
    pub fn parse(&mut self, role: &str, source: &str) -> Result<TypeId, ExitCode> {
        match parse_type(self.checker.arena_mut(), source) {
            Ok(ty) => {
                self.sources.push((role.to_string(), source.to_string()));
                Ok(ty)
            }
            Err(e) => Err(report_notation(e, role, source)),
        }
    }

    /// A value of the parsed type, attributed to the whole argument.
    pub fn value(&mut self, role: &str, source: &str) -> Result<Value, ExitCode> {
        let ty = self.parse(role, source)?;
        let ctx = Context::new(role, Span::new(0, source.len(), 1, 1));
        Ok(self.checker.arena().value(ty, &ctx))
    }

    /// Render a type error and fail.
    pub fn report(&self, error: TypeError) -> ExitCode {
        let source = error
            .context()
            .path()
            .and_then(|path| self.sources.iter().find(|(role, _)| role == path))
            .map(|(_, text)| text.clone());
        match source {
            Some(text) => {
                let report = with_source(error, "argument", &text);
                render_to_stderr(report.as_ref());
            }
            None => render_to_stderr(&error),
        }
        ExitCode::FAILURE
    }

    fn report_declaration(&self, error: DeclarationError) -> ExitCode {
        match error {
            DeclarationError::Notation { entry, text, source } => {
                eprintln!("error: in declaration of {}", entry);
                report_notation(source, &entry, &text)
            }
            DeclarationError::Type(e) => self.report(e),
            other => {
                eprintln!("error: {}", other);
                ExitCode::FAILURE
            }
        }
    }
}

fn report_notation(error: NotationError, role: &str, source: &str) -> ExitCode {
    let report = miette::Report::new(error).with_source_code(NamedSource::new(role, source.to_string()));
    render_to_stderr(report.as_ref());
    ExitCode::FAILURE
}

/// Collapse a command's result into an exit code.
pub fn finish(result: Result<(), ExitCode>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

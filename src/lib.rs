// src/lib.rs
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod errors;
pub mod sema;

pub use config::CheckerConfig;
pub use context::{Context, Span};
pub use errors::{CheckError, NotationError, TypeError};
pub use sema::{Checker, TypeId, Value};

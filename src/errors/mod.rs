// src/errors/mod.rs
//! Structured error reporting for wtcheck.
//!
//! This module provides error types using miette for fancy diagnostics.

pub mod notation;
pub mod report;
pub mod sema;

pub use notation::NotationError;
pub use report::{render_to_stderr, render_to_string, render_to_writer};
pub use sema::{CheckError, TypeError};

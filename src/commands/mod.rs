// src/commands/mod.rs
pub mod call;
pub mod check;
pub mod common;
pub mod declarations;
pub mod member;
pub mod universal;

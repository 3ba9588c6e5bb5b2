// src/cli/args.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Structural type checks from the command line
///
/// Types are written in compact notation: `Array<Int>`, `Map<String,Int>`,
/// `Promise<void>`, `[Int,String]`, `{a:String}`, `(Int)=>String`,
/// `"canvas"`, `42`, `true`, `any`, or any built-in or declared name.
#[derive(Parser)]
#[command(name = "wtcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Structural type-compatibility checker", long_about = None)]
pub struct Cli {
    /// Checker configuration (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Class and interface declarations to load before checking (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub types: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that a value of ACTUAL may flow where EXPECTED is required
    #[command(visible_alias = "c")]
    Check {
        #[arg(value_name = "EXPECTED")]
        expected: String,
        #[arg(value_name = "ACTUAL")]
        actual: String,
    },
    /// Report whether a type can cross a thread boundary
    #[command(visible_alias = "u")]
    Universal {
        #[arg(value_name = "TYPE")]
        ty: String,

        /// Also accept RPC interfaces
        #[arg(long)]
        rpc: bool,
    },
    /// Look up a member (or a static member with --static)
    #[command(visible_alias = "m")]
    Member {
        #[arg(value_name = "TYPE")]
        ty: String,
        #[arg(value_name = "KEY")]
        key: String,

        /// Look the key up on the type's class value
        #[arg(long = "static")]
        is_static: bool,
    },
    /// Call a function type with the given argument types
    Call {
        #[arg(value_name = "FUNCTION")]
        function: String,
        #[arg(value_name = "ARGS")]
        args: Vec<String>,

        /// Call as a method: statement-like overloads are preferred and
        /// method-like functions produce no value
        #[arg(long)]
        method: bool,
    },
    /// Construct a type through its class value
    New {
        #[arg(value_name = "TYPE")]
        ty: String,
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },
}

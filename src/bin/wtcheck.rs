// src/bin/wtcheck.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use wtcheck::cli::{Cli, Commands};
use wtcheck::commands::call::{call_function, construct};
use wtcheck::commands::check::check_types;
use wtcheck::commands::common::Session;
use wtcheck::commands::member::member_type;
use wtcheck::commands::universal::universal_type;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    // WTCHECK_LOG_STYLE: "compact" (default) or "full" (timestamps, span events)
    if let Ok(filter) = EnvFilter::try_from_env("WTCHECK_LOG") {
        let style = std::env::var("WTCHECK_LOG_STYLE").unwrap_or_default();
        if style == "full" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_timer(NoTimestamp)
                .with_writer(std::io::stderr)
                .init();
        }
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    let mut session = match Session::open(cli.config.as_deref(), cli.types.as_deref()) {
        Ok(session) => session,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Check { expected, actual } => check_types(&mut session, &expected, &actual),
        Commands::Universal { ty, rpc } => universal_type(&mut session, &ty, rpc),
        Commands::Member { ty, key, is_static } => member_type(&mut session, &ty, &key, is_static),
        Commands::Call {
            function,
            args,
            method,
        } => call_function(&mut session, &function, &args, method),
        Commands::New { ty, args } => construct(&mut session, &ty, &args),
    }
}

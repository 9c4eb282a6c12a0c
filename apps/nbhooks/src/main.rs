//! `nb-ensure-clean` entry point.
//! Resolves configuration, collects sources, runs the lint and prints the report.

use clap::Parser;
use nbhooks::cli::Cli;
use nbhooks::config;
use nbhooks::error::{Error, ExitCode};
use nbhooks::lint::{self, LintOptions};
use nbhooks::models::FileStatus;
use nbhooks::output::{self, Verbosity};
use nbhooks::sources;
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NBHOOKS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn fail(err: &Error, quiet: bool, color: bool) -> ! {
    if !quiet {
        if color {
            eprintln!("{} {}", "error:".red().bold(), err);
        } else {
            eprintln!("error: {}", err);
        }
    }
    std::process::exit(err.exit_code().code());
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let eff = match config::resolve_effective(
        &cli.overrides(),
        no_color_env,
        io::stderr().is_terminal(),
    ) {
        Ok(eff) => eff,
        Err(e) => fail(&e, cli.quiet, false),
    };
    let quiet = eff.verbosity == Verbosity::Quiet;
    if let Some(p) = eff.config_path.as_ref() {
        tracing::debug!(config = %p.display(), "loaded configuration");
    }

    let srcs = match sources::collect_sources(&cli.src, &eff.exclude) {
        Ok(s) => s,
        Err(e) => fail(&e, quiet, eff.color),
    };

    let opts = LintOptions {
        policy: &eff.policy,
        write: eff.write,
        color: eff.color,
    };
    let mut stdin = io::stdin().lock();
    let reports = if quiet {
        lint::run_lint(&srcs, &opts, &mut stdin, &mut io::sink())
    } else {
        lint::run_lint(&srcs, &opts, &mut stdin, &mut io::stderr().lock())
    };

    if let Err(e) = output::print_report(&reports, eff.output, eff.verbosity, eff.color) {
        tracing::debug!(error = %e, "report stream closed");
    }

    let code = if reports.iter().any(|r| r.status() == FileStatus::Dirty) {
        ExitCode::Dirty
    } else {
        ExitCode::Clean
    };
    std::process::exit(code.code());
}

//! CLI argument parsing via `clap`.

use crate::config::CliOverrides;
use crate::output::OutputMode;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "nb-ensure-clean",
    version,
    about = "Ensure that Jupyter notebooks are clean",
    long_about = "Ensure that Jupyter notebooks given by SRC are clean, i.e. code cells carry no outputs, \
no execution counts, no disallowed metadata and no active show_answer directive. Dirty notebooks are \
fixed in place.\n\nExit codes: 0 clean, 1 dirty, 2 usage error, 3 invalid path.\n\
Configuration precedence: CLI > nbhooks.toml > defaults.",
    after_help = "Examples:\n  nb-ensure-clean notebooks/\n  nb-ensure-clean --meta '^(collapsed|scrolled)$' a.ipynb b.ipynb\n  cat a.ipynb | nb-ensure-clean -"
)]
/// Top-level CLI options.
pub struct Cli {
    /// Notebook files or directories to check; `-` reads stdin
    #[arg(value_name = "SRC")]
    pub src: Vec<String>,
    #[arg(
        short,
        long,
        help = "Regular expression matching blacklisted metadata keys (renders a notebook dirty)"
    )]
    pub meta: Option<String>,
    #[arg(
        short = 'a',
        long = "allow-meta",
        conflicts_with = "meta",
        help = "Regular expression for allowed metadata keys; repeatable (pin_output is always allowed)"
    )]
    pub allow_meta: Vec<String>,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Do not emit any messages")]
    pub quiet: bool,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Report clean and ignored files too")]
    pub verbose: bool,
    #[arg(long, value_enum, help = "Output mode (default: human)")]
    pub output: Option<OutputMode>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
    pub no_color: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Report only; never write fixes back")]
    pub check: bool,
    #[arg(long, help = "Where config discovery starts (default: current dir)")]
    pub repo_root: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            repo_root: self.repo_root.clone(),
            meta: self.meta.clone(),
            allow_meta: self.allow_meta.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
            output: self.output,
            no_color: self.no_color,
            check: self.check,
        }
    }
}

//! Configuration discovery and effective settings resolution.
//!
//! nbhooks reads `nbhooks.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags into an `Effective` config.
//! Defaults:
//! - `meta` / `allow_meta`: unset (metadata is unrestricted)
//! - `quiet`, `verbose`: false
//! - `output`: `human`
//! - `color`: true (still subject to `NO_COLOR` and terminal detection)
//! - `check`: false (dirty files are rewritten)
//! - `exclude`: empty
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use crate::output::{OutputMode, Verbosity};
use crate::rules::MetadataPolicy;
use crate::sources::Excludes;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["nbhooks.toml", "nbhooks.yaml", "nbhooks.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `nbhooks.toml|yaml`.
pub struct NbhooksConfig {
    /// Deny regex for cell metadata keys.
    pub meta: Option<String>,
    /// Allow regexes for cell metadata keys.
    pub allow_meta: Option<Vec<String>>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub output: Option<OutputMode>,
    pub color: Option<bool>,
    pub check: Option<bool>,
    /// Globs removed from directory expansion.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Flags taken from the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub repo_root: Option<String>,
    pub meta: Option<String>,
    pub allow_meta: Vec<String>,
    pub quiet: bool,
    pub verbose: bool,
    pub output: Option<OutputMode>,
    pub no_color: bool,
    pub check: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the runner.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub policy: MetadataPolicy,
    pub verbosity: Verbosity,
    pub output: OutputMode,
    pub color: bool,
    pub write: bool,
    pub exclude: Excludes,
}

/// Walk upward from `start` to detect the repository root.
///
/// `start` is made absolute first so a relative start such as `.` can reach
/// its ancestors. Stops when an `nbhooks.toml|yaml|yml` or a `.git` entry is
/// found; falls back to the absolute start.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let mut cur = start.as_path();
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `NbhooksConfig` from `root`, if a config file is present.
///
/// A file that exists but does not parse is an error, not a silent default.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, NbhooksConfig)>> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path)?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<NbhooksConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<NbhooksConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(Error::Config { path, message }),
        };
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// `no_color_env` reflects `NO_COLOR`; `is_terminal` whether the report
/// stream is a terminal. Both are passed in so resolution stays pure.
pub fn resolve_effective(
    cli: &CliOverrides,
    no_color_env: bool,
    is_terminal: bool,
) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config_path, cfg) = match load_config(&repo_root)? {
        Some((p, c)) => (Some(p), c),
        None => (None, NbhooksConfig::default()),
    };

    // One metadata mode per run: a CLI mode replaces the config's entirely.
    let policy = if let Some(meta) = cli.meta.as_deref() {
        MetadataPolicy::deny(meta)?
    } else if !cli.allow_meta.is_empty() {
        MetadataPolicy::allow(&cli.allow_meta)?
    } else if let Some(meta) = cfg.meta.as_deref() {
        MetadataPolicy::deny(meta)?
    } else if let Some(allow) = cfg.allow_meta.as_ref() {
        MetadataPolicy::allow(allow)?
    } else {
        MetadataPolicy::Unrestricted
    };

    let quiet = cli.quiet || cfg.quiet.unwrap_or(false);
    let verbose = cli.verbose || cfg.verbose.unwrap_or(false);

    let output = cli.output.or(cfg.output).unwrap_or_default();

    let color = !cli.no_color && cfg.color.unwrap_or(true) && !no_color_env && is_terminal;
    let check = cli.check || cfg.check.unwrap_or(false);

    Ok(Effective {
        config_path,
        policy,
        verbosity: Verbosity::from_flags(quiet, verbose),
        output,
        color,
        write: !check,
        exclude: Excludes::new(&repo_root, &cfg.exclude)?,
        repo_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> CliOverrides {
        CliOverrides {
            repo_root: root.to_str().map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&at(dir.path()), false, true).unwrap();
        assert!(eff.config_path.is_none());
        assert!(matches!(eff.policy, MetadataPolicy::Unrestricted));
        assert_eq!(eff.verbosity, Verbosity::Normal);
        assert_eq!(eff.output, OutputMode::Human);
        assert!(eff.color);
        assert!(eff.write);
        assert!(eff.exclude.is_empty());
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("nbhooks.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
meta = "dummy"
verbose = true
output = "json"
exclude = ["**/.ipynb_checkpoints/**"]
    "#
        )
        .unwrap();
        fs::create_dir(root.join("nested")).unwrap();

        // Discovery walks up from a nested start directory
        let eff = resolve_effective(&at(&root.join("nested")), false, true).unwrap();
        assert_eq!(eff.repo_root, root.canonicalize().unwrap());
        assert!(matches!(eff.policy, MetadataPolicy::Deny(_)));
        assert_eq!(eff.verbosity, Verbosity::Verbose);
        assert_eq!(eff.output, OutputMode::Json);
        assert_eq!(eff.exclude.len(), 1);
    }

    #[test]
    fn test_load_yaml_allow_list() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("nbhooks.yaml"),
            "allow_meta:\n  - tags\n  - slideshow\ncheck: true\ncolor: false\n",
        )
        .unwrap();
        let eff = resolve_effective(&at(root), false, true).unwrap();
        match &eff.policy {
            MetadataPolicy::Allow(res) => assert_eq!(res.len(), 2),
            other => panic!("unexpected policy {:?}", other),
        }
        assert!(!eff.write);
        assert!(!eff.color);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("nbhooks.toml"), "meta = \"dummy\"\nverbose = true\n").unwrap();
        let cli = CliOverrides {
            allow_meta: vec!["tags".into()],
            quiet: true,
            output: Some(OutputMode::Human),
            ..at(root)
        };
        let eff = resolve_effective(&cli, false, true).unwrap();
        assert!(matches!(eff.policy, MetadataPolicy::Allow(_)));
        // quiet from CLI wins over verbose from config
        assert_eq!(eff.verbosity, Verbosity::Quiet);
        assert_eq!(eff.output, OutputMode::Human);
    }

    #[test]
    fn test_color_disabled_by_env_or_pipe() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let cli = at(dir.path());
        assert!(!resolve_effective(&cli, true, true).unwrap().color);
        assert!(!resolve_effective(&cli, false, false).unwrap().color);
        let cli = CliOverrides {
            no_color: true,
            ..at(dir.path())
        };
        assert!(!resolve_effective(&cli, false, true).unwrap().color);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nbhooks.toml"), "meta = [").unwrap();
        let err = resolve_effective(&at(dir.path()), false, true).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bad_regex_in_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nbhooks.toml"), "meta = \"(\"\n").unwrap();
        let err = resolve_effective(&at(dir.path()), false, true).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn test_relative_start_walks_up_to_config() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("nbhooks.toml"), "meta = \"dummy\"\n").unwrap();
        fs::create_dir_all(root.join("a/b")).unwrap();
        // `..` components only resolve once the start is made absolute
        let start = root.join("a/b/..");
        assert_eq!(detect_repo_root(&start), root);
        assert_eq!(detect_repo_root(&root.join("a/b")), root);
    }

    #[test]
    fn test_unknown_output_in_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nbhooks.toml"), "output = \"xml\"\n").unwrap();
        let err = resolve_effective(&at(dir.path()), false, true).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

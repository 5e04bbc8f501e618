use std::path::Path;

use {
    anyhow::{Result, bail},
    clap::Subcommand,
};

use pwvault_config::{
    PwvaultConfig,
    validate::{self, Severity, ValidationResult},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Write a config file populated with defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML.
    Show,
}

/// Returns the process exit status.
pub fn handle_config(action: ConfigAction, path: Option<&Path>) -> Result<u8> {
    match action {
        ConfigAction::Check { verbose } => Ok(check(path, verbose)),
        ConfigAction::Init { force } => init(path, force).map(|()| 0),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&load_effective(path)?)?);
            Ok(0)
        },
    }
}

/// Load the explicit config file, or fall back to discovery and defaults.
pub fn load_effective(path: Option<&Path>) -> Result<PwvaultConfig> {
    match path {
        Some(path) => pwvault_config::load_config(path),
        None => Ok(pwvault_config::discover_and_load()),
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => pwvault_config::find_or_default_config_path(),
    };
    if target.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", target.display());
    }
    pwvault_config::save_config(&PwvaultConfig::default(), &target)?;
    eprintln!("Wrote {}", target.display());
    Ok(())
}

fn check(path: Option<&Path>, verbose: bool) -> u8 {
    let result = validate::validate(path);

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    for line in render(&result, verbose) {
        eprintln!("{line}");
    }

    u8::from(result.has_errors())
}

fn render(result: &ValidationResult, verbose: bool) -> Vec<String> {
    let mut lines: Vec<String> = result
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .map(|d| {
            let (color, label) = match d.severity {
                Severity::Error => (RED, "error"),
                Severity::Warning => (YELLOW, "warning"),
                Severity::Info => (CYAN, "info"),
            };
            if d.path.is_empty() {
                format!("  {BOLD}{color}{label}{RESET} {}", d.message)
            } else {
                format!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message)
            }
        })
        .collect();

    if !lines.is_empty() {
        lines.push(String::new());
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors == 0 && warnings == 0 {
        lines.push("No issues found.".into());
    } else {
        lines.push(format!("{errors} error(s), {warnings} warning(s)"));
    }
    lines
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_hides_info_unless_verbose() {
        let result = validate::validate_toml_str("[generator]\nlength = 16\n");
        let quiet = render(&result, false);
        assert_eq!(quiet.last().unwrap(), "No issues found.");

        let with_warning =
            validate::validate_toml_str("[kdf]\nalgorithm = \"pbkdf2\"\niterations = 10\n");
        let lines = render(&with_warning, false);
        assert!(lines.iter().any(|l| l.contains("warning")));
        assert_eq!(lines.last().unwrap(), "0 error(s), 1 warning(s)");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pwvault.toml");
        init(Some(&path), false).unwrap();
        assert!(init(Some(&path), false).is_err());
        init(Some(&path), true).unwrap();
        assert_eq!(
            pwvault_config::load_config(&path).unwrap(),
            PwvaultConfig::default()
        );
    }

    #[test]
    fn type_errors_render_as_diagnostics() {
        let result = validate::validate_toml_str("[generator]\nlength = \"long\"\n");
        let lines = render(&result, false);
        assert!(lines.iter().any(|l| l.contains("type error")));
        assert_eq!(lines.last().unwrap(), "1 error(s), 0 warning(s)");
    }

    #[test]
    fn explicit_missing_config_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_effective(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

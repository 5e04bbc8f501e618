//! Configuration validation.
//!
//! Detects unknown or misspelled fields and settings that would make the
//! generator or key derivation fail at runtime.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use pwvault_core::{KdfParams, generator::effective_charset};

use crate::{loader, schema::PwvaultConfig};

/// PBKDF2 round counts below this are reported as weak.
const MIN_RECOMMENDED_PBKDF2_ITERATIONS: u32 = 1_000;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "generator", "kdf"
    pub category: &'static str,
    /// Dotted path, e.g. "kdf.iterations"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    let generator = [
        "length",
        "include_uppercase",
        "includeUppercase",
        "include_lowercase",
        "includeLowercase",
        "include_numbers",
        "includeNumbers",
        "include_symbols",
        "includeSymbols",
        "exclude_similar",
        "excludeSimilar",
        "min_length",
        "max_length",
    ];
    let kdf = ["algorithm", "iterations", "m_cost", "t_cost", "p_cost"];

    let leaves = |keys: &[&'static str]| Struct(keys.iter().map(|k| (*k, Leaf)).collect());

    Struct(HashMap::from([
        ("generator", leaves(&generator)),
        ("kdf", leaves(&kdf)),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        let mut result = validate_value(&serde_json::Value::Object(Default::default()));
        result.diagnostics.insert(
            0,
            Diagnostic::new(
                Severity::Info,
                "syntax",
                "",
                "no config file found; using defaults",
            ),
        );
        return result;
    };

    let mut result = match loader::load_config_value(&actual_path) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                e.to_string(),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate a TOML string without touching the file system.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let value = toml::from_str::<toml::Value>(toml_str)
        .map_err(|e| format!("TOML syntax error: {e}"))
        .and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string()));

    match value {
        Ok(value) => validate_value(&value),
        Err(message) => ValidationResult {
            diagnostics: vec![Diagnostic::new(Severity::Error, "syntax", "", message)],
            config_path: None,
        },
    }
}

fn validate_value(value: &serde_json::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    check_unknown_fields(value, &build_schema_map(), "", &mut diagnostics);

    match serde_json::from_value::<PwvaultConfig>(value.clone()) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (serde_json::Value::Object(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };

    let known: Vec<&str> = fields.keys().copied().collect();
    for (key, child) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match fields.get(key.as_str()) {
            Some(child_schema) => check_unknown_fields(child, child_schema, &path, diagnostics),
            None => {
                let message = match suggest(key, &known, 3) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_string(),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    path,
                    message,
                ));
            },
        }
    }
}

fn check_semantics(config: &PwvaultConfig, diagnostics: &mut Vec<Diagnostic>) {
    let generator = &config.generator;

    if generator.min_length == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "generator",
            "generator.min_length",
            "must be at least 1",
        ));
    }
    if generator.min_length > generator.max_length {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "generator",
            "generator.min_length",
            format!(
                "{} is greater than max_length {}",
                generator.min_length, generator.max_length
            ),
        ));
    } else if let Err(e) = generator
        .policy
        .validate_length(generator.min_length, generator.max_length)
    {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "generator",
            "generator.length",
            e.to_string(),
        ));
    }
    if effective_charset(&generator.policy).is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "generator",
            "generator",
            "no character class is enabled",
        ));
    }

    match config.kdf {
        KdfParams::Pbkdf2 { iterations: 0 } => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "kdf",
            "kdf.iterations",
            "must be at least 1",
        )),
        KdfParams::Pbkdf2 { iterations } if iterations < MIN_RECOMMENDED_PBKDF2_ITERATIONS => {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "kdf",
                "kdf.iterations",
                format!(
                    "{iterations} rounds is weak; use at least {MIN_RECOMMENDED_PBKDF2_ITERATIONS}"
                ),
            ));
        },
        KdfParams::Argon2id {
            m_cost,
            t_cost,
            p_cost,
        } => {
            if t_cost == 0 || p_cost == 0 {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "kdf",
                    "kdf",
                    "t_cost and p_cost must be at least 1",
                ));
            }
            if u64::from(m_cost) < 8 * u64::from(p_cost) {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "kdf",
                    "kdf.m_cost",
                    "must be at least 8 KiB per lane",
                ));
            }
        },
        KdfParams::Pbkdf2 { .. } => {},
    }
}

//! Configuration loading and parsing for cpplinter
//!
//! Provides functionality to load and parse `cpplinter.toml` configuration
//! files.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::rules::Severity;
use crate::rules::function_length::DEFAULT_MAX_LINES;
use crate::rules::parameter_count::DEFAULT_MAX_PARAMS;
use crate::source::DEFAULT_CAPACITY;

pub const CONFIG_FILENAME: &str = "cpplinter.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["exclude", "cache", "parser", "rules"];
const KNOWN_RULES_KEYS: &[&str] = &[
    "disabled",
    "severity",
    "params",
    "function_length",
    "magic_numbers",
];
const KNOWN_SECTION_KEYS: &[(&str, &[&str])] = &[
    ("cache", &["capacity"]),
    ("parser", &["strict_syntax"]),
];
const KNOWN_RULE_SECTION_KEYS: &[(&str, &[&str])] = &[
    ("params", &["max"]),
    ("function_length", &["max_lines"]),
    ("magic_numbers", &["ignore"]),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// File or directory names pruned during discovery.
    pub exclude: Vec<String>,
    pub cache: CacheConfig,
    pub parser: ParserConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Skip every file with a syntax error instead of only the unrecoverable
    /// ones.
    pub strict_syntax: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids or names that never run.
    pub disabled: Vec<String>,
    #[serde(default)]
    pub severity: HashMap<String, SeverityValue>,
    pub params: ParamsConfig,
    pub function_length: FunctionLengthConfig,
    pub magic_numbers: MagicNumbersConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParamsConfig {
    /// Zero or negative disables the check.
    pub max: i64,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_PARAMS as i64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FunctionLengthConfig {
    /// Zero or negative disables the check.
    pub max_lines: i64,
}

impl Default for FunctionLengthConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES as i64,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MagicNumbersConfig {
    /// Accepted in addition to the built-in powers of two.
    pub ignore: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityValue {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<SeverityValue> for Severity {
    fn from(value: SeverityValue) -> Self {
        match value {
            SeverityValue::Error => Severity::Error,
            SeverityValue::Warning => Severity::Warning,
            SeverityValue::Info => Severity::Info,
            SeverityValue::Hint => Severity::Hint,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    for (section, known) in KNOWN_SECTION_KEYS {
        if let Some(toml::Value::Table(values)) = table.get(*section) {
            warn_unknown_in(values, section, known, &mut warnings);
        }
    }

    if let Some(toml::Value::Table(rules)) = table.get("rules") {
        let known_rules: HashSet<&str> = KNOWN_RULES_KEYS.iter().copied().collect();
        for key in rules.keys() {
            if !known_rules.contains(key.as_str()) {
                warnings.push(format!("Unknown config option in [rules]: '{}'", key));
            }
        }

        for (section, known) in KNOWN_RULE_SECTION_KEYS {
            if let Some(toml::Value::Table(values)) = rules.get(*section) {
                let section = format!("rules.{section}");
                warn_unknown_in(values, &section, known, &mut warnings);
            }
        }
    }

    warnings
}

fn warn_unknown_in(table: &toml::Table, section: &str, known: &[&str], warnings: &mut Vec<String>) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            warnings.push(format!("Unknown config option in [{}]: '{}'", section, key));
        }
    }
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

/// A config file that exists but cannot be loaded falls back to the defaults
/// and says so in the warnings.
pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_else(|err| ConfigResult {
            config: Config::default(),
            warnings: vec![format!("{err}; using default configuration")],
        }),
        None => ConfigResult::default(),
    }
}

/// Converts a configured limit to the rule form, where 0 means no limit.
pub fn limit(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

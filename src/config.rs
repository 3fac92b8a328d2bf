//! Optional file filtering configuration.
//!
//! Categories and transliteration are fixed; what can be configured is which
//! files a run leaves alone. Rules are read from a TOML file given on the
//! command line and are never discovered implicitly. Without a file, every
//! file is organized.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["**/*.part", "keep/**"]
//! extensions = ["tmp"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Glob patterns are matched against the path relative to the folder being
//! organized; regexes against the bare file name.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or compiling filter rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(#[from] toml::de::Error),
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegexPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filter rules as written in the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

/// Root-level filter rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether hidden files (starting with ".") are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

fn default_enable_hidden_files() -> bool {
    true
}

/// Rules for leaving files out of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns over the relative path (e.g. "keep/**").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot, case-insensitive (e.g. "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes over the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for forcing files into a run despite the exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FilterConfig {
    /// Loads filter rules, falling back to "organize everything".
    ///
    /// # Errors
    ///
    /// Returns an error if `config_path` is given but cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Compiles the rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob pattern is invalid.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Returns true if the file at `relative_path` should be organized.
    ///
    /// Checks run in order, first decision wins:
    /// 1. Include patterns
    /// 2. Hidden file switch
    /// 3. Exact file name
    /// 4. Extension
    /// 5. Glob patterns
    /// 6. Regexes
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

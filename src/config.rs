//! Configuration for narrate runs.
//!
//! An optional `narrate.yaml` tunes which files a scan picks up and where the
//! outputs go. Every field has a default, so an empty file is valid.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names searched for in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["narrate.yaml", ".narrate.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Source file extensions to scan, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Files and directories whose name starts with this are skipped.
    #[serde(default = "default_private_prefix")]
    pub private_prefix: String,
    /// Glob patterns for paths to exclude (e.g., "**/migrations/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Base name of the dictionary (`.json`) and index (`.txt`) files.
    #[serde(default = "default_output")]
    pub output: String,
    /// Granulate files in parallel (default: true).
    #[serde(default)]
    pub parallel: Option<bool>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Settings for `narrate render`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_output")]
    pub output: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: default_render_output(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            private_prefix: default_private_prefix(),
            excluded_paths: Vec::new(),
            output: default_output(),
            parallel: None,
            render: RenderConfig::default(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_private_prefix() -> String {
    "_".to_string()
}

fn default_output() -> String {
    "expo".to_string()
}

fn default_render_output() -> String {
    "narration.md".to_string()
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the first config file found in the
    /// current directory, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };

        let config = match path {
            Some(p) => {
                if std::env::var("NARRATE_DEBUG").is_ok() {
                    eprintln!("[debug] loading config from {}", p.display());
                }
                Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", p.display(), e))?
            }
            None => Self::default(),
        };

        validate(&config)?;
        Ok(config)
    }

    /// Returns whether to granulate in parallel (defaults to true).
    pub fn is_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Whether a file extension is one we scan.
    pub fn wants_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.') == extension)
    }

    /// Whether a file or directory name is private.
    pub fn is_private(&self, name: &str) -> bool {
        !self.private_prefix.is_empty() && name.starts_with(&self.private_prefix)
    }

    /// Compile the exclusion globs.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// Find a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.extensions.is_empty() {
        anyhow::bail!("extensions must name at least one file extension");
    }

    if config.output.trim().is_empty() {
        anyhow::bail!("output base name must not be empty");
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

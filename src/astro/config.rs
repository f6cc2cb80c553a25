//! Configuration loader for the astro command-line driver.
//!
//! `defaults/astro.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. User files and command-line flags are layered
//! on top of those defaults via [`Loader`] before deserializing into
//! [`AstroConfig`]. The lexer and parser themselves take no configuration.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/astro.default.toml");

/// Top-level configuration consumed by the driver.
#[derive(Debug, Clone, Deserialize)]
pub struct AstroConfig {
    pub output: OutputConfig,
}

/// How tokens and trees are printed.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub include_spans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
    /// Box-drawing tree of the AST; tokens fall back to `text`.
    Tree,
    /// One token per line; trees fall back to `tree`.
    Text,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Tree => "tree",
            OutputFormat::Text => "text",
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for command-line flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<AstroConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<AstroConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.include_spans);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.format", "tree")
            .expect("override to apply")
            .set_override("output.include_spans", false)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Tree);
        assert!(!config.output.include_spans);
    }

    #[test]
    fn layers_user_files_over_defaults() {
        let path = std::env::temp_dir().join(format!("astro-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("temp file");
        writeln!(file, "[output]\nformat = \"yaml\"").expect("write config");

        let config = Loader::new().with_file(&path).build().expect("config to build");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert!(config.output.include_spans);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/astro.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_unknown_formats() {
        let result = Loader::new()
            .set_override("output.format", "xml")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}

//! Command-line interface for astro
//! This binary lexes or parses a single Astro source file and prints the result.
//!
//! Usage:
//!   astro tokens `<path>` [--format `<format>`]  - Print the token stream
//!   astro ast `<path>` [--format `<format>`]     - Print the syntax tree
//!
//! Output settings come from the built-in defaults, then `--config <file>`,
//! then `--format`.

use astro::astro::config::{AstroConfig, Loader, OutputConfig, OutputFormat};
use astro::astro::formats::{to_token_lines, to_treeviz_str};
use astro::astro::lexing::lex;
use astro::astro::parsing::{format_source_context, parse, FrontendError};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "astro", version, about = "Inspect how Astro source is lexed and parsed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (overrides the configuration)
    #[arg(short, long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Configuration file layered over the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lex a file and print its tokens
    Tokens {
        /// Path to the Astro source file
        path: PathBuf,
    },
    /// Parse a file and print its syntax tree
    Ast {
        /// Path to the Astro source file
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(&cli).and_then(|config| run(&cli.command, &config));
    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "astro=info",
        1 => "astro=debug",
        _ => "astro=trace",
    }
}

fn load_config(cli: &Cli) -> Result<AstroConfig, String> {
    let mut loader = Loader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    if let Some(format) = cli.format {
        loader = loader
            .set_override("output.format", format.name())
            .map_err(|e| e.to_string())?;
    }
    let config = loader.build().map_err(|e| e.to_string())?;
    debug!(
        format = config.output.format.name(),
        spans = config.output.include_spans,
        "loaded configuration"
    );
    Ok(config)
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn report(source: &str, err: FrontendError) -> String {
    format!(
        "{}\n\n{}",
        err,
        format_source_context(source, err.position().line)
    )
}

fn run(command: &Commands, config: &AstroConfig) -> Result<String, String> {
    match command {
        Commands::Tokens { path } => {
            let source = read_source(path)?;
            let tokens = lex(&source).map_err(|e| report(&source, e.into()))?;
            match config.output.format {
                OutputFormat::Tree | OutputFormat::Text => Ok(to_token_lines(&tokens)),
                _ => serialize(&tokens, &config.output),
            }
        }
        Commands::Ast { path } => {
            let source = read_source(path)?;
            let tokens = lex(&source).map_err(|e| report(&source, e.into()))?;
            let program = parse(&tokens).map_err(|e| report(&source, e.into()))?;
            match config.output.format {
                OutputFormat::Tree | OutputFormat::Text => Ok(to_treeviz_str(&program)),
                _ => serialize(&program, &config.output),
            }
        }
    }
}

fn serialize<T: Serialize>(value: &T, output: &OutputConfig) -> Result<String, String> {
    let mut value = serde_json::to_value(value).map_err(|e| e.to_string())?;
    if !output.include_spans {
        strip_ranges(&mut value);
    }
    match output.format {
        OutputFormat::Yaml => serde_yaml::to_string(&value).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(&value)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
    }
}

/// Remove every `range` field, recursively.
fn strip_ranges(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("range");
            for child in map.values_mut() {
                strip_ranges(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                strip_ranges(child);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "astro=info");
        assert_eq!(directive_for_verbosity(1), "astro=debug");
        assert_eq!(directive_for_verbosity(2), "astro=trace");
    }

    #[test]
    fn strips_nested_ranges() {
        let mut value = json!({
            "kind": {"identifier": {"name": "x"}},
            "range": {"start": 0},
            "children": [{"range": 1, "text": "y"}]
        });
        strip_ranges(&mut value);
        assert_eq!(
            value,
            json!({
                "kind": {"identifier": {"name": "x"}},
                "children": [{"text": "y"}]
            })
        );
    }

    #[test]
    fn serializes_tokens_without_spans() {
        let tokens = lex("x").unwrap();
        let output = OutputConfig {
            format: OutputFormat::Json,
            include_spans: false,
        };
        let text = serialize(&tokens, &output).unwrap();
        assert!(!text.contains("range"));
        assert!(text.contains("\"identifier\""));
    }
}

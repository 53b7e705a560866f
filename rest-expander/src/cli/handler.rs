//! Runs one expansion for the command line

use anyhow::{Context, Result};
use colored::*;
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::Cli;
use rest_expander::{Diagnostic, Engine, EngineConfig, GenericValue, Hypermedia};

const CONFIG_ENV: &str = "REST_EXPANDER_CONFIG";

pub async fn run(args: Cli) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config_path = resolve_config_path(
        args.config.clone(),
        std::env::var(CONFIG_ENV).ok(),
        dirs::config_dir(),
    );
    let config = load_config(config_path.as_deref())?;

    let engine = Engine::new(config).context("Failed to create expansion engine")?;
    print_diagnostics(engine.config_warnings());

    let document = read_document(args.input.as_deref())?;

    let (output, diagnostics) = match &document {
        serde_json::Value::Array(items) => {
            let roots: Vec<Hypermedia> = items.iter().map(Hypermedia).collect();
            let batch = engine
                .expand_all_with_report(&roots, &args.expand, &args.fields)
                .await;
            let records = batch.records.into_iter().map(GenericValue::Map).collect();
            (GenericValue::List(records), batch.diagnostics)
        }
        other => {
            let expansion = engine
                .expand_with_report(&Hypermedia(other), &args.expand, &args.fields)
                .await;
            (GenericValue::Map(expansion.record), expansion.diagnostics)
        }
    };

    print_diagnostics(&diagnostics);

    let json = output.to_json();
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .context("Failed to render output")?;
    println!("{}", rendered);

    let stats = engine.cache_stats();
    debug!(
        "Fetched {} resource(s), {} cache hit(s)",
        stats.fetches, stats.hits
    );

    Ok(())
}

/// `--config`, then the environment, then the user config directory
fn resolve_config_path(
    flag: Option<PathBuf>,
    env: Option<String>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path);
    }

    if let Some(path) = env.filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }

    config_dir
        .map(|dir| dir.join("rest-expander").join("config.toml"))
        .filter(|path| path.exists())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            EngineConfig::load(path)
        }
        None => {
            debug!("No configuration file, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

fn read_document(input: Option<&Path>) -> Result<serde_json::Value> {
    let source = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    parse_document(&source)
}

fn parse_document(source: &str) -> Result<serde_json::Value> {
    if source.trim().is_empty() {
        anyhow::bail!("Input document is empty");
    }

    let document: serde_json::Value =
        serde_json::from_str(source).context("Input is not valid JSON")?;

    match &document {
        serde_json::Value::Object(_) => Ok(document),
        serde_json::Value::Array(items) if items.iter().all(|i| i.is_object()) => Ok(document),
        _ => anyhow::bail!("Input must be a JSON object or an array of objects"),
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let label = match diagnostic {
            Diagnostic::Misconfiguration(_) => "config".yellow().bold(),
            Diagnostic::FilterSyntax { .. } => "filter".yellow().bold(),
            Diagnostic::Unresolved { .. } => "unresolved".red().bold(),
            Diagnostic::DepthLimit { .. } => "depth".cyan().bold(),
            Diagnostic::MissingUriBase { .. } => "foreign key".yellow().bold(),
        };
        eprintln!("{} {}", label, diagnostic.to_string().dimmed());
    }
}

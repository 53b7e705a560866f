//! Command line arguments

mod handler;

pub use handler::run;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rest-expander")]
#[command(version)]
#[command(about = "Expand hypermedia links in a JSON document and project its fields")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON document to expand (reads stdin if not provided)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Links to follow, e.g. `group,addresses(city)`; `*` follows everything
    #[arg(short, long, default_value = "")]
    pub expand: String,

    /// Fields to keep, e.g. `name,group(name)`; empty keeps everything
    #[arg(short, long, default_value = "")]
    pub fields: String,

    /// Engine configuration file (TOML); falls back to $REST_EXPANDER_CONFIG
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(short, long)]
    pub pretty: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    pub no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

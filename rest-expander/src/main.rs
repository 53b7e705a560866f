//! rest-expander: expand hypermedia links in a JSON document
//!
//! ```bash
//! # Inline the `group` link and keep two fields
//! rest-expander --input user.json --expand group --fields 'name,group(name)'
//!
//! # Follow every link, reading from stdin
//! curl -s http://localhost:9000/users/1 | rest-expander --expand '*' --pretty
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();
    init_logging(args.verbose);

    cli::run(args).await
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

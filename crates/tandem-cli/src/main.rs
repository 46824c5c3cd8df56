use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use tandem::catalog::{self, DEFAULT_MODEL, MODEL_LIST};

mod frontend;
mod prompt;
mod session;

#[derive(Parser)]
#[command(author, version, about = "Terminal chat for AI-assisted coding", long_about = None)]
struct Cli {
    /// Model to use for completions
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Session name; a random one is generated when omitted
    #[arg(short, long)]
    session: Option<String>,

    /// Resume the named session if a recording exists
    #[arg(long)]
    resume: bool,

    /// List known models and exit
    #[arg(long)]
    list_models: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_models {
        for spec in MODEL_LIST {
            println!(
                "{:<30} {} {}",
                spec.name,
                spec.label,
                style(format!("({})", spec.provider)).dim()
            );
        }
        return Ok(());
    }

    if catalog::lookup(&cli.model).is_none() {
        bail!(
            "unknown model '{}'; run with --list-models to see the catalog",
            cli.model
        );
    }

    let session = session::build_session(cli.session, cli.resume, cli.model)?;
    session.start().await
}

//! docreview CLI — oracle-driven document review tool.
//!
//! Reviews PRD/TRD/test-case documents against an oracle-planned
//! checklist and writes the consolidated findings as Markdown.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

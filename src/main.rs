use anyhow::Result;
use clap::Parser;
use emcp::cli::{Cli, execute};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

use anyhow::Result;
use otto::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}

//! The `formpipe` command-line entry point.

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = formpipe::cli::command().get_matches();
    let settings = formpipe::cli::load_settings(&matches).context("loading settings")?;
    formpipe::core::logging::setup_logging(&settings);

    formpipe::cli::execute(&matches, settings).await?;
    Ok(())
}

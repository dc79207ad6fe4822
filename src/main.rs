use bildhatch::cli::{run, Cli};
use bildhatch::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    tracing::debug!(
        "bildhatch {} ({} build)",
        bildhatch::VERSION,
        bildhatch::BUILD_PROFILE
    );
    run(&cli)?;

    Ok(())
}

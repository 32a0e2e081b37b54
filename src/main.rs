//! Layoutsmith
//!
//! Command-line entry point: loads settings, installs logging and runs
//! the requested command.

use layoutsmith_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let settings = cli.load_settings()?;

    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = layoutsmith_cli::VERSION, "starting layoutsmith");
    layoutsmith_cli::run(cli, &settings)
}

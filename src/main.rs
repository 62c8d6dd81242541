use clap::Parser;
use layerspeed::{init_logging, run, Cli, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.json)?;
    tracing::debug!("layerspeed {} (built {})", VERSION, BUILD_DATE);

    run(&cli)
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Commands;

mod cli;
mod decode;
mod serial;
mod sim;
mod simulate;
mod util;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Decode(args) => decode::action(args)?,
        Commands::Simulate(args) => simulate::action(args)?,
        Commands::Send(args) => serial::action(args)?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

mod cli;
mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::CliArgs::parse();
    platform::run(args)
}

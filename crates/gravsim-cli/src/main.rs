//! gravsim command line entry point

use anyhow::Result;
use clap::Parser;

mod cli;
mod logging;
mod report;


fn main() -> Result<()> {
    logging::init()?;

    let args = cli::Args::parse();
    cli::execute(&args)
}

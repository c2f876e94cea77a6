use anyhow::Result;
use clap::Parser;
use tracing::error;

use visitstats::{report, utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    match report::run(&args) {
        Ok(result) => report::print_report(&result, &args),
        Err(e) => {
            error!(error = %e, "Query failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

use salesrs_core::cmd::cli::Cli;
use salesrs_core::cmd::config::Config;

use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.log_level()).format_timestamp(None).init();

    let cfg: Config = cli.into_config();
    match cfg.run() {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        },
    }
}

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::cmd::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "salesrs",
    about = "Fit Sales against TV, Radio and Newspaper spend on the advertising dataset",
    version
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// The analysis itself is fixed; flags only change how much is logged.
    pub fn into_config(self) -> Config {
        Config::default()
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_is_default_config() {
        let cli = Cli::try_parse_from(["salesrs"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Warn);
        assert_eq!(cli.into_config(), Config::default());
    }

    #[test]
    fn test_verbosity_levels() {
        let level = |args: &[&str]| Cli::try_parse_from(args).unwrap().log_level();
        assert_eq!(level(&["salesrs", "-v"]), LevelFilter::Info);
        assert_eq!(level(&["salesrs", "-vv"]), LevelFilter::Debug);
        assert_eq!(level(&["salesrs", "-vvvv"]), LevelFilter::Trace);
        assert_eq!(level(&["salesrs", "--quiet"]), LevelFilter::Error);
    }

    #[test]
    fn test_rejects_unknown_and_conflicting_flags() {
        assert!(Cli::try_parse_from(["salesrs", "--input", "x.csv"]).is_err());
        assert!(Cli::try_parse_from(["salesrs", "-q", "-v"]).is_err());
    }
}

//! ar-measure command-line entry point
//!
//! Usage:
//!   ar-measure distance --from 0,0,0 --to 3,4,0
//!   ar-measure measure --from 0,0,0 --to 3,4,0 --image scene.png --send 1

use ar_measure::cli::{self, Cli};
use ar_measure::config::LoggingConfig;
use ar_measure::logging;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // The config file's level is applied once it has been loaded.
    let initial_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| LoggingConfig::default().level);
    let log = logging::init(&initial_level);

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if cli.log_level.is_none() {
        log.set_level(&config.logging.level);
    }

    if let Err(e) = cli::run(cli, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

use std::process::exit;

use clap::Parser;
use log::info;

use notas::{App, Cli, Config, Session};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    let mut config = match Config::load(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    if let Some(spool_dir) = cli.spool_dir {
        config.spool_dir = spool_dir;
    }

    let mut app = App::new(Session::new(config));
    if let Err(e) = app.run().await {
        eprintln!("Error: {}", e);
        exit(1);
    }

    info!("Application shutting down");
}

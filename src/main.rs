mod args;
mod selector;

use clap::Parser;
use env_logger::Env;
use log::{debug, warn};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
    debug!("main: args: {:?}", args);

    if let Err(e) = selector::run_session(&args) {
        warn!("main: error occurred {:?}", e);
        eprintln!("An error occurred: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("Caused by: {}", source);
        }
        std::process::exit(1);
    }
}

mod arrange;
mod cli;
mod commands;
mod env;
mod error;
mod host;
mod layout;
mod output;
mod settings;
mod units;

use clap::Parser;
use error::ErrorFormatter;

fn main() {
    let cli = cli::Cli::parse();
    let verbose = cli.verbose;
    init_logger(verbose);

    if let Err(err) = commands::dispatch(cli) {
        let formatter = ErrorFormatter::new(verbose);
        eprintln!("{}", formatter.format(&err.into_rich()));
        std::process::exit(1);
    }
}

/// `RUST_LOG` が無ければ `--verbose` で debug、通常は warn
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

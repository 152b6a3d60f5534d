// Entrypoint for the cron helper.
// - Keeps `main` small: parse flags, set up logging and hand off to `cli::run`.
// - Fatal errors are printed with their full cause chain and mapped to an
//   exit code by kind.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use rto_cronhelper::cli::{self, Cli};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli::run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.kind().exit_code();
            eprintln!("Error: {:?}", anyhow::Error::new(err));
            ExitCode::from(code)
        }
    }
}

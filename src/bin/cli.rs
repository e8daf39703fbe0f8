// src/bin/cli.rs
use std::process::ExitCode;

use color_eyre::eyre::{eyre, WrapErr};
use lf_scrape::cli::{self, Command};

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            eprintln!("{}", cli::HELP);
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(eyre!("{e}")).wrap_err("Invalid arguments (see --help)"),
    };

    lf_scrape::log::init(args.options.verbose, args.options.log_file.as_deref())
        .wrap_err("Could not set up logging")?;

    Ok(ExitCode::from(cli::run(&args)))
}

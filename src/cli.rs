// src/cli.rs
use std::{path::PathBuf, time::Duration};

use crate::config::options::{RunOptions, Source};
use crate::log::timestamp;
use crate::progress::{ConsoleProgress, Progress};
use crate::runner::{self, RunSummary};
use crate::session::{Credentials, HttpClient};
use crate::store::Store;
use crate::RunError;

pub const HELP: &str = include_str!("cli_help.txt");

pub struct Args {
    pub team_id: String,
    pub password: String,
    pub options: RunOptions,
}

pub enum Command {
    Run(Args),
    Help,
}

pub fn parse_args<I>(args: I) -> Result<Command, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = RunOptions::default();
    let mut positional: Vec<String> = Vec::new();
    let mut table_url: Option<String> = None;
    let mut want_table = false;

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "-o" | "--out" => opts.store.out_path = PathBuf::from(args.next().ok_or("Missing output path")?),
            "--source" => {
                let v = args.next().ok_or("Missing value for --source")?;
                want_table = match v.to_ascii_lowercase().as_str() {
                    "plots" => false,
                    "table" => true,
                    other => return Err(format!("Unknown source: {}", other).into()),
                };}
            "--table-url" => table_url = Some(args.next().ok_or("Missing value for --table-url")?),
            "--base-url" => opts.net.base_url = args.next().ok_or("Missing value for --base-url")?,
            "--login-url" => opts.net.login_url = args.next().ok_or("Missing value for --login-url")?,
            "--timeout" => {
                let v: u64 = args.next().ok_or("Missing value for --timeout")?.parse()?;
                if v == 0 { return Err("Timeout must be at least 1 second".into()); }
                opts.net.timeout = Duration::from_secs(v);}
            "--log-file" => opts.log_file = Some(PathBuf::from(args.next().ok_or("Missing log file path")?)),
            "--dry-run" => opts.dry_run = true,
            "-v" | "--verbose" => opts.verbose = true,
            "-h" | "--help" => return Ok(Command::Help),
            "--" => positional.extend(args.by_ref()),
            s if s.starts_with('-') && s.len() > 1 => return Err(format!("Unknown arg: {}", a).into()),
            _ => positional.push(a.clone()),
        }
    }

    if want_table {
        let url = table_url.ok_or("--source table needs --table-url")?;
        opts.source = Source::Table { url };
    } else if table_url.is_some() {
        return Err("--table-url only applies to --source table".into());
    }

    let mut positional = positional.into_iter();
    let (Some(team_id), Some(password)) = (positional.next(), positional.next()) else {
        return Err("Expected <team_id> <password>".into());
    };
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra).into());
    }

    Ok(Command::Run(Args { team_id, password, options: opts }))
}

/// Run the pipeline against the live site and report it. Returns the process exit status.
pub fn run(args: &Args) -> u8 {
    let opts = &args.options;

    let creds = match Credentials::new(args.team_id.as_str(), args.password.as_str()) {
        Ok(c) => c,
        Err(e) => {
            let err = RunError { stage: crate::Stage::Authenticated, source: e };
            report_failure(&err, opts);
            return err.exit_code();
        }
    };

    let client = HttpClient::new(opts.net.clone(), opts.source.clone());
    let store = Store::new(&opts.store);

    let mut console = ConsoleProgress;
    let progress: Option<&mut dyn Progress> = if opts.verbose { Some(&mut console) } else { None };

    match runner::run(&client, &creds, &store, opts.dry_run, progress) {
        Ok(summary) => {
            report_success(&summary, &store, opts);
            0
        }
        Err(err) => {
            report_failure(&err, opts);
            err.exit_code()
        }
    }
}

/// The one line per invocation the scheduler's mail/log keeps.
pub fn success_line(summary: &RunSummary, path: &str, dry_run: bool) -> String {
    format!(
        "{} ok{} appended={} updated={} rows={} last_day={} file={}",
        timestamp(),
        if dry_run { " (dry run)" } else { "" },
        summary.appended,
        summary.updated,
        summary.total,
        summary.last_day,
        path,
    )
}

pub fn failure_line(err: &RunError) -> String {
    format!("{} FAILED stage={}: {}", timestamp(), err.stage, err.source)
}

/// The summary line always goes to the console. It is also logged only when
/// the log goes to a file; otherwise both would land on the terminal.
fn log_summary(opts: &RunOptions) -> bool {
    opts.log_file.is_some()
}

fn report_success(summary: &RunSummary, store: &Store, opts: &RunOptions) {
    let line = success_line(summary, &store.path().display().to_string(), opts.dry_run);
    if log_summary(opts) {
        logf!("{line}");
    }
    println!("{line}");
}

fn report_failure(err: &RunError, opts: &RunOptions) {
    let line = failure_line(err);
    if log_summary(opts) {
        loge!("{line}");
    }
    eprintln!("{line}");
}

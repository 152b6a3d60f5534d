// Command-line surface and the entry dispatcher: parse flags, resolve the
// configuration, then hand exactly one operation to the reporting client.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::api::{HttpTransport, Jitter, ReportingClient, Transport};
use crate::config::{default_config_path, init_config_file, ConfigFile};
use crate::error::{Error, Result};

/// Report return-to-office check-ins and monthly attendance to the RTO
/// dashboard. Meant to be run from cron.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "cronhelper", version)]
pub struct Cli {
    /// Action to perform (checkin, stats or init)
    #[arg(long, default_value = "checkin")]
    pub action: String,

    /// Use the configuration file
    #[arg(long)]
    pub config: bool,

    /// Location of the configuration file [default: rtoconfig.json next to the executable]
    #[arg(long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// API endpoint in the https://rtoapi.example.com/ format
    #[arg(long, env = "RTO_API_URL", value_name = "URL")]
    pub api: Option<String>,

    /// Your dashboard id
    #[arg(long, env = "RTO_DASHBOARD_ID", value_name = "ID")]
    pub id: Option<String>,

    /// Skip the random sleep before checking in
    #[arg(long = "nosleep")]
    pub no_sleep: bool,
}

impl Cli {
    fn config_file_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    fn flag_values(&self) -> ConfigFile {
        ConfigFile {
            api_url: self.api.clone(),
            dashboard_id: self.id.clone(),
        }
    }

    fn jitter(&self) -> Jitter {
        if self.no_sleep {
            Jitter::Disabled
        } else {
            Jitter::Random
        }
    }
}

/// A reporting-client operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Checkin,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    Report(Operation),
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "checkin" => Ok(Action::Report(Operation::Checkin)),
            "stats" => Ok(Action::Report(Operation::Stats)),
            "init" => Ok(Action::Init),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Init => "init",
            Action::Report(Operation::Checkin) => "checkin",
            Action::Report(Operation::Stats) => "stats",
        };
        f.write_str(name)
    }
}

/// Run the action selected on the command line against the real network.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    run_with(cli, HttpTransport::new, Local::now().date_naive(), out)
}

/// Same as `run`, with the transport constructor and the current date
/// supplied by the caller. The transport is only built once the action and
/// the configuration are known to be valid.
pub fn run_with<T, F, W>(cli: &Cli, transport: F, today: NaiveDate, out: &mut W) -> Result<()>
where
    T: Transport,
    F: FnOnce() -> Result<T>,
    W: Write,
{
    let action: Action = cli.action.parse()?;
    log::debug!("action: {action}");

    let operation = match action {
        Action::Init => return init(cli, out),
        Action::Report(operation) => operation,
    };

    let settings = if cli.config {
        let path = cli.config_file_path()?;
        log::debug!("loading config from {}", path.display());
        ConfigFile::load(&path)?.merge_over(cli.flag_values())
    } else {
        cli.flag_values()
    };
    let config = settings.into_client_config()?;

    let client = ReportingClient::new(config, transport()?);
    dispatch(operation, &client, cli.jitter(), today, out)
}

/// Invoke one operation on an already configured client.
pub fn dispatch<T: Transport, W: Write>(
    operation: Operation,
    client: &ReportingClient<T>,
    jitter: Jitter,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    match operation {
        Operation::Checkin => client.checkin(jitter, out).map(drop),
        Operation::Stats => client.stats(today, out).map(drop),
    }
}

fn init<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let path = cli.config_file_path()?;
    init_config_file(&path, &cli.flag_values())?;

    writeln!(out, "Config file created successfully and saved to:")?;
    writeln!(out, "{}", path.display())?;
    writeln!(out, "Please fill in your unique dashboard details into this file.")?;
    Ok(())
}

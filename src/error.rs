// Error types shared by the config supplier, the dispatcher and the
// reporting client. Anything that reaches `main` is fatal; recoverable
// conditions (a bad stats body, a non-2xx status) never become an `Error`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error produced by a `Transport` implementation.
pub type TransportSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API endpoint is required")]
    MissingEndpoint,

    #[error("dashboard id is required")]
    MissingDashboardId,

    #[error("invalid API endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("config file already exists at {}", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("error opening config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {} is not a valid JSON document", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write config file {}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine where the config file lives")]
    NoConfigDir,

    #[error("Invalid action {0:?} (expected checkin, stats or init)")]
    InvalidAction(String),

    #[error("client: error building http client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("client: error making http request to {url}")]
    Request {
        url: Url,
        #[source]
        source: TransportSource,
    },

    #[error("client: error reading response body from {url}")]
    ReadBody {
        url: Url,
        #[source]
        source: io::Error,
    },

    #[error("could not write status output")]
    Output(#[from] io::Error),
}

/// Coarse classification used to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Usage,
    Transport,
    Output,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Transport => 1,
            ErrorKind::Usage => 2,
            ErrorKind::Output => 74,
            ErrorKind::Configuration => 78,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingEndpoint
            | Error::MissingDashboardId
            | Error::InvalidEndpoint { .. }
            | Error::ConfigExists { .. }
            | Error::ConfigRead { .. }
            | Error::ConfigParse { .. }
            | Error::ConfigWrite { .. }
            | Error::NoConfigDir => ErrorKind::Configuration,
            Error::InvalidAction(_) => ErrorKind::Usage,
            Error::ClientBuild(_) | Error::Request { .. } | Error::ReadBody { .. } => {
                ErrorKind::Transport
            }
            Error::Output(_) => ErrorKind::Output,
        }
    }
}

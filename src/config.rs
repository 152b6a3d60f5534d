// Configuration supplier: the on-disk `rtoconfig.json` document, the
// validated `ClientConfig` handed to the reporting client, and the
// `init` action that writes a fresh document for the user to fill in.

use std::fs::OpenOptions;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// File name of the config document.
pub const CONFIG_FILE_NAME: &str = "rtoconfig.json";

/// The JSON document with exactly the two keys the tool understands.
/// Keys missing from the file deserialize to `None` so they can fall back
/// to values given on the command line.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub dashboard_id: Option<String>,
}

impl ConfigFile {
    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `self` on top of `base`: every key present here wins.
    pub fn merge_over(self, base: ConfigFile) -> ConfigFile {
        ConfigFile {
            api_url: self.api_url.or(base.api_url),
            dashboard_id: self.dashboard_id.or(base.dashboard_id),
        }
    }

    /// Validate into a `ClientConfig`.
    pub fn into_client_config(self) -> Result<ClientConfig> {
        ClientConfig::new(
            self.api_url.unwrap_or_default(),
            self.dashboard_id.unwrap_or_default(),
        )
    }
}

/// Validated, immutable client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_endpoint: Url,
    port: Option<u16>,
    dashboard_id: String,
}

impl ClientConfig {
    /// Both values must be non-empty and the endpoint must be an absolute
    /// URL carrying a host. Checked in that order, before any network use.
    pub fn new(api_url: impl AsRef<str>, dashboard_id: impl Into<String>) -> Result<Self> {
        let api_url = api_url.as_ref().trim();
        let dashboard_id = dashboard_id.into();
        if api_url.is_empty() {
            return Err(Error::MissingEndpoint);
        }
        if dashboard_id.trim().is_empty() {
            return Err(Error::MissingDashboardId);
        }

        let base_endpoint = Url::parse(api_url).map_err(|e| Error::InvalidEndpoint {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_endpoint.host_str().map_or(true, str::is_empty) {
            return Err(Error::InvalidEndpoint {
                url: api_url.to_string(),
                reason: "no host".into(),
            });
        }

        // `Url` forgets a port equal to the scheme default (`http://h:80`),
        // but it still has to reach the https URL.
        let port = base_endpoint
            .port()
            .or_else(|| written_port(api_url).and_then(|p| p.parse().ok()));

        Ok(ClientConfig {
            base_endpoint,
            port,
            dashboard_id: dashboard_id.trim().to_string(),
        })
    }

    pub fn base_endpoint(&self) -> &Url {
        &self.base_endpoint
    }

    pub fn dashboard_id(&self) -> &str {
        &self.dashboard_id
    }

    /// `host[:port]` of the configured endpoint, port kept whenever one was
    /// written. Scheme and path are dropped.
    pub fn host(&self) -> String {
        let host = self.base_endpoint.host_str().unwrap_or_default();
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

/// Port digits exactly as written in the authority of `raw`, if any.
fn written_port(raw: &str) -> Option<&str> {
    let rest = raw.split_once("://")?.1;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let (_, port) = authority.rsplit_once(':')?;
    (!port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())).then_some(port)
}

/// `rtoconfig.json` next to the running executable, or in the home
/// directory when the executable path is unavailable.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(dirs::home_dir)
        .ok_or(Error::NoConfigDir)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Create the config file at `path` holding `contents`. Fails if the file
/// already exists; an existing file is never overwritten.
pub fn init_config_file(path: &Path, contents: &ConfigFile) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            IoErrorKind::AlreadyExists => Error::ConfigExists {
                path: path.to_path_buf(),
            },
            _ => Error::ConfigWrite {
                path: path.to_path_buf(),
                source,
            },
        })?;

    // Always write both keys so the user sees what to fill in.
    let document = ConfigFile {
        api_url: Some(contents.api_url.clone().unwrap_or_default()),
        dashboard_id: Some(contents.dashboard_id.clone().unwrap_or_default()),
    };
    let json = serde_json::to_string_pretty(&document).map_err(|e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("wrote config template to {}", path.display());
    Ok(())
}

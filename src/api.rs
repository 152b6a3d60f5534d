// Reporting client: composes the check-in and stats URLs for a validated
// config, sends a single blocking request through a `Transport`, and
// turns the response into the status lines printed to the user.

use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use hyper::ext::ReasonPhrase;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::jitter;

/// Bound on every request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status code plus the reason phrase the server sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: StatusCode,
    pub reason: Option<String>,
}

impl StatusLine {
    pub fn new(code: StatusCode, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_owned);
        StatusLine { code, reason }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.as_u16())?;
        if let Some(reason) = &self.reason {
            write!(f, " {reason}")?;
        }
        Ok(())
    }
}

/// Status line and still-unread body of a GET response.
pub struct Fetched {
    pub status: StatusLine,
    pub body: Box<dyn Read + Send>,
}

/// The network seam. Implementations map every failure to
/// `Error::Request`; a non-2xx status is not a failure.
pub trait Transport {
    /// POST with no body; only the status is of interest.
    fn post(&self, url: &Url) -> Result<StatusLine>;

    /// GET, leaving the body for the caller to read.
    fn get(&self, url: &Url) -> Result<Fetched>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, url: &Url) -> Result<StatusLine> {
        (**self).post(url)
    }

    fn get(&self, url: &Url) -> Result<Fetched> {
        (**self).get(url)
    }
}

/// `Transport` backed by a blocking reqwest client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(HttpTransport { client })
    }
}

/// hyper keeps the received phrase only when it differs from the canonical
/// one, so a missing phrase means the canonical reason was sent.
fn status_line(res: &Response) -> StatusLine {
    let code = res.status();
    let received = res
        .extensions()
        .get::<ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
    StatusLine::new(code, received.as_deref().or(code.canonical_reason()))
}

fn request_error(url: &Url, err: reqwest::Error) -> Error {
    Error::Request {
        url: url.clone(),
        source: Box::new(err),
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &Url) -> Result<StatusLine> {
        log::debug!("POST {url}");
        let res = self
            .client
            .post(url.clone())
            .send()
            .map_err(|e| request_error(url, e))?;
        let status = status_line(&res);
        log::debug!("POST {url} -> {status}");
        Ok(status)
    }

    fn get(&self, url: &Url) -> Result<Fetched> {
        log::debug!("GET {url}");
        let res = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| request_error(url, e))?;
        let status = status_line(&res);
        log::debug!("GET {url} -> {status}");
        Ok(Fetched {
            status,
            body: Box::new(res),
        })
    }
}

/// Body of a successful stats response.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct StatsResponse {
    #[serde(default)]
    pub attendance: f64,
}

/// Decode a stats body. Anything that is not a JSON object with a numeric
/// `attendance` yields an attendance of zero.
pub fn parse_stats_body(bytes: &[u8]) -> StatsResponse {
    match serde_json::from_slice(bytes) {
        Ok(stats) => stats,
        Err(e) => {
            log::warn!("could not decode stats body, using 0: {e}");
            StatsResponse::default()
        }
    }
}

/// Whether and how long to wait before a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    Disabled,
    /// Fresh uniform draw in `[0, 60)` seconds.
    Random,
}

impl Jitter {
    pub fn delay(self) -> Option<Duration> {
        match self {
            Jitter::Disabled => None,
            Jitter::Random => Some(jitter::draw_fresh()),
        }
    }
}

/// Client for the dashboard's check-in and stats endpoints.
pub struct ReportingClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
    sleeper: fn(Duration),
}

impl<T: Transport> ReportingClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        ReportingClient {
            config,
            transport,
            sleeper: jitter::wait,
        }
    }

    /// Replace the function used to block during jitter.
    pub fn with_sleeper(mut self, sleeper: fn(Duration)) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// `https://{host}/{segments...}`, whatever scheme or path the
    /// configured endpoint had.
    fn endpoint_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let invalid = |reason: String| Error::InvalidEndpoint {
            url: self.config.base_endpoint().to_string(),
            reason,
        };
        let mut url = Url::parse(&format!("https://{}", self.config.host()))
            .map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn checkin_url(&self) -> Result<Url> {
        self.endpoint_url(["checkin", self.config.dashboard_id()])
    }

    /// Stats for the year and month of `date`, month zero-padded.
    pub fn stats_url(&self, date: NaiveDate) -> Result<Url> {
        let year = format!("{:04}", date.year());
        let month = format!("{:02}", date.month());
        self.endpoint_url(["stats", self.config.dashboard_id(), year.as_str(), month.as_str()])
    }

    /// Optionally wait, then POST a check-in. Any status the server answers
    /// with is reported; only transport failure is an error.
    pub fn checkin<W: Write>(&self, jitter: Jitter, out: &mut W) -> Result<StatusLine> {
        if let Some(delay) = jitter.delay() {
            writeln!(out, "Sleeping for : {} seconds", delay.as_secs())?;
            (self.sleeper)(delay);
        }

        let url = self.checkin_url()?;
        writeln!(out, "Checkin URL detected to be: {url}")?;

        let status = self.transport.post(&url)?;
        writeln!(out, "Checkin was successful with a response code of: {status}")?;
        Ok(status)
    }

    /// GET this month's stats. Returns the floored attendance when the
    /// server answered 2xx, `None` otherwise.
    pub fn stats<W: Write>(&self, today: NaiveDate, out: &mut W) -> Result<Option<f64>> {
        let url = self.stats_url(today)?;
        writeln!(out, "Stats URL detected to be: {url}")?;

        let Fetched { status, mut body } = self.transport.get(&url)?;
        if !status.is_success() {
            log::debug!("stats request answered {status}, nothing to report");
            return Ok(None);
        }
        writeln!(out, "Stats request was successful with a response code of: {status}")?;

        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)
            .map_err(|source| Error::ReadBody { url, source })?;

        let attendance = parse_stats_body(&bytes).attendance.floor();
        writeln!(out, "Your attendance is currently at {attendance} percent")?;
        Ok(Some(attendance))
    }
}

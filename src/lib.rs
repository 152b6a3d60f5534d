// Library root
// -----------
// The `cronhelper` binary is a thin wrapper over these modules so that the
// request logic can be tested without a network or a real clock.
//
// Module responsibilities:
// - `config`: the `rtoconfig.json` document, validation into a
//   `ClientConfig`, and the `init` action.
// - `api`: the reporting client (check-in and stats) and the HTTP
//   transport it talks through.
// - `jitter`: the random pre-check-in delay.
// - `cli`: flag parsing and the dispatcher that picks one operation.
// - `error`: the error type and its fatal-error classification.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod jitter;

pub use error::{Error, ErrorKind, Result};

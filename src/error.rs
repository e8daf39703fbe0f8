// src/error.rs
use std::fmt;
use std::io;

use thiserror::Error;

/// Everything that can stop one pipeline run.
#[derive(Error, Debug)]
pub enum Error {
    /// The site rejected the credentials. Never retried.
    #[error("login rejected: {0}")]
    Auth(String),

    /// Connection failure, timeout or an unexpected HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The session died between login and fetch.
    #[error("session expired: {0}")]
    AuthExpired(String),

    /// The page no longer has the structure we read.
    #[error("page structure not recognized: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit status for this class of failure. 1 is kept for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Auth(_) => 2,
            Error::Network(_) => 3,
            Error::AuthExpired(_) => 4,
            Error::Parse(_) => 5,
            Error::Io(_) => 6,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let what = if e.is_timeout() {
            "timed out"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_redirect() {
            "redirect loop"
        } else {
            "request failed"
        };
        match e.url() {
            Some(url) => Error::Network(format!("{what}: {url}: {e}")),
            None => Error::Network(format!("{what}: {e}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline states, in order. A failure is tagged with the state being entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Authenticated,
    Fetched,
    Extracted,
    Merged,
    Saved,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Authenticated => "AUTHENTICATED",
            Stage::Fetched => "FETCHED",
            Stage::Extracted => "EXTRACTED",
            Stage::Merged => "MERGED",
            Stage::Saved => "SAVED",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("stage {stage} failed: {source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl RunError {
    pub fn at(stage: Stage) -> impl FnOnce(Error) -> RunError {
        move |source| RunError { stage, source }
    }

    pub fn exit_code(&self) -> u8 {
        self.source.exit_code()
    }
}

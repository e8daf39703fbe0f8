// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;

/// Where the operations data is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// One plot page per series, each carrying `points: '…'` strings.
    Plots,
    /// A single page with an HTML operations table.
    Table { url: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetOptions {
    pub login_url: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            login_url: s!(LOGIN_URL),
            base_url: s!(BASE_URL),
            timeout: Duration::from_secs(TIMEOUT_SECS),
        }
    }
}

impl NetOptions {
    /// `{base}/Plot?data=INV&x=all`
    pub fn plot_url(&self, label: &str) -> String {
        join!(self.base_url.trim_end_matches('/'), "/Plot?data=", label, "&x=all")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub out_path: PathBuf,
    pub lock_wait: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            out_path: PathBuf::from(DEFAULT_OUT_FILE),
            lock_wait: Duration::from_secs(LOCK_WAIT_SECS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub source: Source,
    pub net: NetOptions,
    pub store: StoreOptions,
    /// Stop after MERGED; nothing is written.
    pub dry_run: bool,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            source: Source::Plots,
            net: NetOptions::default(),
            store: StoreOptions::default(),
            dry_run: false,
            verbose: false,
            log_file: None,
        }
    }
}

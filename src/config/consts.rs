// src/config/consts.rs

// Net config
pub const LOGIN_URL: &str = "https://op.responsive.net/lt/oneill/entry.html";
pub const BASE_URL: &str = "http://op.responsive.net/Littlefield";
pub const USER_AGENT: &str = concat!("lf_scrape/", env!("CARGO_PKG_VERSION"));
pub const TIMEOUT_SECS: u64 = 30;

// Login form field names
pub const FORM_ID_FIELD: &str = "id";
pub const FORM_PASSWORD_FIELD: &str = "password";

// Markup only the logged-in app serves: its frameset shell or the plot menu.
// A login response carrying none of these is a rejection.
pub const LOGIN_OK_MARKERS: &[&str] = &["<frameset", "Plot?data="];

// Persistence
pub const DEFAULT_OUT_FILE: &str = "data.csv";
pub const LOCK_SUFFIX: &str = ".lock";
pub const LOCK_WAIT_SECS: u64 = 60;
pub const LOCK_POLL_MS: u64 = 250;
pub const STORE_SEP: char = ',';

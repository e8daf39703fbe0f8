// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod schema;
pub mod session;
pub mod specs;

pub mod csv;
pub mod file;
pub mod merge;
pub mod progress;
pub mod runner;
pub mod store;

pub use error::{Error, Result, RunError, Stage};
pub use schema::{Field, Record, Table};

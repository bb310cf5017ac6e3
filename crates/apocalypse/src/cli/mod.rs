//! CLI module for the Flash apocalypse audit
//!
//! Each subcommand lives in its own module with an `Args` struct and a
//! `run` entry point. Shared pieces: path and config resolution
//! ([`context`]), user-facing errors ([`error`]) and table output
//! ([`output`]).

pub mod config;
pub mod context;
pub mod error;
pub mod output;

pub mod export;
pub mod history;
pub mod init;
pub mod report;
pub mod run;
pub mod schedule;
pub mod status;

//! # lantern
//!
//! Shell and remote client for the Lantern graph store.
//!
//! The language itself lives in `lantern-core`; this crate adds what a
//! terminal user needs around it:
//!
//! - `cli`: argument parsing and the interactive, pipe and one-shot modes
//! - `client`: `RemoteStore`, the HTTP implementation of `GraphStore`
//! - `config`: defaults, TOML file, environment and flag layering

pub mod cli;
pub mod client;
pub mod config;
pub mod error;

pub use client::RemoteStore;
pub use config::{Config, ConfigError, LogFormat};
pub use error::AppError;

//! Rota - a command-line rotation tracker for teams moving through stages
//!
//! This library provides the core functionality for Rota, including:
//! - The rotation engine: round selection, stage assignment, consistency checks
//! - Snapshot normalization for anything loaded from outside the process
//! - The base64url share-link codec
//! - Database operations and migrations
//! - Repository layer for snapshot access
//! - CLI command parsing and rendering
//!
//! # Example
//!
//! ```no_run
//! use rota::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod db;
pub mod engine;
pub mod models;
pub mod repo;
pub mod snapshot;
pub mod utils;

//! sqlite-lens - browse SQLite databases through the sqlite3 CLI.
//!
//! This library exposes the core modules for use in integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod output;

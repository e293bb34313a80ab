//! Bulkaudit CLI library
//!
//! The `bulkaudit` binary is a thin wrapper around these modules so that
//! argument parsing, config resolution and output can be tested directly.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

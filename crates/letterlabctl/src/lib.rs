//! letterlabctl - command-line access to Letterlab progress
//!
//! Exposed as a library so integration tests can drive commands directly.

pub mod cli;
pub mod commands;
pub mod display;
pub mod logging;

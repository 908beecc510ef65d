//! Subcommands of the `nfex` binary.

pub mod batch;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod key;
mod output;

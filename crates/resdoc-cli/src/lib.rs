//! resdoc command line front end
//!
//! Configuration loading, logging setup and the subcommands behind the
//! `resdoc` binary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod commands;
mod config;
mod logging;

pub use commands::Runner;
pub use config::{ConfigError, ResdocConfig};
pub use logging::{init_logging, level_for_verbosity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{mock::MockRunner, process::SystemRunner};
pub use core::session::{CncSession, HostStatus, Outcome, SessionOptions};
pub use domain::model::{CncConfig, Host, MacAddress, ProxyHost, WakeSettings};
pub use domain::ports::{CommandLine, CommandOutput, CommandRunner};
pub use utils::error::{CncError, Result};

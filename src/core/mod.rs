pub mod connect;
pub mod probe;
pub mod select;
pub mod session;
pub mod ssh;
pub mod wake;

pub use crate::domain::model::{CncConfig, Host, ProxyHost, WakeSettings};
pub use crate::domain::ports::{CommandLine, CommandOutput, CommandRunner};
pub use crate::utils::error::Result;

#[cfg(feature = "cli")]
pub mod cli;
pub mod file_config;
pub mod paths;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use file_config::{load_config, ConfigFile, ConfigFormat};

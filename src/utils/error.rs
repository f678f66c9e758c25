use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration file not found (searched: {})", display_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unknown host '{name}' (known hosts: {})", .known.join(", "))]
    UnknownHost { name: String, known: Vec<String> },

    #[error("Failed to run '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Proxy '{proxy}' is unreachable over SSH: {stderr}")]
    ProxyUnreachable { proxy: String, stderr: String },

    #[error("Host '{host}' is offline")]
    HostOffline { host: String },

    #[error("Host '{host}' did not come online within {}s", .waited.as_secs())]
    WakeTimeout { host: String, waited: Duration },

    #[error("Input ended before a host was selected")]
    InputAborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    RemoteCommand,
    Wake,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::YamlError(_)
            | Self::TomlError(_)
            | Self::JsonError(_)
            | Self::ConfigNotFound { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::UnknownHost { .. } | Self::InputAborted => ErrorCategory::Input,
            Self::CommandFailed { .. } | Self::ProxyUnreachable { .. } => {
                ErrorCategory::RemoteCommand
            }
            Self::HostOffline { .. } | Self::WakeTimeout { .. } => ErrorCategory::Wake,
            Self::IoError(_) | Self::SpawnError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Wake | ErrorCategory::RemoteCommand => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::System => 1,
            ErrorCategory::RemoteCommand => 2,
            ErrorCategory::Wake => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigNotFound { searched } => format!(
                "No configuration file found. Looked in: {}",
                display_paths(searched)
            ),
            Self::UnknownHost { name, .. } => format!("'{}' is not a configured host", name),
            Self::ProxyUnreachable { proxy, .. } => {
                format!("Could not reach the proxy host '{}' over SSH", proxy)
            }
            Self::WakeTimeout { host, waited } => format!(
                "Sent the wake-up packet but '{}' was still unreachable after {}s",
                host,
                waited.as_secs()
            ),
            Self::SpawnError { program, .. } => {
                format!("Could not start '{}'. Is it installed and on PATH?", program)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => {
                "Create ~/.config/cnc/config.yaml or pass --config <PATH>"
            }
            Self::YamlError(_) | Self::TomlError(_) | Self::JsonError(_) => {
                "Check the configuration file syntax"
            }
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => {
                "Fix the named field in the configuration file"
            }
            Self::UnknownHost { .. } => "Run `cnc --list` to see the configured hosts",
            Self::InputAborted => "Pass the host name as an argument to skip the menu",
            Self::ProxyUnreachable { .. } => {
                "Check that `ssh <proxy>` works without cnc and the proxy is powered on"
            }
            Self::CommandFailed { .. } => {
                "Check that `wakeonlan` and `nc` are installed on the proxy host"
            }
            Self::HostOffline { .. } => "Drop --no-wake to send a wake-up packet",
            Self::WakeTimeout { .. } => {
                "Check Wake-on-LAN is enabled in the host's firmware, or raise --wait"
            }
            Self::SpawnError { .. } => "Install the OpenSSH client",
            Self::IoError(_) => "Check file permissions and the terminal",
        }
    }

    /// Prefixes the field path of configuration errors, leaving others untouched.
    pub fn within(self, prefix: &str) -> Self {
        match self {
            Self::MissingConfigError { field } => Self::MissingConfigError {
                field: format!("{}.{}", prefix, field),
            },
            Self::InvalidConfigValueError {
                field,
                value,
                reason,
            } => Self::InvalidConfigValueError {
                field: format!("{}.{}", prefix, field),
                value,
                reason,
            },
            Self::ConfigValidationError { field, message } => Self::ConfigValidationError {
                field: format!("{}.{}", prefix, field),
                message,
            },
            other => other,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CncError>;

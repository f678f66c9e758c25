use crate::utils::error::{CncError, Result};
use crate::utils::validation::{validate_range, validate_ssh_token, Validate};
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address '{value}': {reason}")]
pub struct MacParseError {
    pub value: String,
    pub reason: &'static str,
}

/// A 48-bit hardware address, written `aa:bb:cc:dd:ee:ff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fail = |reason| MacParseError {
            value: s.to_string(),
            reason,
        };

        let separator = if s.contains(':') { ':' } else { '-' };
        let parts: Vec<&str> = s.split(separator).collect();
        if parts.len() != 6 {
            return Err(fail("expected six octets separated by ':' or '-'"));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(fail("each octet must be two hex digits"));
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| fail("invalid hex octet"))?;
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Where and as whom `ssh` should log in. Without a port, `ssh` picks one
/// from its own configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: Option<String>,
    pub address: String,
    pub port: Option<u16>,
}

impl SshTarget {
    /// `user@address`, or just `address` without a user.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.address),
            None => self.address.clone(),
        }
    }
}

/// The always-on machine that relays probes and wake-up packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHost {
    pub name: String,
    pub port: Option<u16>,
    pub ip: Option<IpAddr>,
    pub user: Option<String>,
}

impl ProxyHost {
    pub fn ssh_target(&self) -> SshTarget {
        SshTarget {
            user: self.user.clone(),
            address: address_of(&self.name, self.ip),
            port: self.port,
        }
    }
}

impl Validate for ProxyHost {
    fn validate(&self) -> Result<()> {
        validate_ssh_token("name", &self.name)?;
        validate_port(self.port)?;
        if let Some(user) = &self.user {
            validate_ssh_token("user", user)?;
        }
        Ok(())
    }
}

/// A high-power machine that sleeps until woken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub mac: MacAddress,
    pub port: Option<u16>,
    pub proxy: String,
    pub ip: Option<IpAddr>,
    pub user: Option<String>,
}

impl Host {
    /// The address the proxy probes and `ssh` connects to.
    pub fn address(&self) -> String {
        address_of(&self.name, self.ip)
    }

    /// The port `nc` checks on the proxy's side.
    pub fn probe_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    pub fn ssh_target(&self) -> SshTarget {
        SshTarget {
            user: self.user.clone(),
            address: self.address(),
            port: self.port,
        }
    }
}

impl Validate for Host {
    fn validate(&self) -> Result<()> {
        validate_ssh_token("name", &self.name)?;
        validate_port(self.port)?;
        validate_ssh_token("proxy", &self.proxy)?;
        if let Some(user) = &self.user {
            validate_ssh_token("user", user)?;
        }
        Ok(())
    }
}

fn address_of(name: &str, ip: Option<IpAddr>) -> String {
    ip.map(|ip| ip.to_string()).unwrap_or_else(|| name.to_string())
}

fn validate_port(port: Option<u16>) -> Result<()> {
    match port {
        Some(port) => validate_range("port", port, 1, u16::MAX),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

impl WakeSettings {
    /// Same settings with a different overall timeout, never shorter than one poll.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: timeout.max(self.poll_interval),
            ..self
        }
    }
}

impl Validate for WakeSettings {
    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(CncError::InvalidConfigValueError {
                field: "poll_interval_secs".to_string(),
                value: "0".to_string(),
                reason: "Poll interval must be at least 1 second".to_string(),
            });
        }
        if self.timeout < self.poll_interval {
            return Err(CncError::InvalidConfigValueError {
                field: "timeout_secs".to_string(),
                value: self.timeout.as_secs().to_string(),
                reason: format!(
                    "Timeout must be at least the poll interval ({}s)",
                    self.poll_interval.as_secs()
                ),
            });
        }
        Ok(())
    }
}

/// A validated configuration. Hosts keep their file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CncConfig {
    hosts: Vec<Host>,
    proxy_hosts: Vec<ProxyHost>,
    default_host: Option<String>,
    wake: WakeSettings,
}

impl CncConfig {
    pub fn new(
        hosts: Vec<Host>,
        proxy_hosts: Vec<ProxyHost>,
        default_host: Option<String>,
        wake: WakeSettings,
    ) -> Result<Self> {
        if hosts.is_empty() {
            return Err(CncError::ConfigValidationError {
                field: "hosts".to_string(),
                message: "At least one host must be configured".to_string(),
            });
        }
        if proxy_hosts.is_empty() {
            return Err(CncError::ConfigValidationError {
                field: "proxy_hosts".to_string(),
                message: "At least one proxy host must be configured".to_string(),
            });
        }

        let mut proxy_names = HashSet::new();
        for (i, proxy) in proxy_hosts.iter().enumerate() {
            let prefix = format!("proxy_hosts[{}]", i);
            proxy.validate().map_err(|e| e.within(&prefix))?;
            if !proxy_names.insert(proxy.name.as_str()) {
                return Err(duplicate_name(&prefix, &proxy.name));
            }
        }

        let mut host_names = HashSet::new();
        for (i, host) in hosts.iter().enumerate() {
            let prefix = format!("hosts[{}]", i);
            host.validate().map_err(|e| e.within(&prefix))?;
            if !host_names.insert(host.name.as_str()) {
                return Err(duplicate_name(&prefix, &host.name));
            }
            if !proxy_names.contains(host.proxy.as_str()) {
                return Err(CncError::InvalidConfigValueError {
                    field: format!("{}.proxy", prefix),
                    value: host.proxy.clone(),
                    reason: "No proxy host with this name".to_string(),
                });
            }
        }

        if let Some(default) = &default_host {
            if !host_names.contains(default.as_str()) {
                return Err(CncError::InvalidConfigValueError {
                    field: "default_host".to_string(),
                    value: default.clone(),
                    reason: "No host with this name".to_string(),
                });
            }
        }

        wake.validate().map_err(|e| e.within("wake"))?;

        Ok(Self {
            hosts,
            proxy_hosts,
            default_host,
            wake,
        })
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn proxy_hosts(&self) -> &[ProxyHost] {
        &self.proxy_hosts
    }

    pub fn wake(&self) -> WakeSettings {
        self.wake
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn proxy(&self, name: &str) -> Option<&ProxyHost> {
        self.proxy_hosts.iter().find(|p| p.name == name)
    }

    pub fn default_host(&self) -> Option<&Host> {
        self.default_host.as_deref().and_then(|name| self.host(name))
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.name.clone()).collect()
    }

    /// Looks a host up by name, failing with the list of known names.
    pub fn require_host(&self, name: &str) -> Result<&Host> {
        self.host(name).ok_or_else(|| CncError::UnknownHost {
            name: name.to_string(),
            known: self.host_names(),
        })
    }

    pub fn proxy_for(&self, host: &Host) -> Result<&ProxyHost> {
        self.proxy(&host.proxy)
            .ok_or_else(|| CncError::InvalidConfigValueError {
                field: format!("{}.proxy", host.name),
                value: host.proxy.clone(),
                reason: "No proxy host with this name".to_string(),
            })
    }
}

fn duplicate_name(prefix: &str, name: &str) -> CncError {
    CncError::InvalidConfigValueError {
        field: format!("{}.name", prefix),
        value: name.to_string(),
        reason: "Name is already used by another entry".to_string(),
    }
}

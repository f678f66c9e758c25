use crate::domain::model::{
    CncConfig, Host, MacAddress, MacParseError, ProxyHost, WakeSettings,
};
use crate::utils::error::{CncError, Result};
use crate::utils::validation::{validate_range, validate_required_field};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Chosen by file extension; no extension means YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            None | Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(CncError::InvalidConfigValueError {
                field: "config".to_string(),
                value: path.display().to_string(),
                reason: format!(
                    "Unsupported config extension '.{}'. Use .yaml, .yml, .toml or .json",
                    other
                ),
            }),
        }
    }
}

/// The config file as written on disk, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
    #[serde(default)]
    pub proxy_hosts: Vec<ProxyEntry>,
    pub default_host: Option<String>,
    pub wake: Option<WakeEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostEntry {
    pub name: Option<String>,
    pub mac: Option<String>,
    pub port: Option<i64>,
    pub proxy: Option<String>,
    pub ip: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyEntry {
    pub name: Option<String>,
    pub port: Option<i64>,
    pub ip: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WakeEntry {
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(CncError::IoError)?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let processed = substitute_env_vars(content)?;

        let parsed: Self = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&processed)?,
            ConfigFormat::Toml => toml::from_str(&processed)?,
            ConfigFormat::Json => serde_json::from_str(&processed)?,
        };
        Ok(parsed)
    }

    /// Validates every entry and the references between them.
    pub fn into_config(self) -> Result<CncConfig> {
        let proxy_hosts = self
            .proxy_hosts
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = format!("proxy_hosts[{}]", i);
                entry.into_proxy().map_err(|e| e.within(&prefix))
            })
            .collect::<Result<Vec<_>>>()?;

        let hosts = self
            .hosts
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = format!("hosts[{}]", i);
                entry.into_host().map_err(|e| e.within(&prefix))
            })
            .collect::<Result<Vec<_>>>()?;

        let wake = match self.wake {
            Some(entry) => entry.into_settings(),
            None => WakeSettings::default(),
        };

        CncConfig::new(hosts, proxy_hosts, self.default_host, wake)
    }
}

impl HostEntry {
    fn into_host(self) -> Result<Host> {
        let name = validate_required_field("name", &self.name)?.clone();
        let mac = parse_mac(validate_required_field("mac", &self.mac)?)?;
        let proxy = validate_required_field("proxy", &self.proxy)?.clone();

        Ok(Host {
            name,
            mac,
            port: parse_port(self.port)?,
            proxy,
            ip: parse_ip(self.ip.as_deref())?,
            user: self.user,
        })
    }
}

impl ProxyEntry {
    fn into_proxy(self) -> Result<ProxyHost> {
        let name = validate_required_field("name", &self.name)?.clone();

        Ok(ProxyHost {
            name,
            port: parse_port(self.port)?,
            ip: parse_ip(self.ip.as_deref())?,
            user: self.user,
        })
    }
}

impl WakeEntry {
    fn into_settings(self) -> WakeSettings {
        let defaults = WakeSettings::default();
        WakeSettings {
            poll_interval: self
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

fn parse_mac(value: &str) -> Result<MacAddress> {
    value
        .parse()
        .map_err(|e: MacParseError| CncError::InvalidConfigValueError {
            field: "mac".to_string(),
            value: value.to_string(),
            reason: e.reason.to_string(),
        })
}

/// An absent port stays absent so `ssh` can take it from its own config.
fn parse_port(port: Option<i64>) -> Result<Option<u16>> {
    port.map(|port| {
        validate_range("port", port, 1, i64::from(u16::MAX))?;
        u16::try_from(port).map_err(|_| CncError::InvalidConfigValueError {
            field: "port".to_string(),
            value: port.to_string(),
            reason: "Port out of range".to_string(),
        })
    })
    .transpose()
}

fn parse_ip(ip: Option<&str>) -> Result<Option<IpAddr>> {
    ip.map(|raw| {
        raw.trim()
            .parse::<IpAddr>()
            .map_err(|e| CncError::InvalidConfigValueError {
                field: "ip".to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
    })
    .transpose()
}

/// Replaces `${VAR}` with the environment value. Unset variables stay as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
        CncError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        }
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

/// Reads and validates the config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CncConfig> {
    ConfigFile::from_file(path)?.into_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
default_host: tower
proxy_hosts:
  - name: pi
    port: 22
    user: admin
hosts:
  - name: tower
    mac: "AA:BB:CC:DD:EE:FF"
    port: 22
    proxy: pi
  - name: nas
    mac: "00-11-22-33-44-55"
    proxy: pi
    ip: 192.168.1.20
wake:
  poll_interval_secs: 2
  timeout_secs: 30
"#;

    #[test]
    fn test_parse_yaml_config() {
        let config = ConfigFile::parse(YAML, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.default_host().unwrap().name, "tower");

        let nas = config.host("nas").unwrap();
        assert_eq!(nas.mac.to_string(), "00:11:22:33:44:55");
        assert_eq!(nas.port, None);
        assert_eq!(nas.probe_port(), 22);
        assert_eq!(config.host("tower").unwrap().port, Some(22));
        assert_eq!(nas.address(), "192.168.1.20");

        let pi = config.proxy_for(nas).unwrap();
        assert_eq!(pi.ssh_target().destination(), "admin@pi");
        assert_eq!(config.wake().poll_interval, Duration::from_secs(2));
        assert_eq!(config.wake().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_content = r#"
[[proxy_hosts]]
name = "pi"
port = 2222

[[hosts]]
name = "tower"
mac = "aa:bb:cc:dd:ee:ff"
port = 22
proxy = "pi"
"#;

        let config = ConfigFile::parse(toml_content, ConfigFormat::Toml)
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.proxy("pi").unwrap().port, Some(2222));
        assert!(config.default_host().is_none());
        assert_eq!(config.wake(), WakeSettings::default());
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "hosts": [{"name": "tower", "mac": "aa:bb:cc:dd:ee:ff", "port": 22, "proxy": "pi"}],
            "proxy_hosts": [{"name": "pi", "port": 22, "ip": "fe80::1"}]
        }"#;

        let config = ConfigFile::parse(json, ConfigFormat::Json)
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.proxy("pi").unwrap().ssh_target().address, "fe80::1");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CNC_TEST_TOWER_MAC", "de:ad:be:ef:00:01");

        let yaml = r#"
proxy_hosts:
  - name: pi
hosts:
  - name: tower
    mac: "${CNC_TEST_TOWER_MAC}"
    proxy: pi
"#;
        let config = ConfigFile::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.host("tower").unwrap().mac.to_string(), "de:ad:be:ef:00:01");

        std::env::remove_var("CNC_TEST_TOWER_MAC");
    }

    #[test]
    fn test_unset_env_var_is_left_alone() {
        let out = substitute_env_vars("user: ${CNC_TEST_SURELY_UNSET_VAR}").unwrap();
        assert_eq!(out, "user: ${CNC_TEST_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_errors_name_the_field() {
        let yaml = r#"
proxy_hosts:
  - name: pi
hosts:
  - name: tower
    mac: "aa:bb:cc:dd:ee:ff"
    proxy: pi
  - name: nas
    mac: "not-a-mac"
    proxy: pi
"#;
        let err = ConfigFile::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(
            matches!(err, CncError::InvalidConfigValueError { ref field, .. } if field == "hosts[1].mac")
        );

        let yaml = r#"
proxy_hosts:
  - name: pi
    port: 70000
hosts:
  - name: tower
    mac: "aa:bb:cc:dd:ee:ff"
    proxy: pi
"#;
        let err = ConfigFile::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(
            matches!(err, CncError::InvalidConfigValueError { ref field, .. } if field == "proxy_hosts[0].port")
        );

        let yaml = r#"
proxy_hosts:
  - name: pi
hosts:
  - name: tower
    proxy: pi
"#;
        let err = ConfigFile::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(matches!(err, CncError::MissingConfigError { ref field } if field == "hosts[0].mac"));

        let yaml = r#"
proxy_hosts:
  - name: pi
hosts:
  - name: tower
    mac: "aa:bb:cc:dd:ee:ff"
    proxy: pi
    ip: "192.168.1.999"
"#;
        let err = ConfigFile::parse(yaml, ConfigFormat::Yaml)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(
            matches!(err, CncError::InvalidConfigValueError { ref field, .. } if field == "hosts[0].ip")
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let yaml = r#"
proxy_hosts:
  - name: pi
hosts:
  - name: tower
    mac: "aa:bb:cc:dd:ee:ff"
    proxy: pi
    hostname: oops
"#;
        let err = ConfigFile::parse(yaml, ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, CncError::YamlError(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("c.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("c.YAML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("c.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("c.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("c.ini")).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        temp_file.write_all(YAML.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.host_names(), vec!["tower", "nas"]);
    }
}

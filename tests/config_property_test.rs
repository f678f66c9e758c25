use cnc::config::file_config::{ConfigFile, HostEntry, ProxyEntry, WakeEntry};
use cnc::{CncError, MacAddress};
use proptest::prelude::*;
use std::net::IpAddr;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.-]{0,11}"
}

fn user() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_-]{0,7}"
}

fn mac_text(octets: [u8; 6], dashes: bool, upper: bool) -> String {
    let text = MacAddress::new(octets).to_string();
    let text = if dashes { text.replace(':', "-") } else { text };
    if upper {
        text.to_ascii_uppercase()
    } else {
        text
    }
}

fn proxy_entry(name: String) -> impl Strategy<Value = ProxyEntry> {
    (
        prop::option::of(1..=65535i64),
        prop::option::of(any::<IpAddr>()),
        prop::option::of(user()),
    )
        .prop_map(move |(port, ip, user)| ProxyEntry {
            name: Some(name.clone()),
            port,
            ip: ip.map(|ip| ip.to_string()),
            user,
        })
}

fn host_entry(name: String, proxies: Vec<String>) -> impl Strategy<Value = HostEntry> {
    (
        any::<[u8; 6]>(),
        any::<bool>(),
        any::<bool>(),
        prop::option::of(1..=65535i64),
        0..proxies.len(),
        prop::option::of(any::<IpAddr>()),
        prop::option::of(user()),
    )
        .prop_map(move |(octets, dashes, upper, port, proxy, ip, user)| HostEntry {
            name: Some(name.clone()),
            mac: Some(mac_text(octets, dashes, upper)),
            port,
            proxy: Some(proxies[proxy].clone()),
            ip: ip.map(|ip| ip.to_string()),
            user,
        })
}

/// Unique host and proxy names, every host pointing at one of the proxies.
fn config_file() -> impl Strategy<Value = ConfigFile> {
    (
        prop::collection::hash_set(name(), 1..4),
        prop::collection::hash_set(name(), 1..6),
    )
        .prop_flat_map(|(proxy_names, host_names)| {
            let proxy_names: Vec<String> = proxy_names.into_iter().collect();
            let host_names: Vec<String> = host_names.into_iter().collect();
            let host_count = host_names.len();

            let proxies: Vec<_> = proxy_names.iter().cloned().map(proxy_entry).collect();
            let hosts: Vec<_> = host_names
                .into_iter()
                .map(|name| host_entry(name, proxy_names.clone()))
                .collect();
            let wake = prop::option::of((1..30u64, 0..300u64).prop_map(|(poll, extra)| {
                WakeEntry {
                    poll_interval_secs: Some(poll),
                    timeout_secs: Some(poll + extra),
                }
            }));

            (proxies, hosts, prop::option::of(0..host_count), wake)
        })
        .prop_map(|(proxy_hosts, hosts, default, wake)| {
            let default_host = default.and_then(|i| hosts[i].name.clone());
            ConfigFile {
                hosts,
                proxy_hosts,
                default_host,
                wake,
            }
        })
}

proptest! {
    #[test]
    fn test_well_formed_files_always_validate(file in config_file()) {
        let entries = file.clone();
        let config = file.into_config().unwrap();

        prop_assert!(!config.hosts().is_empty());
        prop_assert_eq!(config.hosts().len(), entries.hosts.len());
        prop_assert_eq!(config.proxy_hosts().len(), entries.proxy_hosts.len());

        match &entries.default_host {
            Some(name) => prop_assert_eq!(&config.default_host().unwrap().name, name),
            None => prop_assert!(config.default_host().is_none()),
        }

        for (host, entry) in config.hosts().iter().zip(&entries.hosts) {
            prop_assert_eq!(Some(&host.name), entry.name.as_ref());
            prop_assert_eq!(host.port.map(i64::from), entry.port);
            prop_assert_eq!(
                host.mac.to_string(),
                entry.mac.as_deref().unwrap().to_ascii_lowercase().replace('-', ":")
            );

            let proxy = config.proxy_for(host).unwrap();
            prop_assert_eq!(&proxy.name, &host.proxy);
        }
    }

    #[test]
    fn test_out_of_range_ports_name_the_field(
        file in config_file(),
        port in prop_oneof![i64::MIN..=0i64, 65536..=i64::MAX],
    ) {
        let mut file = file;
        let last = file.hosts.len() - 1;
        file.hosts[last].port = Some(port);

        let err = file.into_config().unwrap_err();
        let expected = format!("hosts[{}].port", last);
        prop_assert!(
            matches!(err, CncError::InvalidConfigValueError { ref field, .. } if *field == expected),
            "unexpected error: {:?}",
            err
        );
    }
}

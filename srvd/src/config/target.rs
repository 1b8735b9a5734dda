/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoverTargetConfig {
    pub name: String,
    pub interval: Duration,
    /// Mirror the discovered endpoints into a weighted directory.
    pub directory: bool,
}

impl DiscoverTargetConfig {
    fn new(name: String) -> Self {
        DiscoverTargetConfig {
            name,
            interval: DEFAULT_POLL_INTERVAL,
            directory: true,
        }
    }

    fn parse_map(map: &yaml::Hash) -> anyhow::Result<Self> {
        let name = srvd_yaml::hash_get_required(map, "name")?;
        let name = srvd_yaml::value::as_domain(name).context("invalid service name")?;
        let mut config = DiscoverTargetConfig::new(name);

        srvd_yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
        if config.interval.is_zero() {
            return Err(anyhow!("poll interval should not be zero"));
        }
        Ok(config)
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match srvd_yaml::key::normalize(k).as_str() {
            "name" => Ok(()),
            "interval" | "poll_interval" => {
                self.interval = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "directory" => {
                self.directory = srvd_yaml::value::as_bool(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    /// A single target may be a plain service name or a map.
    pub(crate) fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::String(_) => {
                let name = srvd_yaml::value::as_domain(v).context("invalid service name")?;
                Ok(DiscoverTargetConfig::new(name))
            }
            Yaml::Hash(map) => Self::parse_map(map),
            _ => Err(anyhow!(
                "yaml value type for discover target should be 'string' or 'map'"
            )),
        }
    }

    pub(crate) fn parse_list(v: &Yaml) -> anyhow::Result<Vec<Self>> {
        let targets = srvd_yaml::value::as_list(v, Self::parse_yaml)?;
        for (i, t) in targets.iter().enumerate() {
            if targets[..i].iter().any(|o| o.name == t.name) {
                return Err(anyhow!("duplicate discover target {}", t.name));
            }
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    #[test]
    fn parse_targets() {
        let docs = YamlLoader::load_from_str(
            r#"
- name: _http._tcp.example.net
  interval: 1m
- _sip._udp.example.net.
- name: _ldap._tcp.example.net
  directory: false
"#,
        )
        .unwrap();
        let targets = DiscoverTargetConfig::parse_list(&docs[0]).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].name, "_http._tcp.example.net");
        assert_eq!(targets[0].interval, Duration::from_secs(60));
        assert_eq!(targets[1].name, "_sip._udp.example.net");
        assert_eq!(targets[1].interval, DEFAULT_POLL_INTERVAL);
        assert!(targets[1].directory);
        assert!(!targets[2].directory);
    }

    #[test]
    fn parse_invalid() {
        let docs = YamlLoader::load_from_str("interval: 10s\n").unwrap();
        assert!(DiscoverTargetConfig::parse_yaml(&docs[0]).is_err());

        let docs = YamlLoader::load_from_str("name: _a._tcp.example.net\ninterval: 0\n").unwrap();
        assert!(DiscoverTargetConfig::parse_yaml(&docs[0]).is_err());

        let docs =
            YamlLoader::load_from_str("- _a._tcp.example.net\n- _a._tcp.example.net.\n").unwrap();
        assert!(DiscoverTargetConfig::parse_list(&docs[0]).is_err());
    }
}

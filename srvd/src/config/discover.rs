/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

const DEFAULT_LOOP_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_SUBMIT_INTERVAL: Duration = Duration::from_millis(1);

/// Sleep policy of the discovery loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoverLoopConfig {
    /// Longest sleep between two cycles.
    pub interval: Duration,
    /// Sleep while some query is still pending.
    pub retry_interval: Duration,
    /// Sleep right after a query has been submitted.
    pub submit_interval: Duration,
}

impl Default for DiscoverLoopConfig {
    fn default() -> Self {
        DiscoverLoopConfig {
            interval: DEFAULT_LOOP_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            submit_interval: DEFAULT_SUBMIT_INTERVAL,
        }
    }
}

impl DiscoverLoopConfig {
    pub fn with_interval(interval: Duration) -> Self {
        DiscoverLoopConfig {
            interval,
            ..Default::default()
        }
    }

    pub(crate) fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let mut config = DiscoverLoopConfig::default();
        match v {
            Yaml::Hash(map) => {
                srvd_yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            }
            Yaml::String(_) | Yaml::Integer(_) | Yaml::Real(_) => {
                config.interval = srvd_yaml::humanize::as_duration(v)
                    .context("invalid discover loop interval")?;
            }
            _ => {
                return Err(anyhow!(
                    "yaml value type for discover config should be 'map' or 'duration'"
                ));
            }
        }
        config.check()?;
        Ok(config)
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match srvd_yaml::key::normalize(k).as_str() {
            "interval" => {
                self.interval = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "retry_interval" => {
                self.retry_interval = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "submit_interval" => {
                self.submit_interval = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            return Err(anyhow!("discover loop interval should not be zero"));
        }
        if self.retry_interval.is_zero() || self.submit_interval.is_zero() {
            return Err(anyhow!("retry / submit interval should not be zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    #[test]
    fn parse_map() {
        let docs =
            YamlLoader::load_from_str("interval: 2s\nretry-interval: 20ms\nsubmit_interval: 2ms\n")
                .unwrap();
        let config = DiscoverLoopConfig::parse_yaml(&docs[0]).unwrap();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.retry_interval, Duration::from_millis(20));
        assert_eq!(config.submit_interval, Duration::from_millis(2));
    }

    #[test]
    fn parse_plain_interval() {
        let config = DiscoverLoopConfig::parse_yaml(&Yaml::Integer(10)).unwrap();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.retry_interval, DEFAULT_RETRY_INTERVAL);
    }

    #[test]
    fn parse_invalid() {
        assert!(DiscoverLoopConfig::parse_yaml(&Yaml::Integer(0)).is_err());

        let docs = YamlLoader::load_from_str("interval: 1s\nbackoff: 1s\n").unwrap();
        assert!(DiscoverLoopConfig::parse_yaml(&docs[0]).is_err());

        assert!(DiscoverLoopConfig::parse_yaml(&Yaml::Boolean(true)).is_err());
    }
}

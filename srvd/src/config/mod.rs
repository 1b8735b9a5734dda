/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use srvd_resolver::SrvResolverConfig;

mod discover;
pub use discover::DiscoverLoopConfig;

mod target;
pub use target::DiscoverTargetConfig;

#[derive(Debug, Default)]
pub struct DaemonConfig {
    resolver: Option<SrvResolverConfig>,
    pub discover: DiscoverLoopConfig,
    pub targets: Vec<DiscoverTargetConfig>,
}

impl DaemonConfig {
    pub fn resolver(&self) -> Option<&SrvResolverConfig> {
        self.resolver.as_ref()
    }

    fn load_doc(&mut self, map: &yaml::Hash) -> anyhow::Result<()> {
        srvd_yaml::foreach_kv(map, |k, v| match srvd_yaml::key::normalize(k).as_str() {
            "resolver" => {
                if self.resolver.is_some() {
                    return Err(anyhow!("resolver has already been set"));
                }
                let config =
                    SrvResolverConfig::parse_yaml(v).context("invalid resolver config")?;
                self.resolver = Some(config);
                Ok(())
            }
            "discover" => {
                self.discover =
                    DiscoverLoopConfig::parse_yaml(v).context("invalid discover config")?;
                Ok(())
            }
            "target" | "targets" => {
                let targets =
                    DiscoverTargetConfig::parse_list(v).context("invalid target config")?;
                for t in targets {
                    if self.targets.iter().any(|o| o.name == t.name) {
                        return Err(anyhow!("duplicate discover target {}", t.name));
                    }
                    self.targets.push(t);
                }
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k} in main conf")),
        })
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.resolver.is_none() {
            return Err(anyhow!("no resolver config found"));
        }
        if self.targets.is_empty() {
            return Err(anyhow!("no discover target found"));
        }
        Ok(())
    }

    #[cfg(test)]
    fn load_str(content: &str) -> anyhow::Result<Self> {
        let mut config = DaemonConfig::default();
        for doc in srvd_yaml::load_doc_str(content)? {
            match doc {
                Yaml::Hash(map) => config.load_doc(&map)?,
                _ => return Err(anyhow!("yaml doc root should be hash")),
            }
        }
        config.check()?;
        Ok(config)
    }
}

/// Load the main config file.
///
/// Multiple docs in the file are merged as if they were one.
pub fn load(path: &Path) -> anyhow::Result<DaemonConfig> {
    let mut config = DaemonConfig::default();
    srvd_yaml::foreach_doc(path, |_, doc| match doc {
        Yaml::Hash(map) => config.load_doc(map),
        _ => Err(anyhow!("yaml doc root should be hash")),
    })?;
    config
        .check()
        .context(format!("invalid config file {}", path.display()))?;
    Ok(config)
}

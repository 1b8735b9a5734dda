/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::SrvResolverConfig;

impl SrvResolverConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for resolver config should be 'map'"));
        };

        let mut config = SrvResolverConfig::default();
        srvd_yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
        config.check()?;
        Ok(config)
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match srvd_yaml::key::normalize(k).as_str() {
            "name" => {
                self.name = srvd_yaml::value::as_string(v)?;
                Ok(())
            }
            "thread_name" => {
                self.runtime.thread_name = srvd_yaml::value::as_string(v)?;
                Ok(())
            }
            "protective_query_timeout" => {
                self.runtime.protective_query_timeout = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            _ => self.driver.set_by_yaml_kv(k, v),
        }
    }
}

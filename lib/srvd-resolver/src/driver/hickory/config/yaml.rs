/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::HickoryDriverConfig;

impl HickoryDriverConfig {
    pub fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match srvd_yaml::key::normalize(k).as_str() {
            "server" | "servers" => {
                let servers = match v {
                    Yaml::String(s) => s
                        .split_whitespace()
                        .map(|s| {
                            std::net::IpAddr::from_str(s)
                                .map_err(|e| anyhow!("invalid ip address {s}: {e}"))
                        })
                        .collect::<anyhow::Result<Vec<_>>>()?,
                    Yaml::Array(_) => srvd_yaml::value::as_list(v, srvd_yaml::value::as_ipaddr)?,
                    _ => return Err(anyhow!("invalid yaml value type, expect string / array")),
                };
                self.servers = servers;
                Ok(())
            }
            "server_port" => {
                self.server_port = Some(srvd_yaml::value::as_u16(v)?);
                Ok(())
            }
            "bind_ip" => {
                self.bind_ip = Some(srvd_yaml::value::as_ipaddr(v)?);
                Ok(())
            }
            "connect_timeout" => {
                self.connect_timeout = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "request_timeout" | "each_timeout" => {
                self.request_timeout = srvd_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "each_tries" | "retry_attempts" => {
                self.each_tries = srvd_yaml::value::as_usize(v)?;
                Ok(())
            }
            "want_ipv4" => {
                self.want_ipv4 = srvd_yaml::value::as_bool(v)?;
                Ok(())
            }
            "want_ipv6" => {
                self.want_ipv6 = srvd_yaml::value::as_bool(v)?;
                Ok(())
            }
            "cname_loose" => {
                self.cname_loose = srvd_yaml::value::as_bool(v)?;
                Ok(())
            }
            "tcp_fallback" => {
                self.tcp_fallback = srvd_yaml::value::as_bool(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn server_string() {
        let mut config = HickoryDriverConfig::default();
        config
            .set_by_yaml_kv("server", &Yaml::String("10.0.0.53 10.0.1.53".to_string()))
            .unwrap();
        assert_eq!(config.get_servers().len(), 2);

        assert!(
            config
                .set_by_yaml_kv("server", &Yaml::String("not-an-ip".to_string()))
                .is_err()
        );
    }

    #[test]
    fn timeouts_and_flags() {
        let mut config = HickoryDriverConfig::default();
        config
            .set_by_yaml_kv("Each-Timeout", &Yaml::String("2s".to_string()))
            .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(2));

        config
            .set_by_yaml_kv("cname_loose", &Yaml::Boolean(false))
            .unwrap();
        assert!(!config.cname_loose);

        config.set_by_yaml_kv("each_tries", &Yaml::Integer(3)).unwrap();
        assert_eq!(config.each_tries, 3);
    }

    #[test]
    fn check_families() {
        let mut config = HickoryDriverConfig::default();
        config.add_server("127.0.0.1".parse().unwrap());
        config.set_want_ipv4(false);
        config.set_want_ipv6(false);
        assert!(config.check().is_err());
        config.set_want_ipv6(true);
        assert!(config.check().is_ok());
    }
}

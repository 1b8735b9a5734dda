/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_ipaddr(v: &Yaml) -> anyhow::Result<IpAddr> {
    if let Yaml::String(s) = v {
        IpAddr::from_str(s).map_err(|e| anyhow!("invalid ip address {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'IpAddr' should be 'string'"))
    }
}

/// A dns domain name, the trailing dot is optional.
///
/// Only the overall and per label length limits are checked here.
pub fn as_domain(v: &Yaml) -> anyhow::Result<String> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("yaml value type for 'domain' should be 'string'"));
    };
    let domain = s.trim_end_matches('.');
    if domain.is_empty() {
        return Err(anyhow!("empty domain name"));
    }
    if domain.len() > 253 {
        return Err(anyhow!("domain name {s} is too long"));
    }
    if let Some(label) = domain.split('.').find(|l| l.is_empty() || l.len() > 63) {
        return Err(anyhow!("invalid label '{label}' in domain name {s}"));
    }
    Ok(domain.to_string())
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use crate::driver::hickory::HickoryDriverConfig;

#[cfg(feature = "yaml")]
mod yaml;

const RESOLVER_PROTECTIVE_QUERY_TIMEOUT: Duration = Duration::from_secs(60);
const RESOLVER_THREAD_NAME: &str = "srvd-resolver";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolverRuntimeConfig {
    /// Upper bound for one whole SRV lookup, address follow-ups included.
    pub protective_query_timeout: Duration,
    pub thread_name: String,
}

impl Default for ResolverRuntimeConfig {
    fn default() -> Self {
        ResolverRuntimeConfig {
            protective_query_timeout: RESOLVER_PROTECTIVE_QUERY_TIMEOUT,
            thread_name: RESOLVER_THREAD_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SrvResolverConfig {
    pub name: String,
    pub driver: HickoryDriverConfig,
    pub runtime: ResolverRuntimeConfig,
}

impl SrvResolverConfig {
    pub fn check(&mut self) -> anyhow::Result<()> {
        self.driver.check()
    }
}

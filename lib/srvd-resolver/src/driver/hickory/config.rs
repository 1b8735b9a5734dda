/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use super::HickoryDriver;
use crate::driver::BoxSrvResolveDriver;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HickoryDriverConfig {
    connect_timeout: Duration,
    request_timeout: Duration,
    each_tries: usize,
    servers: Vec<IpAddr>,
    server_port: Option<u16>,
    bind_ip: Option<IpAddr>,
    want_ipv4: bool,
    want_ipv6: bool,
    cname_loose: bool,
    tcp_fallback: bool,
}

impl Default for HickoryDriverConfig {
    fn default() -> Self {
        HickoryDriverConfig {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            each_tries: 2,
            servers: Vec::new(),
            server_port: None,
            bind_ip: None,
            want_ipv4: true,
            want_ipv6: true,
            cname_loose: true,
            tcp_fallback: true,
        }
    }
}

impl HickoryDriverConfig {
    pub fn check(&mut self) -> anyhow::Result<()> {
        if self.servers.is_empty() {
            return Err(anyhow!("no dns server set"));
        }
        if !self.want_ipv4 && !self.want_ipv6 {
            return Err(anyhow!("at least one of ipv4 and ipv6 should be wanted"));
        }
        if self.each_tries == 0 {
            self.each_tries = 1;
        }
        Ok(())
    }

    pub fn add_server(&mut self, ip: IpAddr) {
        self.servers.push(ip);
    }

    #[inline]
    pub fn get_servers(&self) -> Vec<IpAddr> {
        self.servers.clone()
    }

    pub fn set_server_port(&mut self, port: u16) {
        self.server_port = Some(port);
    }

    #[inline]
    pub fn get_server_port(&self) -> Option<u16> {
        self.server_port
    }

    pub fn set_bind_ip(&mut self, ip: IpAddr) {
        self.bind_ip = Some(ip);
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    pub fn set_each_tries(&mut self, tries: usize) {
        self.each_tries = tries;
    }

    pub fn set_want_ipv4(&mut self, want: bool) {
        self.want_ipv4 = want;
    }

    #[inline]
    pub fn want_ipv4(&self) -> bool {
        self.want_ipv4
    }

    pub fn set_want_ipv6(&mut self, want: bool) {
        self.want_ipv6 = want;
    }

    #[inline]
    pub fn want_ipv6(&self) -> bool {
        self.want_ipv6
    }

    pub fn set_cname_loose(&mut self, loose: bool) {
        self.cname_loose = loose;
    }

    pub fn set_tcp_fallback(&mut self, enable: bool) {
        self.tcp_fallback = enable;
    }

    pub(crate) fn spawn_resolver_driver(&self) -> BoxSrvResolveDriver {
        let port = self.server_port.unwrap_or(DEFAULT_DNS_PORT);
        let servers = self
            .servers
            .iter()
            .map(|ip| SocketAddr::new(*ip, port))
            .collect();
        let driver = HickoryDriver {
            servers: Arc::new(servers),
            bind: self.bind_ip.map(|ip| SocketAddr::new(ip, 0)),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            each_tries: self.each_tries,
            want_ipv4: self.want_ipv4,
            want_ipv6: self.want_ipv6,
            cname_loose: self.cname_loose,
            tcp_fallback: self.tcp_fallback,
        };
        Box::new(driver)
    }
}

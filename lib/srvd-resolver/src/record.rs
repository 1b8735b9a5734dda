/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use crate::ResolveError;

/// One SRV resource record together with the addresses of its target host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    /// Target host name, without the trailing root dot.
    pub target: String,
    pub addrs: Vec<IpAddr>,
}

impl SrvRecord {
    pub fn new(priority: u16, weight: u16, port: u16, target: &str) -> Self {
        SrvRecord {
            priority,
            weight,
            port,
            target: target.trim_end_matches('.').to_string(),
            addrs: Vec::new(),
        }
    }

    pub fn with_addr(mut self, ip: IpAddr) -> Self {
        self.addrs.push(ip);
        self
    }

    #[inline]
    pub fn first_addr(&self) -> Option<IpAddr> {
        self.addrs.first().copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvAnswer {
    pub name: Arc<str>,
    pub records: Vec<SrvRecord>,
}

impl SrvAnswer {
    pub fn new(name: Arc<str>, records: Vec<SrvRecord>) -> Self {
        SrvAnswer { name, records }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub type SrvAnswerResult = Result<SrvAnswer, ResolveError>;

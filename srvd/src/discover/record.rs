/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::SocketAddr;

use log::debug;

use srvd_resolver::{SrvAnswer, SrvRecord};

use super::DiscoverError;

/// Storage grows by this many entries at a time.
pub const SRV_EXPAND_CHUNK: usize = 16;
pub const SRV_NAME_MAX_LEN: usize = 63;

/// One resolved SRV endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvEntry {
    /// First label of the target host, informational only.
    pub name: String,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub addr: SocketAddr,
}

fn short_name(host: &str) -> String {
    let label = host.split('.').next().unwrap_or_default();
    if label.len() <= SRV_NAME_MAX_LEN {
        return label.to_string();
    }
    let mut end = SRV_NAME_MAX_LEN;
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    label[..end].to_string()
}

impl SrvEntry {
    /// Build an entry from a resolved record, using its first address.
    ///
    /// Records without any address are not usable.
    pub fn from_record(record: &SrvRecord) -> Option<Self> {
        let ip = record.first_addr()?;
        Some(SrvEntry {
            name: short_name(&record.target),
            priority: record.priority,
            weight: record.weight,
            port: record.port,
            addr: SocketAddr::new(ip, record.port),
        })
    }

    /// An entry with port 0 holds no usable endpoint.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.port > 0
    }

    /// Match on priority, weight, port and first address. The name is ignored.
    pub fn matches_record(&self, record: &SrvRecord) -> bool {
        self.priority == record.priority
            && self.weight == record.weight
            && self.port == record.port
            && record.first_addr() == Some(self.addr.ip())
    }

    pub fn same_endpoint(&self, other: &SrvEntry) -> bool {
        self.priority == other.priority
            && self.weight == other.weight
            && self.port == other.port
            && self.addr.ip() == other.addr.ip()
    }
}

impl fmt::Display for SrvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prio {} weight {} {}",
            self.name, self.priority, self.weight, self.addr
        )
    }
}

/// Entries removed and added by one reconciliation, in the order applied.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub removed: Vec<SrvEntry>,
    pub added: Vec<SrvEntry>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// The known SRV entries of one discovery target.
#[derive(Debug, Default)]
pub struct SrvRecordSet {
    entries: Vec<SrvEntry>,
    changes: u64,
}

impl SrvRecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn entries(&self) -> &[SrvEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Total number of removals and additions ever applied.
    #[inline]
    pub fn changes(&self) -> u64 {
        self.changes
    }

    fn reserve_for(&mut self, incoming: usize) -> Result<(), DiscoverError> {
        let need = self.entries.len() + incoming;
        let mut target = self.entries.capacity();
        while target <= need {
            target += SRV_EXPAND_CHUNK;
        }
        if target > self.entries.capacity() {
            self.entries
                .try_reserve_exact(target - self.entries.len())
                .map_err(|_| DiscoverError::Capacity)?;
        }
        Ok(())
    }

    /// Bring the set in line with a fresh answer.
    ///
    /// Active entries not confirmed by the answer are dropped at once, there
    /// is no grace period for an entry missing from a single answer. An empty
    /// answer is treated as a transient failure and leaves the set alone.
    pub fn reconcile(&mut self, answer: &SrvAnswer) -> Result<ReconcileOutcome, DiscoverError> {
        let mut outcome = ReconcileOutcome::default();
        if answer.is_empty() {
            return Ok(outcome);
        }
        self.reserve_for(answer.records.len())?;

        let records = &answer.records;
        let mut consumed = vec![false; records.len()];

        // a confirmed entry consumes its record so it is not added again
        self.entries.retain(|entry| {
            if !entry.is_active() {
                return true;
            }
            let found = records.iter().enumerate().find(|(i, r)| {
                !consumed[*i] && !r.addrs.is_empty() && entry.matches_record(r)
            });
            match found {
                Some((i, _)) => {
                    consumed[i] = true;
                    true
                }
                None => {
                    outcome.removed.push(entry.clone());
                    false
                }
            }
        });
        self.changes += outcome.removed.len() as u64;

        for (record, _) in records.iter().zip(consumed).filter(|(_, c)| !c) {
            let Some(entry) = SrvEntry::from_record(record) else {
                debug!(
                    "srv {}: no address for target {}",
                    answer.name, record.target
                );
                continue;
            };
            if !entry.is_active() {
                debug!("srv {}: skip target {} with port 0", answer.name, record.target);
                continue;
            }
            if self.entries.iter().any(|e| e.same_endpoint(&entry)) {
                continue;
            }
            self.entries.push(entry.clone());
            outcome.added.push(entry);
            self.changes += 1;
        }

        if !self.entries.is_empty() {
            debug!(
                "srv {}: {} entries, {} changes",
                answer.name,
                self.entries.len(),
                self.changes
            );
            for (i, entry) in self.entries.iter().enumerate() {
                debug!("srv {}: #{} {entry}", answer.name, i + 1);
            }
        }
        Ok(outcome)
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, RwLock};
use std::time::Duration;

use thiserror::Error;

use srvd_types::collection::WeightedDirectory;

use crate::backend::SrvBackend;

mod record;
pub use record::{ReconcileOutcome, SRV_EXPAND_CHUNK, SRV_NAME_MAX_LEN, SrvEntry, SrvRecordSet};

mod target;
use target::DiscoverTarget;

mod runner;
pub use runner::MAX_QUERY_NAME_LEN;

mod controller;
pub use controller::DiscoverController;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoverError {
    #[error("empty service name")]
    EmptyName,
    #[error("service {0} has already been registered")]
    DuplicateTarget(String),
    #[error("out of memory while growing the record set")]
    Capacity,
}

/// The discovery targets shared by the loop thread and its observers.
///
/// The loop takes the write lock for a whole cycle. Directory readers never
/// touch this lock.
pub struct DiscoverModule<Q> {
    targets: RwLock<Vec<DiscoverTarget<Q>>>,
}

impl<Q> Default for DiscoverModule<Q> {
    fn default() -> Self {
        DiscoverModule {
            targets: RwLock::new(Vec::new()),
        }
    }
}

impl<Q> DiscoverModule<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service to be polled every `poll_interval`, starting at
    /// the next loop cycle.
    ///
    /// Discovered endpoints are mirrored into `directory` if one is given.
    pub fn register_target(
        &self,
        service_name: &str,
        poll_interval: Duration,
        directory: Option<Arc<WeightedDirectory<SrvBackend>>>,
    ) -> Result<(), DiscoverError> {
        if service_name.is_empty() {
            return Err(DiscoverError::EmptyName);
        }
        let mut targets = self.targets.write().unwrap();
        if targets.iter().any(|t| t.service_name == service_name) {
            return Err(DiscoverError::DuplicateTarget(service_name.to_string()));
        }
        targets.push(DiscoverTarget::new(
            service_name.to_string(),
            poll_interval,
            directory,
        ));
        Ok(())
    }

    pub fn target_names(&self) -> Vec<String> {
        let targets = self.targets.read().unwrap();
        targets.iter().map(|t| t.service_name.clone()).collect()
    }

    pub fn target_entries(&self, service_name: &str) -> Option<Vec<SrvEntry>> {
        let targets = self.targets.read().unwrap();
        targets
            .iter()
            .find(|t| t.service_name == service_name)
            .map(|t| t.record_set.entries().to_vec())
    }

    pub fn target_changes(&self, service_name: &str) -> Option<u64> {
        let targets = self.targets.read().unwrap();
        targets
            .iter()
            .find(|t| t.service_name == service_name)
            .map(|t| t.record_set.changes())
    }
}

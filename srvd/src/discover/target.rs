/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use srvd_resolver::SrvAnswerResult;
use srvd_types::collection::WeightedDirectory;

use super::{ReconcileOutcome, SrvRecordSet};
use crate::backend::SrvBackend;

pub(crate) struct DiscoverTarget<Q> {
    pub(crate) service_name: String,
    pub(crate) record_set: SrvRecordSet,
    pub(crate) next_poll: Instant,
    pub(crate) poll_interval: Duration,
    pub(crate) pending: Option<Q>,
    directory: Option<Arc<WeightedDirectory<SrvBackend>>>,
    backends: Vec<Arc<SrvBackend>>,
}

impl<Q> DiscoverTarget<Q> {
    pub(crate) fn new(
        service_name: String,
        poll_interval: Duration,
        directory: Option<Arc<WeightedDirectory<SrvBackend>>>,
    ) -> Self {
        DiscoverTarget {
            service_name,
            record_set: SrvRecordSet::new(),
            next_poll: Instant::now(),
            poll_interval,
            pending: None,
            directory,
            backends: Vec::new(),
        }
    }

    pub(crate) fn handle_answer(&mut self, result: SrvAnswerResult) {
        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                if e.is_negative_answer() {
                    debug!("srv {}: {e}", self.service_name);
                } else {
                    info!(
                        "srv {}: resolve failed: {e} ({})",
                        self.service_name,
                        e.get_subtype()
                    );
                }
                return;
            }
        };
        if answer.is_empty() {
            debug!("srv {}: empty answer", self.service_name);
            return;
        }

        match self.record_set.reconcile(&answer) {
            Ok(outcome) => self.apply_to_directory(outcome),
            Err(e) => warn!(
                "srv {}: reconcile skipped: {e}, will retry later",
                self.service_name
            ),
        }
    }

    fn apply_to_directory(&mut self, outcome: ReconcileOutcome) {
        let Some(directory) = &self.directory else {
            return;
        };

        let mut removed = Vec::with_capacity(outcome.removed.len());
        for entry in &outcome.removed {
            let Some(pos) = self
                .backends
                .iter()
                .position(|b| b.entry().same_endpoint(entry))
            else {
                continue;
            };
            removed.push(self.backends.remove(pos));
        }

        let added: Vec<Arc<SrvBackend>> = outcome
            .added
            .into_iter()
            .map(|entry| Arc::new(SrvBackend::new(entry)))
            .collect();
        let batch = added
            .iter()
            .map(|b| (Arc::clone(b), b.directory_weight()))
            .collect();

        match directory.update(&removed, batch) {
            Ok(_) => {
                for backend in &removed {
                    debug!("srv {}: removed backend {}", self.service_name, backend.entry());
                }
                for backend in &added {
                    debug!("srv {}: added backend {}", self.service_name, backend.entry());
                }
                self.backends.extend(added);
            }
            Err(e) => {
                warn!(
                    "srv {}: failed to add {} backends: {e}",
                    self.service_name,
                    added.len()
                );
                if directory.update(&removed, Vec::new()).is_ok() {
                    for backend in &removed {
                        debug!("srv {}: removed backend {}", self.service_name, backend.entry());
                    }
                }
            }
        }
    }
}

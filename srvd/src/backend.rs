/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use srvd_types::collection::DirectoryBackend;

use crate::discover::SrvEntry;

/// A directory backend created from a discovered SRV entry.
pub struct SrvBackend {
    entry: SrvEntry,
    healthy: AtomicBool,
}

impl SrvBackend {
    pub fn new(entry: SrvEntry) -> Self {
        SrvBackend {
            entry,
            healthy: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.entry.addr
    }

    #[inline]
    pub fn entry(&self) -> &SrvEntry {
        &self.entry
    }

    /// Weight used in the directory. SRV weight 0 means "lowest", not
    /// "never", so it is raised to 1.
    pub fn directory_weight(&self) -> f64 {
        f64::from(self.entry.weight.max(1))
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

impl DirectoryBackend for SrvBackend {
    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

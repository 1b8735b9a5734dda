/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::warn;

use srvd_resolver::SrvResolve;

use super::DiscoverModule;
use super::runner::{DiscoverRunner, LoopShared};
use crate::config::DiscoverLoopConfig;

const DISCOVER_THREAD_NAME: &str = "srvd-discover";

/// Owner of the discovery loop thread.
pub struct DiscoverController {
    shared: Arc<LoopShared>,
    thread_handle: Option<JoinHandle<()>>,
}

impl DiscoverController {
    pub fn start<R>(
        module: Arc<DiscoverModule<R::Query>>,
        resolver: R,
        config: DiscoverLoopConfig,
    ) -> io::Result<Self>
    where
        R: SrvResolve + 'static,
        R::Query: 'static,
    {
        let shared = Arc::new(LoopShared::new());
        let runner = DiscoverRunner::new(module, resolver, Arc::clone(&shared), config);
        let thread_handle = std::thread::Builder::new()
            .name(DISCOVER_THREAD_NAME.to_string())
            .spawn(move || runner.run())?;
        Ok(DiscoverController {
            shared,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().unwrap().generation != 0
    }

    /// Wake the loop for an extra cycle.
    ///
    /// With `shutdown` set this returns only after the loop thread has
    /// exited. Waking a stopped loop does nothing.
    pub fn wake(&mut self, shutdown: bool) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.generation == 0 {
                return;
            }
            state.generation += 1;
            if shutdown {
                state.shutdown = true;
            }
            self.shared.cond.notify_all();
        }

        if shutdown {
            self.join();
        }
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let thread_id = handle.thread().id();
            if let Err(e) = handle.join() {
                warn!("error while waiting discover thread {thread_id:?}: {e:?}");
            }
        }
    }
}

impl Drop for DiscoverController {
    fn drop(&mut self) {
        self.wake(true);
        // the loop may have already exited without a join
        self.join();
        if self.is_running() {
            warn!("discover loop thread did not exit cleanly");
        }
    }
}

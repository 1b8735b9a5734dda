/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use srvd_resolver::{SrvQueryPoll, SrvResolve};

use super::DiscoverModule;
use crate::config::DiscoverLoopConfig;

/// Longest query name we will submit, root dot included.
pub const MAX_QUERY_NAME_LEN: usize = 255;

pub(super) struct LoopState {
    /// 0 once the loop thread has exited.
    pub(super) generation: u64,
    pub(super) shutdown: bool,
}

pub(super) struct LoopShared {
    pub(super) state: Mutex<LoopState>,
    pub(super) cond: Condvar,
}

impl LoopShared {
    pub(super) fn new() -> Self {
        LoopShared {
            state: Mutex::new(LoopState {
                generation: 1,
                shutdown: false,
            }),
            cond: Condvar::new(),
        }
    }
}

fn fill_query_name(buf: &mut String, service_name: &str) -> bool {
    buf.clear();
    buf.push_str(service_name);
    if !buf.ends_with('.') {
        buf.push('.');
    }
    buf.len() <= MAX_QUERY_NAME_LEN
}

pub(super) struct DiscoverRunner<R: SrvResolve> {
    module: Arc<DiscoverModule<R::Query>>,
    resolver: R,
    shared: Arc<LoopShared>,
    config: DiscoverLoopConfig,
    name_buf: String,
}

impl<R: SrvResolve> DiscoverRunner<R> {
    pub(super) fn new(
        module: Arc<DiscoverModule<R::Query>>,
        resolver: R,
        shared: Arc<LoopShared>,
        config: DiscoverLoopConfig,
    ) -> Self {
        DiscoverRunner {
            module,
            resolver,
            shared,
            config,
            name_buf: String::with_capacity(MAX_QUERY_NAME_LEN + 1),
        }
    }

    /// Walk all targets once and return how long we may sleep.
    fn run_cycle(&mut self, now: Instant) -> Duration {
        let mut sleep = self.config.interval;

        let mut targets = self.module.targets.write().unwrap();
        for target in targets.iter_mut() {
            if let Some(query) = target.pending.as_mut() {
                match self.resolver.poll(query) {
                    SrvQueryPoll::Pending | SrvQueryPoll::Busy => {
                        sleep = sleep.min(self.config.retry_interval);
                    }
                    SrvQueryPoll::Ready(r) => {
                        target.pending = None;
                        target.handle_answer(r);
                        target.next_poll = now + target.poll_interval;
                        sleep = sleep.min(target.poll_interval);
                    }
                }
                continue;
            }

            if target.next_poll > now {
                sleep = sleep.min(target.next_poll - now);
                continue;
            }
            target.next_poll = now + target.poll_interval;

            if !fill_query_name(&mut self.name_buf, &target.service_name) {
                warn!(
                    "srv {}: query name longer than {MAX_QUERY_NAME_LEN} bytes, skipped",
                    target.service_name
                );
                continue;
            }
            match self.resolver.submit(&self.name_buf) {
                Ok(query) => {
                    target.pending = Some(query);
                    sleep = sleep.min(self.config.submit_interval);
                    debug!("request for srv {} sent", self.name_buf);
                }
                Err(e) => {
                    warn!("failed to submit srv query for {}: {e}", self.name_buf);
                    sleep = sleep.min(target.poll_interval);
                }
            }
        }
        sleep
    }

    pub(super) fn run(mut self) {
        let mut generation = 0;
        loop {
            let sleep = self.run_cycle(Instant::now());
            self.resolver.process_pending();

            let mut state = self.shared.state.lock().unwrap();
            if generation == state.generation && !state.shutdown {
                trace!("discover loop sleep {sleep:?}");
                state = self.shared.cond.wait_timeout(state, sleep).unwrap().0;
            }
            generation = state.generation;
            if state.shutdown {
                break;
            }
            drop(state);
            self.resolver.process_pending();
        }

        debug!("discover loop shutdown");
        self.resolver.teardown();
        let mut state = self.shared.state.lock().unwrap();
        state.generation = 0;
        self.shared.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_name() {
        let mut buf = String::new();
        assert!(fill_query_name(&mut buf, "_http._tcp.example.net"));
        assert_eq!(buf, "_http._tcp.example.net.");

        assert!(fill_query_name(&mut buf, "_sip._udp.example.org."));
        assert_eq!(buf, "_sip._udp.example.org.");

        let long = "a".repeat(MAX_QUERY_NAME_LEN);
        assert!(!fill_query_name(&mut buf, &long));
        let fit = "a".repeat(MAX_QUERY_NAME_LEN - 1);
        assert!(fill_query_name(&mut buf, &fit));
    }
}

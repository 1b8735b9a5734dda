/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use srvd_resolver::{
    ResolveError, ResolveServerError, SrvAnswer, SrvAnswerResult, SrvQueryPoll, SrvRecord,
    SrvResolve,
};
use srvd_types::collection::{DirectoryBackend, WeightedDirectory};

use srvd::backend::SrvBackend;
use srvd::config::DiscoverLoopConfig;
use srvd::discover::{DiscoverController, DiscoverModule};

const SERVICE: &str = "_http._tcp.example.net";

#[derive(Default)]
struct Script {
    answers: VecDeque<SrvAnswerResult>,
    submitted: Vec<String>,
    processed: usize,
    torn_down: bool,
}

struct ScriptedResolver {
    script: Arc<Mutex<Script>>,
}

struct ScriptedQuery;

impl SrvResolve for ScriptedResolver {
    type Query = ScriptedQuery;

    fn submit(&mut self, name: &str) -> Result<ScriptedQuery, ResolveError> {
        self.script.lock().unwrap().submitted.push(name.to_string());
        Ok(ScriptedQuery)
    }

    fn poll(&mut self, _query: &mut ScriptedQuery) -> SrvQueryPoll {
        match self.script.lock().unwrap().answers.pop_front() {
            Some(r) => SrvQueryPoll::Ready(r),
            None => SrvQueryPoll::Pending,
        }
    }

    fn process_pending(&mut self) {
        self.script.lock().unwrap().processed += 1;
    }

    fn teardown(&mut self) {
        self.script.lock().unwrap().torn_down = true;
    }
}

fn record(weight: u16, port: u16, host: &str, last: u8) -> SrvRecord {
    SrvRecord::new(10, weight, port, host).with_addr(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)))
}

fn answer(records: Vec<SrvRecord>) -> SrvAnswerResult {
    Ok(SrvAnswer::new(Arc::from(SERVICE), records))
}

/// `count` records on `port`, one per address.
fn record_batch(count: u8, port: u16) -> Vec<SrvRecord> {
    (0..count)
        .map(|i| record(1, port, &format!("h{i}.example.net"), i))
        .collect()
}

fn fast_loop() -> DiscoverLoopConfig {
    DiscoverLoopConfig {
        interval: Duration::from_secs(1),
        retry_interval: Duration::from_millis(5),
        submit_interval: Duration::from_millis(1),
    }
}

fn wait_until<F: FnMut() -> bool>(mut f: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

struct Fixture {
    service: &'static str,
    script: Arc<Mutex<Script>>,
    module: Arc<DiscoverModule<ScriptedQuery>>,
    directory: Arc<WeightedDirectory<SrvBackend>>,
    controller: DiscoverController,
}

impl Fixture {
    fn start(poll_interval: Duration, loop_config: DiscoverLoopConfig) -> Self {
        Self::start_service(SERVICE, poll_interval, loop_config)
    }

    fn start_service(
        service: &'static str,
        poll_interval: Duration,
        loop_config: DiscoverLoopConfig,
    ) -> Self {
        let script = Arc::new(Mutex::new(Script::default()));
        let module = Arc::new(DiscoverModule::new());
        let directory = Arc::new(WeightedDirectory::new());
        module
            .register_target(service, poll_interval, Some(Arc::clone(&directory)))
            .unwrap();
        let resolver = ScriptedResolver {
            script: Arc::clone(&script),
        };
        let controller =
            DiscoverController::start(Arc::clone(&module), resolver, loop_config).unwrap();
        Fixture {
            service,
            script,
            module,
            directory,
            controller,
        }
    }

    fn push(&self, r: SrvAnswerResult) {
        self.script.lock().unwrap().answers.push_back(r);
    }

    /// Wait for all scripted answers to be taken and handled by the loop.
    ///
    /// The loop polls and handles an answer, directory update included,
    /// while holding the module write lock. Taking the read lock once the
    /// queue is empty waits for the last answer to be fully applied.
    fn wait_consumed(&self) {
        assert!(wait_until(|| self.script.lock().unwrap().answers.is_empty()));
        let _ = self.changes();
    }

    fn changes(&self) -> u64 {
        self.module.target_changes(self.service).unwrap()
    }

    fn backend_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .directory
            .snapshot()
            .into_iter()
            .map(|(b, _, _)| b.name().to_string())
            .collect();
        names.sort();
        names
    }
}

#[test]
fn discover_into_directory() {
    let mut f = Fixture::start(Duration::from_millis(20), fast_loop());

    f.push(answer(vec![
        record(10, 8080, "a.example.net", 1),
        record(0, 8080, "b.example.net", 2),
    ]));
    f.wait_consumed();
    assert_eq!(f.changes(), 2);
    assert_eq!(f.directory.len(), 2);
    assert_eq!(f.directory.healthy_count(), 2);
    assert_eq!(f.directory.total_weight(), 11.0);
    assert_eq!(f.backend_names(), vec!["a", "b"]);
    assert!(
        f.script
            .lock()
            .unwrap()
            .submitted
            .iter()
            .all(|n| n == "_http._tcp.example.net.")
    );

    // a is gone, c is new
    f.push(answer(vec![
        record(0, 8080, "b.example.net", 2),
        record(5, 8081, "c.example.net", 3),
    ]));
    f.wait_consumed();
    assert_eq!(f.changes(), 4);
    assert_eq!(f.directory.len(), 2);
    assert_eq!(f.directory.total_weight(), 6.0);
    assert_eq!(f.backend_names(), vec!["b", "c"]);

    let entries = f.module.target_entries(SERVICE).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "b");
    assert_eq!(entries[1].addr, "10.0.0.3:8081".parse().unwrap());

    f.controller.wake(true);
    assert!(!f.controller.is_running());
}

#[test]
fn same_answer_is_no_change() {
    let mut f = Fixture::start(Duration::from_millis(10), fast_loop());

    let records = vec![
        record(3, 443, "a.example.net", 1),
        record(1, 443, "b.example.net", 2),
    ];
    f.push(answer(records.clone()));
    f.wait_consumed();
    let entries = f.module.target_entries(SERVICE).unwrap();
    let backends: Vec<_> = f.directory.snapshot().into_iter().map(|s| s.0).collect();

    f.push(answer(records.clone()));
    f.push(answer(records));
    f.wait_consumed();
    assert_eq!(f.changes(), 2);
    assert_eq!(f.module.target_entries(SERVICE).unwrap(), entries);
    let after: Vec<_> = f.directory.snapshot().into_iter().map(|s| s.0).collect();
    assert_eq!(after.len(), backends.len());
    for (a, b) in after.iter().zip(backends.iter()) {
        assert!(Arc::ptr_eq(a, b));
    }

    f.controller.wake(true);
}

#[test]
fn failed_answers_keep_backends() {
    let mut f = Fixture::start(Duration::from_millis(10), fast_loop());

    f.push(answer(vec![record(1, 80, "a.example.net", 1)]));
    f.wait_consumed();
    assert_eq!(f.directory.len(), 1);

    f.push(Err(ResolveError::from(ResolveServerError::NotFound)));
    f.push(Err(ResolveError::from(ResolveServerError::ServFail)));
    f.push(answer(Vec::new()));
    f.wait_consumed();
    assert_eq!(f.changes(), 1);
    assert_eq!(f.directory.len(), 1);
    assert_eq!(f.backend_names(), vec!["a"]);

    f.controller.wake(true);
}

#[test]
fn shutdown_is_synchronous() {
    let mut f = Fixture::start(Duration::from_secs(60), fast_loop());
    assert!(wait_until(|| !f.script.lock().unwrap().submitted.is_empty()));
    assert!(f.controller.is_running());

    f.controller.wake(true);
    assert!(!f.controller.is_running());
    assert!(f.script.lock().unwrap().torn_down);

    // waking a stopped loop does nothing
    let processed = f.script.lock().unwrap().processed;
    f.controller.wake(false);
    f.controller.wake(true);
    assert!(!f.controller.is_running());
    assert_eq!(f.script.lock().unwrap().processed, processed);
}

#[test]
fn wake_runs_extra_cycle() {
    let loop_config = DiscoverLoopConfig {
        interval: Duration::from_secs(60),
        ..fast_loop()
    };
    let mut f = Fixture::start(Duration::from_secs(60), loop_config);

    f.push(answer(vec![record(1, 80, "a.example.net", 1)]));
    f.wait_consumed();
    // let the loop settle into its long sleep
    std::thread::sleep(Duration::from_millis(100));
    let processed = f.script.lock().unwrap().processed;
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(f.script.lock().unwrap().processed, processed);

    f.controller.wake(false);
    assert!(wait_until(|| f.script.lock().unwrap().processed > processed));
    assert!(f.controller.is_running());
    // the target is not due yet, so nothing new was submitted
    assert_eq!(f.script.lock().unwrap().submitted.len(), 1);

    f.controller.wake(true);
    assert!(!f.controller.is_running());
}

#[test]
fn drop_stops_loop() {
    let f = Fixture::start(Duration::from_secs(60), fast_loop());
    let script = Arc::clone(&f.script);
    assert!(wait_until(|| !script.lock().unwrap().submitted.is_empty()));
    drop(f);
    assert!(script.lock().unwrap().torn_down);
}

#[test]
fn plain_service_end_to_end() {
    let mut f = Fixture::start_service("svc", Duration::from_secs(5), fast_loop());
    assert!(wait_until(|| !f.script.lock().unwrap().submitted.is_empty()));
    assert_eq!(f.script.lock().unwrap().submitted, vec!["svc.".to_string()]);

    f.push(answer(vec![
        record(5, 8080, "a.svc", 1),
        record(5, 8080, "b.svc", 2),
    ]));
    f.wait_consumed();
    assert_eq!(f.changes(), 2);
    assert_eq!(f.directory.len(), 2);
    assert_eq!(f.directory.total_weight(), 10.0);

    let first = f.directory.pick_by_weight(None, 0.0).unwrap();
    let last = f.directory.pick_by_weight(None, 9.9).unwrap();
    assert!(first.is_healthy());
    assert!(last.is_healthy());
    assert_eq!(first.addr(), "10.0.0.1:8080".parse().unwrap());
    assert_eq!(last.addr(), "10.0.0.2:8080".parse().unwrap());

    f.controller.wake(true);
    assert!(!f.controller.is_running());
}

#[test]
fn readers_never_see_partial_update() {
    const COUNT: u8 = 200;

    let mut f = Fixture::start(Duration::from_millis(10), fast_loop());
    f.push(answer(record_batch(COUNT, 8000)));
    f.wait_consumed();
    assert_eq!(f.directory.len(), COUNT as usize);

    let stop = Arc::new(AtomicBool::new(false));
    let reader = {
        let directory = Arc::clone(&f.directory);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut partial = Vec::new();
            while !stop.load(Ordering::Relaxed) {
                let len = directory.len();
                if len != COUNT as usize {
                    partial.push(len);
                }
                if directory.pick_by_weight(None, 0.0).is_none() {
                    partial.push(0);
                }
            }
            partial
        })
    };

    // every answer swaps the whole set for a disjoint one
    for round in 0..10 {
        let port = if round % 2 == 0 { 9000 } else { 8000 };
        f.push(answer(record_batch(COUNT, port)));
        f.wait_consumed();
    }
    stop.store(true, Ordering::Relaxed);
    assert_eq!(reader.join().unwrap(), Vec::<usize>::new());
    assert_eq!(f.directory.len(), COUNT as usize);
    // first fill, then ten full swaps
    assert_eq!(f.changes(), COUNT as u64 * (1 + 2 * 10));

    f.controller.wake(true);
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Sender, TrySendError};
use slog::{Drain, OwnedKVList, Record};

use crate::StdLogValue;
use crate::format::StdLogFormatter;

#[derive(Default)]
pub struct LogDropStats {
    format_failed: AtomicU64,
    channel_closed: AtomicU64,
    channel_overflow: AtomicU64,
}

impl LogDropStats {
    pub fn format_failed(&self) -> u64 {
        self.format_failed.load(Ordering::Relaxed)
    }

    pub fn channel_closed(&self) -> u64 {
        self.channel_closed.load(Ordering::Relaxed)
    }

    pub fn channel_overflow(&self) -> u64 {
        self.channel_overflow.load(Ordering::Relaxed)
    }
}

pub struct AsyncLogger {
    sender: Sender<StdLogValue>,
    formatter: StdLogFormatter,
    stats: Arc<LogDropStats>,
}

impl AsyncLogger {
    pub(crate) fn new(
        sender: Sender<StdLogValue>,
        formatter: StdLogFormatter,
        stats: Arc<LogDropStats>,
    ) -> Self {
        AsyncLogger {
            sender,
            formatter,
            stats,
        }
    }

    pub fn get_stats(&self) -> Arc<LogDropStats> {
        Arc::clone(&self.stats)
    }
}

impl Drain for AsyncLogger {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        match self.formatter.format_slog(record, logger_values) {
            Ok(v) => {
                match self.sender.try_send(v) {
                    Ok(_) => {}
                    Err(TrySendError::Full(_)) => {
                        self.stats.channel_overflow.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        self.stats.channel_closed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.stats.format_failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{Logger, info, o};

    #[test]
    fn overflow_is_counted() {
        let (sender, receiver) = flume::bounded(1);
        let stats = Arc::new(LogDropStats::default());
        let drain = AsyncLogger::new(sender, StdLogFormatter::new(false), Arc::clone(&stats));
        let logger = Logger::root(drain.fuse(), o!("module" => "discover"));

        info!(logger, "first"; "target" => "_sip._udp.example.net");
        info!(logger, "second");
        assert_eq!(stats.channel_overflow(), 1);

        let v = receiver.try_recv().unwrap();
        assert_eq!(v.message, "first");
        assert_eq!(
            v.kv_pairs,
            vec![
                ("target".to_string(), "_sip._udp.example.net".to_string()),
                ("module".to_string(), "discover".to_string()),
            ]
        );
        assert!(v.location.is_none());

        drop(receiver);
        info!(logger, "third");
        assert_eq!(stats.channel_closed(), 1);
        assert_eq!(stats.format_failed(), 0);
    }
}

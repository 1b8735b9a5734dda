/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use slog::{Drain, slog_o};
use slog_scope::GlobalLoggerGuard;

use srvd_stdlog::{AsyncLogConfig, LogDropStats};

use crate::opts::ProcArgs;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

fn log_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

fn total_dropped(stats: &LogDropStats) -> u64 {
    stats.format_failed() + stats.channel_closed() + stats.channel_overflow()
}

/// The installed process logger. Logging stops when this is dropped.
pub struct ProcessLogger {
    _scope_guard: GlobalLoggerGuard,
    drop_stats: Arc<LogDropStats>,
}

impl ProcessLogger {
    /// Number of records lost so far.
    pub fn dropped(&self) -> u64 {
        total_dropped(&self.drop_stats)
    }
}

/// Route the `log` facade into an async stderr drain.
pub fn setup(args: &ProcArgs) -> Result<ProcessLogger, log::SetLoggerError> {
    let async_conf = AsyncLogConfig::with_name(PROCESS_LOG_THREAD_NAME);
    let drain = srvd_stdlog::new_async_logger(&async_conf, true);
    let drop_stats = drain.get_stats();
    let logger = slog::Logger::root(drain.fuse(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);
    slog_stdlog::init_with_level(log_level(args.verbose_level))?;
    Ok(ProcessLogger {
        _scope_guard: scope_guard,
        drop_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_to_level() {
        assert_eq!(log_level(0), log::Level::Warn);
        assert_eq!(log_level(1), log::Level::Info);
        assert_eq!(log_level(2), log::Level::Debug);
        assert_eq!(log_level(3), log::Level::Trace);
        assert_eq!(log_level(u8::MAX), log::Level::Trace);
    }

    #[test]
    fn nothing_dropped() {
        assert_eq!(total_dropped(&LogDropStats::default()), 0);
    }
}

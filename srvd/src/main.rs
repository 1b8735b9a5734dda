/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use log::{debug, info, warn};

use srvd_resolver::SrvResolverBuilder;
use srvd_types::collection::WeightedDirectory;

use srvd::backend::SrvBackend;
use srvd::config::DaemonConfig;
use srvd::discover::{DiscoverController, DiscoverModule};
use srvd::log::ProcessLogger;

type BackendDirectory = Arc<WeightedDirectory<SrvBackend>>;

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        srvd::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // keep the logger until exit, or the async drain is dropped
    let logger = srvd::log::setup(&proc_args).context("failed to setup process logger")?;

    let config = srvd::config::load(&proc_args.config_file)
        .context(format!("failed to load config, opts: {proc_args:?}"))?;
    debug!("loaded config from {}", proc_args.config_file.display());

    if proc_args.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    run(config, &logger)
}

fn run(config: DaemonConfig, logger: &ProcessLogger) -> anyhow::Result<()> {
    let resolver_config = config
        .resolver()
        .ok_or_else(|| anyhow!("no resolver config found"))?
        .clone();

    let module = Arc::new(DiscoverModule::new());
    let mut directories: Vec<(String, BackendDirectory)> = Vec::new();
    for target in &config.targets {
        let directory = if target.directory {
            let d = Arc::new(WeightedDirectory::new());
            directories.push((target.name.clone(), Arc::clone(&d)));
            Some(d)
        } else {
            None
        };
        module
            .register_target(&target.name, target.interval, directory)
            .context(format!("failed to register target {}", target.name))?;
    }

    let resolver = SrvResolverBuilder::new(resolver_config)
        .build()
        .context("failed to start resolver thread")?;
    let mut controller =
        DiscoverController::start(Arc::clone(&module), resolver, config.discover.clone())
            .context("failed to start discover thread")?;
    info!("discovering {} srv targets", config.targets.len());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build main runtime")?;
    let ret = rt.block_on(wait_quit(&directories, logger, config.discover.interval));

    controller.wake(true);
    for (name, directory) in &directories {
        info!(
            "srv {name}: {} backends, {} healthy, total weight {}",
            directory.len(),
            directory.healthy_count(),
            directory.total_weight()
        );
    }
    for name in module.target_names() {
        if let Some(changes) = module.target_changes(&name) {
            debug!("srv {name}: {changes} changes in total");
        }
    }
    ret
}

async fn wait_quit(
    directories: &[(String, BackendDirectory)],
    logger: &ProcessLogger,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut health_interval = tokio::time::interval(interval);
    let mut log_dropped = 0;
    loop {
        tokio::select! {
            r = tokio::signal::ctrl_c() => {
                r.context("failed to listen for the quit signal")?;
                info!("got quit signal");
                return Ok(());
            }
            _ = health_interval.tick() => {
                let dropped = logger.dropped();
                if dropped > log_dropped {
                    warn!("{} log records dropped", dropped - log_dropped);
                    log_dropped = dropped;
                }
                for (name, directory) in directories {
                    let summary = directory.recompute_health();
                    if !summary.changed {
                        continue;
                    }
                    if summary.any_healthy {
                        info!(
                            "srv {name}: {} healthy backends, total weight {}",
                            directory.healthy_count(),
                            directory.total_weight()
                        );
                    } else {
                        warn!("srv {name}: no healthy backend");
                    }
                }
            }
        }
    }
}

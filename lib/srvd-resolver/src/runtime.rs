/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::debug;
use tokio::sync::mpsc;

use crate::config::SrvResolverConfig;
use crate::driver::BoxSrvResolveDriver;
use crate::message::{ResolverCommand, SrvResolveRequest};

pub(crate) struct ResolverRuntime {
    config: SrvResolverConfig,
    driver: BoxSrvResolveDriver,
    req_receiver: mpsc::UnboundedReceiver<SrvResolveRequest>,
    ctl_receiver: mpsc::UnboundedReceiver<ResolverCommand>,
}

impl ResolverRuntime {
    pub(crate) fn new(
        config: SrvResolverConfig,
        req_receiver: mpsc::UnboundedReceiver<SrvResolveRequest>,
        ctl_receiver: mpsc::UnboundedReceiver<ResolverCommand>,
    ) -> Self {
        let driver = config.driver.spawn_resolver_driver();
        ResolverRuntime {
            config,
            driver,
            req_receiver,
            ctl_receiver,
        }
    }

    fn handle_req(&self, req: SrvResolveRequest) {
        if req.sender.is_closed() {
            // the query has been dropped already
            return;
        }
        self.driver
            .query_srv(req.domain, &self.config.runtime, req.sender);
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                cmd = self.ctl_receiver.recv() => {
                    match cmd {
                        Some(ResolverCommand::Quit) | None => break,
                    }
                }
                req = self.req_receiver.recv() => {
                    match req {
                        Some(req) => self.handle_req(req),
                        None => break,
                    }
                }
            }
        }
        debug!("resolver {} runtime quit", self.config.name);
    }
}

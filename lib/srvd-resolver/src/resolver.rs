/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::warn;
use tokio::sync::{mpsc, oneshot};

use crate::config::SrvResolverConfig;
use crate::message::{ResolverCommand, SrvResolveRequest};
use crate::runtime::ResolverRuntime;
use crate::{ResolveError, ResolveLocalError, SrvAnswerResult, SrvQueryPoll, SrvResolve};

pub struct SrvResolverBuilder {
    config: SrvResolverConfig,
}

impl SrvResolverBuilder {
    pub fn new(config: SrvResolverConfig) -> Self {
        SrvResolverBuilder { config }
    }

    pub fn build(self) -> io::Result<SrvResolver> {
        let (req_sender, req_receiver) = mpsc::unbounded_channel();
        let (ctl_sender, ctl_receiver) = mpsc::unbounded_channel();

        let thread_builder =
            std::thread::Builder::new().name(self.config.runtime.thread_name.clone());
        let basic_rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let config = self.config.clone();
        let thread_handle = thread_builder.spawn(move || {
            basic_rt.block_on(async move {
                ResolverRuntime::new(config, req_receiver, ctl_receiver)
                    .run()
                    .await;
            });
        })?;

        Ok(SrvResolver {
            config: self.config,
            thread_handle: Some(thread_handle),
            req_sender,
            ctl_sender,
        })
    }
}

/// A query submitted to [`SrvResolver`].
pub struct SrvQuery {
    receiver: oneshot::Receiver<SrvAnswerResult>,
}

/// SRV resolver running its own event loop on a dedicated thread.
pub struct SrvResolver {
    config: SrvResolverConfig,
    thread_handle: Option<JoinHandle<()>>,
    req_sender: mpsc::UnboundedSender<SrvResolveRequest>,
    ctl_sender: mpsc::UnboundedSender<ResolverCommand>,
}

impl SrvResolver {
    fn stop_and_join(&mut self) {
        if let Some(join) = self.thread_handle.take() {
            let _ = self.ctl_sender.send(ResolverCommand::Quit);
            let thread_id = join.thread().id();
            if let Err(e) = join.join() {
                warn!(
                    "error while waiting thread {thread_id:?} for resolver {}: {e:?}",
                    self.config.name
                );
            }
        }
    }
}

impl SrvResolve for SrvResolver {
    type Query = SrvQuery;

    fn submit(&mut self, name: &str) -> Result<SrvQuery, ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::EmptyDomain);
        }
        if self.thread_handle.is_none() {
            return Err(ResolveLocalError::NoResolverRunning.into());
        }

        let (sender, receiver) = oneshot::channel();
        let req = SrvResolveRequest {
            domain: Arc::from(name),
            sender,
        };
        self.req_sender
            .send(req)
            .map_err(|_| ResolveLocalError::NoResolverRunning)?;
        Ok(SrvQuery { receiver })
    }

    fn poll(&mut self, query: &mut SrvQuery) -> SrvQueryPoll {
        match query.receiver.try_recv() {
            Ok(r) => SrvQueryPoll::Ready(r),
            Err(oneshot::error::TryRecvError::Empty) => SrvQueryPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                SrvQueryPoll::Ready(Err(ResolveLocalError::NoResolverRunning.into()))
            }
        }
    }

    fn teardown(&mut self) {
        self.stop_and_join();
    }
}

impl Drop for SrvResolver {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::{ResolveError, SrvAnswerResult};

/// Outcome of a non-blocking check on a submitted query.
#[derive(Debug)]
pub enum SrvQueryPoll {
    /// The query is still in flight.
    Pending,
    /// The resolver could not look at the query right now, check again later.
    Busy,
    Ready(SrvAnswerResult),
}

/// The SRV resolution capability used by the discovery loop.
///
/// All methods must return without blocking on the network. An
/// implementation is owned and driven by a single thread.
pub trait SrvResolve: Send {
    type Query: Send + Sync;

    /// Start an asynchronous SRV lookup for `name`.
    fn submit(&mut self, name: &str) -> Result<Self::Query, ResolveError>;

    fn poll(&mut self, query: &mut Self::Query) -> SrvQueryPoll;

    /// Give the resolver a chance to advance its internal event processing.
    fn process_pending(&mut self) {}

    /// Release all resources, abandoning in-flight queries.
    fn teardown(&mut self);
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::SrvAnswerResult;
use crate::config::ResolverRuntimeConfig;

pub mod hickory;

pub(crate) trait SrvResolveDriver {
    /// Spawn the lookup on the current runtime and send the result back
    /// through `sender`.
    fn query_srv(
        &self,
        domain: Arc<str>,
        config: &ResolverRuntimeConfig,
        sender: oneshot::Sender<SrvAnswerResult>,
    );
}

pub(crate) type BoxSrvResolveDriver = Box<dyn SrvResolveDriver>;

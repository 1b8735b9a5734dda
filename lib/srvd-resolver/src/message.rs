/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::SrvAnswerResult;

#[derive(Clone, Debug)]
pub(crate) enum ResolverCommand {
    Quit,
}

pub(crate) struct SrvResolveRequest {
    pub(crate) domain: Arc<str>,
    pub(crate) sender: oneshot::Sender<SrvAnswerResult>,
}

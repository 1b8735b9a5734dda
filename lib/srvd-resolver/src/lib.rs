/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{ResolverRuntimeConfig, SrvResolverConfig};

pub mod driver;

mod error;
pub use error::{ResolveDriverError, ResolveError, ResolveLocalError, ResolveServerError};

mod record;
pub use record::{SrvAnswer, SrvAnswerResult, SrvRecord};

mod resolve;
pub use resolve::{SrvQueryPoll, SrvResolve};

mod message;
mod runtime;

mod resolver;
pub use resolver::{SrvQuery, SrvResolver, SrvResolverBuilder};

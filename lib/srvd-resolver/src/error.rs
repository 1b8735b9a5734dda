/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveServerError {
    #[error("server claims query was malformed")]
    FormErr,
    #[error("server returned general failure")]
    ServFail,
    #[error("server claims domain name not found")]
    NotFound,
    #[error("server does not implement requested operation")]
    NotImp,
    #[error("server refused query")]
    Refused,
}

impl ResolveServerError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveServerError::FormErr => "FORMERR",
            ResolveServerError::ServFail => "SERVFAIL",
            ResolveServerError::NotFound => "NXDOMAIN",
            ResolveServerError::NotImp => "NOTIMP",
            ResolveServerError::Refused => "REFUSED",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveDriverError {
    #[error("malformed domain name")]
    BadName,
    #[error("malformed DNS reply")]
    BadResp,
    #[error("no dns server available")]
    NoServer,
    #[error("timeout while contacting server")]
    Timeout,
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResolveDriverError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveDriverError::BadName => "BadName",
            ResolveDriverError::BadResp => "BadResp",
            ResolveDriverError::NoServer => "NoServer",
            ResolveDriverError::Timeout => "Timeout",
            ResolveDriverError::Io(_) => "IoError",
            ResolveDriverError::Internal(_) => "InternalError",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveLocalError {
    #[error("no resolver running")]
    NoResolverRunning,
    #[error("driver timed out")]
    DriverTimedOut,
}

impl ResolveLocalError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveLocalError::NoResolverRunning => "NoResolverRunning",
            ResolveLocalError::DriverTimedOut => "DriverTimedOut",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("empty domain")]
    EmptyDomain,
    #[error("server error: {0}")]
    FromServer(#[from] ResolveServerError),
    #[error("driver error: {0}")]
    FromDriver(#[from] ResolveDriverError),
    #[error("local error: {0}")]
    FromLocal(#[from] ResolveLocalError),
}

impl ResolveError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveError::EmptyDomain => "EmptyDomain",
            ResolveError::FromServer(_) => "ServerError",
            ResolveError::FromDriver(_) => "DriverError",
            ResolveError::FromLocal(_) => "LocalError",
        }
    }

    pub fn get_subtype(&self) -> &str {
        match self {
            ResolveError::EmptyDomain => "",
            ResolveError::FromServer(e) => e.get_type(),
            ResolveError::FromDriver(e) => e.get_type(),
            ResolveError::FromLocal(e) => e.get_type(),
        }
    }

    /// Whether the server told us there is nothing to find, as opposed to a
    /// failure reaching or understanding it.
    pub fn is_negative_answer(&self) -> bool {
        matches!(self, ResolveError::FromServer(ResolveServerError::NotFound))
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod backend;
pub mod build;
pub mod config;
pub mod discover;
pub mod log;
pub mod opts;

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod weighted_directory;
pub use weighted_directory::{DirectoryBackend, DirectoryError, HealthSummary, WeightedDirectory};

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod net;
mod primary;

pub use net::{as_domain, as_ipaddr};
pub use primary::{as_bool, as_list, as_string, as_u16, as_usize};

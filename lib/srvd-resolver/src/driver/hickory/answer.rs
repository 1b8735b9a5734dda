/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

use hickory_proto::op::Message;
use hickory_proto::rr::{Name, RData, Record};

use crate::SrvRecord;

#[derive(Clone, Copy)]
pub(super) struct AddrFamilies {
    pub(super) ipv4: bool,
    pub(super) ipv6: bool,
}

impl AddrFamilies {
    fn accept(&self, rdata: &RData) -> Option<IpAddr> {
        match rdata {
            RData::A(a) if self.ipv4 => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) if self.ipv6 => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        }
    }
}

/// Collect the SRV records of `response` together with their target names.
///
/// With `cname_loose` set the owner name of the SRV record is not compared
/// with the queried name, so answers reached through a CNAME chain are kept.
pub(super) fn collect_srv(
    response: &Message,
    queried: &Name,
    cname_loose: bool,
) -> Vec<(SrvRecord, Name)> {
    response
        .answers()
        .iter()
        .filter(|r| cname_loose || r.name() == queried)
        .filter_map(|r| match r.data() {
            RData::SRV(srv) => {
                let target = srv.target().clone();
                let record = SrvRecord::new(
                    srv.priority(),
                    srv.weight(),
                    srv.port(),
                    &target.to_utf8(),
                );
                Some((record, target))
            }
            _ => None,
        })
        .collect()
}

/// Pick the glue addresses for `target` from a record section.
pub(super) fn glue_addrs(records: &[Record], target: &Name, families: AddrFamilies) -> Vec<IpAddr> {
    records
        .iter()
        .filter(|r| r.name() == target)
        .filter_map(|r| families.accept(r.data()))
        .collect()
}

/// All addresses found in the answer section of an A / AAAA lookup.
///
/// The owner name is not checked as the answer may follow CNAME records.
pub(super) fn answer_addrs(response: &Message, families: AddrFamilies) -> Vec<IpAddr> {
    response
        .answers()
        .iter()
        .filter_map(|r| families.accept(r.data()))
        .collect()
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use log::{debug, trace};
use tokio::sync::oneshot;

use super::answer::{self, AddrFamilies};
use super::io;
use crate::config::ResolverRuntimeConfig;
use crate::driver::SrvResolveDriver;
use crate::{
    ResolveDriverError, ResolveError, ResolveLocalError, SrvAnswer, SrvAnswerResult, SrvRecord,
};

#[derive(Clone)]
pub(crate) struct HickoryDriver {
    pub(super) servers: Arc<Vec<SocketAddr>>,
    pub(super) bind: Option<SocketAddr>,
    pub(super) connect_timeout: Duration,
    pub(super) request_timeout: Duration,
    pub(super) each_tries: usize,
    pub(super) want_ipv4: bool,
    pub(super) want_ipv6: bool,
    pub(super) cname_loose: bool,
    pub(super) tcp_fallback: bool,
}

impl SrvResolveDriver for HickoryDriver {
    fn query_srv(
        &self,
        domain: Arc<str>,
        config: &ResolverRuntimeConfig,
        sender: oneshot::Sender<SrvAnswerResult>,
    ) {
        let job = self.clone();
        let timeout = config.protective_query_timeout;
        tokio::spawn(async move {
            let r = match tokio::time::timeout(timeout, job.resolve_srv(domain)).await {
                Ok(r) => r,
                Err(_) => Err(ResolveLocalError::DriverTimedOut.into()),
            };
            let _ = sender.send(r);
        });
    }
}

fn build_request(name: Name, record_type: RecordType) -> Message {
    let mut edns = Edns::new();
    edns.set_max_payload(io::MAX_RECEIVE_BUFFER_SIZE as u16);

    let mut msg = Message::new();
    msg.set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, record_type));
    msg.set_edns(edns);
    msg
}

impl HickoryDriver {
    fn families(&self) -> AddrFamilies {
        AddrFamilies {
            ipv4: self.want_ipv4,
            ipv6: self.want_ipv6,
        }
    }

    async fn resolve_srv(self, domain: Arc<str>) -> SrvAnswerResult {
        if domain.is_empty() {
            return Err(ResolveError::EmptyDomain);
        }
        let name = Name::from_str(&domain).map_err(|_| ResolveDriverError::BadName)?;

        let response = self.exchange(name.clone(), RecordType::SRV).await?;
        let families = self.families();

        let mut records = Vec::new();
        for (mut record, target) in answer::collect_srv(&response, &name, self.cname_loose) {
            if target.is_root() {
                // "." means the service is decidedly not available at this name
                trace!("srv {domain}: skip record with root target");
                continue;
            }
            record.addrs = answer::glue_addrs(response.additionals(), &target, families);
            if record.addrs.is_empty() {
                self.lookup_addrs(&mut record, target).await;
            }
            records.push(record);
        }

        debug!("srv {domain}: got {} records", records.len());
        Ok(SrvAnswer::new(domain, records))
    }

    async fn lookup_addrs(&self, record: &mut SrvRecord, target: Name) {
        let families = self.families();
        let mut wanted = Vec::with_capacity(2);
        if self.want_ipv4 {
            wanted.push(RecordType::A);
        }
        if self.want_ipv6 {
            wanted.push(RecordType::AAAA);
        }

        for record_type in wanted {
            match self.exchange(target.clone(), record_type).await {
                Ok(response) => record
                    .addrs
                    .extend(answer::answer_addrs(&response, families)),
                Err(e) => debug!(
                    "{record_type} lookup for srv target {} failed: {e}",
                    record.target
                ),
            }
        }
    }

    async fn exchange(&self, name: Name, record_type: RecordType) -> Result<Message, ResolveError> {
        if self.servers.is_empty() {
            return Err(ResolveDriverError::NoServer.into());
        }

        let request = build_request(name, record_type);
        let mut last_err = ResolveDriverError::NoServer;
        for _ in 0..self.each_tries {
            for server in self.servers.iter() {
                match self.exchange_with(*server, &request).await {
                    Ok(response) => {
                        if let Some(e) = ResolveError::from_response_code(response.response_code())
                        {
                            return Err(e);
                        }
                        return Ok(response);
                    }
                    Err(e) => {
                        trace!("dns exchange with {server} failed: {e}");
                        last_err = e;
                    }
                }
            }
        }
        Err(last_err.into())
    }

    async fn exchange_with(
        &self,
        server: SocketAddr,
        request: &Message,
    ) -> Result<Message, ResolveDriverError> {
        let response = io::udp_exchange(server, self.bind, request, self.request_timeout).await?;
        if response.truncated() && self.tcp_fallback {
            trace!("truncated reply from {server}, retry over tcp");
            return io::tcp_exchange(
                server,
                self.bind,
                request,
                self.connect_timeout,
                self.request_timeout,
            )
            .await;
        }
        Ok(response)
    }
}

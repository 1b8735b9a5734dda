/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::str::FromStr;
use std::time::{Duration, Instant};

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, SRV};
use hickory_proto::rr::{Name, RData, Record, RecordType};

use srvd_resolver::driver::hickory::HickoryDriverConfig;
use srvd_resolver::{
    ResolveError, ResolveServerError, SrvAnswerResult, SrvQueryPoll, SrvResolve,
    SrvResolverBuilder, SrvResolverConfig,
};

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn answer_for(req: &Message) -> Message {
    let mut resp = Message::new();
    resp.set_id(req.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_available(true);
    resp.add_queries(req.queries().to_vec());

    let Some(query) = req.queries().first() else {
        resp.set_response_code(ResponseCode::FormErr);
        return resp;
    };
    let qname = query.name().to_utf8();
    match (qname.as_str(), query.query_type()) {
        ("_web._tcp.test.", RecordType::SRV) => {
            resp.add_answer(Record::from_rdata(
                query.name().clone(),
                30,
                RData::SRV(SRV::new(10, 5, 8080, name("a.test."))),
            ));
            resp.add_answer(Record::from_rdata(
                query.name().clone(),
                30,
                RData::SRV(SRV::new(20, 0, 8081, name("b.test."))),
            ));
            resp.add_additional(Record::from_rdata(
                name("a.test."),
                30,
                RData::A(A(Ipv4Addr::new(10, 0, 0, 1))),
            ));
        }
        ("b.test.", RecordType::A) => {
            resp.add_answer(Record::from_rdata(
                name("b.test."),
                30,
                RData::A(A(Ipv4Addr::new(10, 0, 0, 2))),
            ));
        }
        ("b.test.", RecordType::AAAA) => {}
        _ => {
            resp.set_response_code(ResponseCode::NXDomain);
        }
    }
    resp
}

fn spawn_dns_server() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = socket.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            let Ok((nr, peer)) = socket.recv_from(&mut buf) else {
                return;
            };
            let Ok(req) = Message::from_vec(&buf[..nr]) else {
                continue;
            };
            let resp = answer_for(&req);
            let _ = socket.send_to(&resp.to_vec().unwrap(), peer);
        }
    });
    addr
}

fn resolver_config(server: SocketAddr) -> SrvResolverConfig {
    let mut driver = HickoryDriverConfig::default();
    driver.add_server(server.ip());
    driver.set_server_port(server.port());
    driver.set_request_timeout(Duration::from_secs(2));
    let mut config = SrvResolverConfig {
        name: "test".to_string(),
        driver,
        runtime: Default::default(),
    };
    config.check().unwrap();
    config
}

fn wait_answer<R: SrvResolve>(resolver: &mut R, mut query: R::Query) -> SrvAnswerResult {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match resolver.poll(&mut query) {
            SrvQueryPoll::Ready(r) => return r,
            SrvQueryPoll::Pending | SrvQueryPoll::Busy => {
                assert!(Instant::now() < deadline, "query timed out");
                resolver.process_pending();
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }
}

#[test]
fn srv_with_glue_and_follow_up() {
    let server = spawn_dns_server();
    let mut resolver = SrvResolverBuilder::new(resolver_config(server))
        .build()
        .unwrap();

    let query = resolver.submit("_web._tcp.test.").unwrap();
    let answer = wait_answer(&mut resolver, query).unwrap();
    assert_eq!(answer.records.len(), 2);

    let a = &answer.records[0];
    assert_eq!(a.target, "a.test");
    assert_eq!(a.port, 8080);
    assert_eq!(a.first_addr(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));

    let b = &answer.records[1];
    assert_eq!(b.target, "b.test");
    assert_eq!(b.weight, 0);
    assert_eq!(b.first_addr(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));

    resolver.teardown();
}

#[test]
fn negative_answer() {
    let server = spawn_dns_server();
    let mut resolver = SrvResolverBuilder::new(resolver_config(server))
        .build()
        .unwrap();

    let query = resolver.submit("_none._tcp.test.").unwrap();
    let err = wait_answer(&mut resolver, query).unwrap_err();
    assert_eq!(err, ResolveError::FromServer(ResolveServerError::NotFound));
    assert!(err.is_negative_answer());
}

#[test]
fn submit_after_teardown() {
    let server = spawn_dns_server();
    let mut resolver = SrvResolverBuilder::new(resolver_config(server))
        .build()
        .unwrap();
    resolver.teardown();

    assert!(resolver.submit("_web._tcp.test.").is_err());
    assert!(matches!(
        resolver.submit(""),
        Err(ResolveError::EmptyDomain)
    ));
}

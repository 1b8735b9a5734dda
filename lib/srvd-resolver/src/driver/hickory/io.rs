/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use hickory_proto::op::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, UdpSocket};

use crate::ResolveDriverError;

/// Max size for the UDP receive buffer as recommended by
/// [RFC6891](https://datatracker.ietf.org/doc/html/rfc6891#section-6.2.5).
pub(super) const MAX_RECEIVE_BUFFER_SIZE: usize = 4_096;

fn unspecified_bind(server: SocketAddr) -> SocketAddr {
    match server {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}

fn matches_request(request: &Message, response: &Message) -> bool {
    response.id() == request.id()
        && response
            .queries()
            .iter()
            .all(|rq| request.queries().contains(rq))
}

pub(super) async fn udp_exchange(
    server: SocketAddr,
    bind: Option<SocketAddr>,
    request: &Message,
    timeout: Duration,
) -> Result<Message, ResolveDriverError> {
    tokio::time::timeout(timeout, udp_send_recv(server, bind, request))
        .await
        .map_err(|_| ResolveDriverError::Timeout)?
}

async fn udp_send_recv(
    server: SocketAddr,
    bind: Option<SocketAddr>,
    request: &Message,
) -> Result<Message, ResolveDriverError> {
    let socket = UdpSocket::bind(bind.unwrap_or_else(|| unspecified_bind(server))).await?;
    socket.connect(server).await?;

    let bytes = request.to_vec()?;
    let nw = socket.send(&bytes).await?;
    if nw != bytes.len() {
        return Err(ResolveDriverError::Io(format!(
            "not all bytes of message sent, {nw} of {}",
            bytes.len()
        )));
    }

    let mut recv_buf = vec![0u8; MAX_RECEIVE_BUFFER_SIZE];
    loop {
        let nr = socket.recv(&mut recv_buf).await?;
        let Ok(response) = Message::from_vec(&recv_buf[..nr]) else {
            // garbage on a connected socket, keep waiting for the real reply
            continue;
        };
        if matches_request(request, &response) {
            return Ok(response);
        }
    }
}

pub(super) async fn tcp_exchange(
    server: SocketAddr,
    bind: Option<SocketAddr>,
    request: &Message,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Message, ResolveDriverError> {
    let socket = match server {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    if let Some(bind) = bind {
        socket.bind(bind)?;
    }
    let mut stream = tokio::time::timeout(connect_timeout, socket.connect(server))
        .await
        .map_err(|_| ResolveDriverError::Timeout)??;

    tokio::time::timeout(request_timeout, async move {
        let bytes = request.to_vec()?;
        let len = u16::try_from(bytes.len())
            .map_err(|_| ResolveDriverError::Internal("dns request too large".to_string()))?;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(&bytes).await?;
        stream.flush().await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let len = u16::from_be_bytes(len_buf) as usize;
        let mut recv_buf = vec![0u8; len];
        stream.read_exact(&mut recv_buf).await?;

        let response = Message::from_vec(&recv_buf)?;
        if matches_request(request, &response) {
            Ok(response)
        } else {
            Err(ResolveDriverError::BadResp)
        }
    })
    .await
    .map_err(|_| ResolveDriverError::Timeout)?
}

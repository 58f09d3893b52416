//! Async A2S_RULES queries over UDP.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use platkit_types::ServerInfo;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::codec::{Datagram, NO_CHALLENGE, Reply, S2C_CHALLENGE, SplitAssembler, rules_request};
use crate::config::QueryConfig;
use crate::error::QueryError;

/// A server's rules, keyed by cvar name.
pub type Rules = BTreeMap<String, String>;

/// Largest datagram a Source server sends.
const MAX_DATAGRAM: usize = 1400;

/// Asks the server at `addr` for its rule list.
///
/// Handles the challenge round trip and split replies. Each datagram gets
/// `config.timeout`; the whole exchange gives up after `config.max_packets`
/// datagrams.
///
/// # Errors
///
/// - [`QueryError::Timeout`] if the server goes quiet.
/// - [`QueryError::Compressed`] for bzip2 split replies.
/// - [`QueryError::Malformed`] / [`QueryError::UnexpectedReply`] for replies
///   outside the protocol.
pub async fn query_rules(
    addr: impl Into<SocketAddr>,
    config: &QueryConfig,
) -> Result<Rules, QueryError> {
    let target = addr.into();
    let bind: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };

    let socket = UdpSocket::bind(bind).await?;
    socket.connect(target).await?;
    socket.send(&rules_request(NO_CHALLENGE)).await?;
    tracing::debug!(%target, "rules query sent");

    let mut budget = config.max_packets;
    let mut challenged = false;
    loop {
        let body = recv_message(&socket, config, &mut budget).await?;
        match Reply::parse(&body)? {
            Reply::Challenge(challenge) if !challenged => {
                tracing::trace!(%target, challenge, "challenge received, re-sending");
                challenged = true;
                socket.send(&rules_request(challenge)).await?;
            }
            Reply::Challenge(_) => return Err(QueryError::UnexpectedReply(S2C_CHALLENGE)),
            Reply::Rules(rules) => {
                tracing::debug!(%target, count = rules.len(), "rules received");
                return Ok(rules);
            }
        }
    }
}

/// Receives one complete message, reassembling split parts.
async fn recv_message(
    socket: &UdpSocket,
    config: &QueryConfig,
    budget: &mut usize,
) -> Result<Vec<u8>, QueryError> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut assembler: Option<SplitAssembler> = None;

    while *budget > 0 {
        *budget -= 1;
        let len = timeout(config.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| QueryError::Timeout)??;

        match Datagram::parse(&buf[..len])? {
            Datagram::Single(body) => return Ok(body),
            Datagram::Split(part) => {
                let asm = assembler.get_or_insert_with(|| SplitAssembler::new(part.id, part.total));
                if let Some(body) = asm.push(part)? {
                    return Ok(body);
                }
            }
        }
    }
    Err(QueryError::TooManyPackets(config.max_packets))
}

/// Rules queries for anything with a query address.
pub trait QueryRules {
    /// Queries this server's rules. See [`query_rules`].
    async fn query_rules(&self, config: &QueryConfig) -> Result<Rules, QueryError>;
}

impl QueryRules for ServerInfo {
    async fn query_rules(&self, config: &QueryConfig) -> Result<Rules, QueryError> {
        query_rules(self.query_addr(), config).await
    }
}

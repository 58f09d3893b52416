//! Error types for server queries.

/// Errors that can occur while querying a server's rules.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Binding, sending or receiving on the UDP socket failed.
    #[error("query socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The server didn't answer within the configured timeout.
    #[error("server did not answer in time")]
    Timeout,

    /// A datagram didn't follow the query protocol.
    #[error("malformed reply: {0}")]
    Malformed(String),

    /// The server answered with a message type we didn't ask for.
    #[error("unexpected reply type {0:#04x}")]
    UnexpectedReply(u8),

    /// The reply was a bzip2-compressed split response, which isn't
    /// supported.
    #[error("compressed split replies are not supported")]
    Compressed,

    /// More datagrams than allowed arrived without completing a reply.
    #[error("reply did not complete within {0} packets")]
    TooManyPackets(usize),
}

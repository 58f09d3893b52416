//! Peer datagram types.

use serde::{Deserialize, Serialize};

use crate::{PeerId, TypeError};

// ---------------------------------------------------------------------------
// SendType
// ---------------------------------------------------------------------------

/// Delivery guarantee requested for an outbound packet.
///
/// The discriminants are the native layer's own values, so `as i32` is the
/// exact argument the native send call expects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum SendType {
    /// Fire and forget. May be dropped or arrive out of order.
    Unreliable = 0,

    /// Unreliable, and dropped outright if no session is established yet
    /// instead of being queued behind NAT traversal.
    UnreliableNoDelay = 1,

    /// Guaranteed, in-order delivery. The default for sends that don't say
    /// otherwise.
    #[default]
    Reliable = 2,

    /// Reliable, but small messages are coalesced (Nagle style) before
    /// going out.
    ReliableWithBuffering = 3,
}

impl SendType {
    /// Returns `true` for the two reliable variants.
    pub fn is_reliable(self) -> bool {
        matches!(self, Self::Reliable | Self::ReliableWithBuffering)
    }
}

impl TryFrom<i32> for SendType {
    type Error = TypeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unreliable),
            1 => Ok(Self::UnreliableNoDelay),
            2 => Ok(Self::Reliable),
            3 => Ok(Self::ReliableWithBuffering),
            _ => Err(TypeError::UnknownValue {
                kind: "SendType",
                value,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// One datagram received from a remote peer.
///
/// Only the receive path builds these, and only after the native layer has
/// reported a non-zero length, so a `Packet` never carries an empty payload.
/// The fields are private to keep the value immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    sender: PeerId,
    data: Vec<u8>,
}

impl Packet {
    /// Builds a packet from a sender and the bytes copied out of the native
    /// receive buffer.
    pub fn new(sender: PeerId, data: Vec<u8>) -> Self {
        Self { sender, data }
    }

    /// The peer that sent this packet.
    pub fn sender(&self) -> PeerId {
        self.sender
    }

    /// The payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the packet, returning the sender and the payload.
    pub fn into_parts(self) -> (PeerId, Vec<u8>) {
        (self.sender, self.data)
    }
}

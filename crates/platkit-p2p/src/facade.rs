//! The peer messaging facade.

use std::sync::Arc;

use platkit_native::{Callback, NativeP2p};
use platkit_types::{Packet, PeerId, SendType};
use tokio::sync::broadcast;

use crate::P2pEvent;

// ---------------------------------------------------------------------------
// SendOptions
// ---------------------------------------------------------------------------

/// How to send one packet.
///
/// The default sends the whole buffer reliably on channel 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOptions {
    /// Number of leading bytes to send. `None`, zero and negative values all
    /// mean "the whole buffer"; values past the end of the buffer are
    /// clamped to it.
    pub length: Option<i32>,

    /// Sub-stream to send on. The receiver reads it with the same number.
    pub channel: i32,

    /// Delivery guarantee.
    pub send_type: SendType,
}

impl SendOptions {
    pub fn channel(mut self, channel: i32) -> Self {
        self.channel = channel;
        self
    }

    pub fn send_type(mut self, send_type: SendType) -> Self {
        self.send_type = send_type;
        self
    }

    pub fn length(mut self, length: i32) -> Self {
        self.length = Some(length);
        self
    }

    /// Resolves [`length`](Self::length) against a buffer of `buf_len`
    /// bytes.
    pub fn effective_len(&self, buf_len: usize) -> usize {
        match self.length {
            Some(n) if n > 0 => (n as usize).min(buf_len),
            _ => buf_len,
        }
    }
}

// ---------------------------------------------------------------------------
// P2p
// ---------------------------------------------------------------------------

/// Accept, close, send and receive over the native peer datagram channel.
///
/// The facade holds no session state of its own. Everything it knows about
/// a peer lives in the native layer; the only thing owned here is the event
/// broadcaster that [`handle_callback`](Self::handle_callback) feeds.
pub struct P2p<N> {
    native: Arc<N>,
    events: broadcast::Sender<P2pEvent>,
}

impl<N: NativeP2p> P2p<N> {
    /// Wraps a native handle. `event_capacity` bounds how many events a slow
    /// subscriber may lag behind before it starts missing some.
    pub fn new(native: Arc<N>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self { native, events }
    }

    /// Subscribes to session requests and connection failures.
    pub fn subscribe(&self) -> broadcast::Receiver<P2pEvent> {
        self.events.subscribe()
    }

    /// Accepts a session from `peer`. Call this in response to
    /// [`P2pEvent::SessionRequest`].
    pub fn accept_session(&self, peer: PeerId) -> bool {
        let accepted = self.native.accept_session_with_user(peer);
        if accepted {
            tracing::info!(%peer, "p2p session accepted");
        } else {
            tracing::warn!(%peer, "p2p session accept rejected by native layer");
        }
        accepted
    }

    /// Frees the native resources held for `peer`. If the peer sends again
    /// a fresh [`P2pEvent::SessionRequest`] is raised.
    pub fn close_session(&self, peer: PeerId) -> bool {
        let closed = self.native.close_session_with_user(peer);
        tracing::info!(%peer, closed, "p2p session closed");
        closed
    }

    /// Non-blocking check for a waiting packet on `channel`.
    pub fn packet_available(&self, channel: i32) -> bool {
        self.native.is_packet_available(channel).is_some()
    }

    /// Reads the next packet on `channel`.
    ///
    /// Returns `None` when nothing is waiting, when the native read fails,
    /// and when it reports a zero-length packet.
    pub fn read_packet(&self, channel: i32) -> Option<Packet> {
        let size = self.native.is_packet_available(channel)?;

        let mut buf = vec![0u8; size as usize];
        let (read, sender) = self.native.read_packet(&mut buf, channel)?;
        let read = (read as usize).min(buf.len());
        if read == 0 {
            tracing::debug!(channel, "native read reported an empty packet");
            return None;
        }
        buf.truncate(read);

        tracing::trace!(peer = %sender, channel, len = read, "p2p packet read");
        Some(Packet::new(sender, buf))
    }

    /// Sends `data` to `peer`.
    ///
    /// The first send to a new peer may be delayed while the native layer
    /// sets up the path. A `true` return only means the packet was queued;
    /// delivery failures arrive later as [`P2pEvent::ConnectionFailed`].
    pub fn send_packet(&self, peer: PeerId, data: &[u8], options: SendOptions) -> bool {
        let len = options.effective_len(data.len());
        let sent = self.native.send_packet(
            peer,
            &data[..len],
            options.send_type,
            options.channel,
        );
        if sent {
            tracing::trace!(
                %peer,
                channel = options.channel,
                len,
                send_type = ?options.send_type,
                "p2p packet sent"
            );
        } else {
            tracing::warn!(%peer, channel = options.channel, len, "p2p send failed");
        }
        sent
    }

    /// Routes a raw native callback to subscribers.
    ///
    /// Returns `true` if the callback belonged to this facade.
    pub fn handle_callback(&self, callback: &Callback) -> bool {
        let Some(event) = P2pEvent::from_callback(callback) else {
            return false;
        };
        match &event {
            P2pEvent::SessionRequest(peer) => {
                tracing::info!(%peer, "p2p session requested");
            }
            P2pEvent::ConnectionFailed { peer, error } => {
                tracing::warn!(%peer, error, "p2p connection failed");
            }
        }
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use platkit_native::{LoopbackNative, NativeCallbacks};

    use super::*;

    fn pid(id: u64) -> PeerId {
        PeerId(id)
    }

    /// A node that already accepted a session from peer 2, with one
    /// packet waiting on channel 99.
    fn facade_with_session() -> (P2p<LoopbackNative>, Arc<LoopbackNative>) {
        let native = Arc::new(LoopbackNative::standalone(pid(1)));
        native.inject_packet(pid(2), 99, b"hello");
        native.accept_session_with_user(pid(2));
        while native.next_callback().is_some() {}
        (P2p::new(Arc::clone(&native), 8), native)
    }

    /// Reports a waiting packet but reads zero bytes.
    struct ZeroLengthRead;

    impl NativeP2p for ZeroLengthRead {
        fn accept_session_with_user(&self, _: PeerId) -> bool {
            false
        }
        fn close_session_with_user(&self, _: PeerId) -> bool {
            false
        }
        fn is_packet_available(&self, _: i32) -> Option<u32> {
            Some(4)
        }
        fn read_packet(&self, _: &mut [u8], _: i32) -> Option<(u32, PeerId)> {
            Some((0, PeerId(7)))
        }
        fn send_packet(&self, _: PeerId, _: &[u8], _: SendType, _: i32) -> bool {
            false
        }
    }

    // =====================================================================
    // SendOptions
    // =====================================================================

    #[test]
    fn test_send_options_default_is_reliable_channel_zero() {
        let opts = SendOptions::default();
        assert_eq!(opts.channel, 0);
        assert_eq!(opts.send_type, SendType::Reliable);
        assert_eq!(opts.length, None);
    }

    #[test]
    fn test_effective_len_non_positive_means_full_buffer() {
        assert_eq!(SendOptions::default().effective_len(10), 10);
        assert_eq!(SendOptions::default().length(0).effective_len(10), 10);
        assert_eq!(SendOptions::default().length(-1).effective_len(10), 10);
    }

    #[test]
    fn test_effective_len_clamps_to_buffer() {
        assert_eq!(SendOptions::default().length(4).effective_len(10), 4);
        assert_eq!(SendOptions::default().length(50).effective_len(10), 10);
    }

    // =====================================================================
    // read_packet()
    // =====================================================================

    #[test]
    fn test_read_packet_nothing_available_returns_none() {
        let (p2p, _) = facade_with_session();

        assert!(!p2p.packet_available(0));
        assert_eq!(p2p.read_packet(0), None);
    }

    #[test]
    fn test_read_packet_returns_exact_payload_and_sender() {
        let (p2p, _) = facade_with_session();
        assert!(p2p.packet_available(99));

        let packet = p2p.read_packet(99).expect("packet waiting");

        assert_eq!(packet.sender(), pid(2));
        assert_eq!(packet.data(), b"hello");
        assert!(!p2p.packet_available(99));
    }

    #[test]
    fn test_read_packet_zero_length_read_returns_none() {
        let p2p = P2p::new(Arc::new(ZeroLengthRead), 4);

        assert!(p2p.packet_available(0));
        assert_eq!(p2p.read_packet(0), None);
    }

    // =====================================================================
    // send_packet()
    // =====================================================================

    #[test]
    fn test_send_packet_explicit_non_positive_length_matches_default() {
        let (p2p, native) = facade_with_session();
        let data = b"payload";

        assert!(p2p.send_packet(pid(2), data, SendOptions::default()));
        assert!(p2p.send_packet(pid(2), data, SendOptions::default().length(0)));
        assert!(p2p.send_packet(pid(2), data, SendOptions::default().length(-5)));

        let sent = native.sent_packets();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|p| p.data == data.to_vec()));
        assert!(sent.iter().all(|p| p.send_type == SendType::Reliable));
    }

    #[test]
    fn test_send_packet_partial_length_sends_prefix() {
        let (p2p, native) = facade_with_session();

        p2p.send_packet(
            pid(2),
            b"abcdef",
            SendOptions::default()
                .length(3)
                .channel(4)
                .send_type(SendType::Unreliable),
        );

        let sent = native.sent_packets();
        assert_eq!(sent[0].data, b"abc".to_vec());
        assert_eq!(sent[0].channel, 4);
        assert_eq!(sent[0].send_type, SendType::Unreliable);
    }

    #[test]
    fn test_send_packet_native_failure_returns_false() {
        let p2p = P2p::new(Arc::new(ZeroLengthRead), 4);
        assert!(!p2p.send_packet(pid(3), b"x", SendOptions::default()));
    }

    // =====================================================================
    // handle_callback()
    // =====================================================================

    #[test]
    fn test_handle_callback_broadcasts_to_subscriber() {
        let (p2p, _) = facade_with_session();
        let mut rx = p2p.subscribe();

        let routed = p2p.handle_callback(&Callback::P2pSessionRequest {
            remote: pid(5),
        });

        assert!(routed);
        assert_eq!(rx.try_recv().unwrap(), P2pEvent::SessionRequest(pid(5)));
    }

    #[test]
    fn test_handle_callback_without_subscribers_still_routes() {
        let (p2p, _) = facade_with_session();
        assert!(p2p.handle_callback(&Callback::P2pSessionConnectFail {
            remote: pid(5),
            error: 1,
        }));
    }

    #[test]
    fn test_handle_callback_foreign_callback_not_routed() {
        let (p2p, _) = facade_with_session();
        assert!(!p2p.handle_callback(&Callback::Shutdown));
    }
}

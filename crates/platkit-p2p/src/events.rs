//! Typed peer messaging events.

use platkit_native::Callback;
use platkit_types::PeerId;

/// Something the native layer told us about a peer.
///
/// Delivered through [`P2p::subscribe`](crate::P2p::subscribe) once the
/// client context routes the underlying native callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum P2pEvent {
    /// `peer` wants to send us messages. Call
    /// [`accept_session`](crate::P2p::accept_session) to receive them;
    /// ignoring the request refuses the session.
    SessionRequest(PeerId),

    /// Packets to `peer` can't get through. Everything queued for it has
    /// been dropped. Later sends will try to reconnect, and are dropped
    /// again if the path is still broken.
    ConnectionFailed { peer: PeerId, error: u8 },
}

impl P2pEvent {
    /// Translates a raw callback, or returns `None` if it belongs to
    /// another facade.
    pub fn from_callback(callback: &Callback) -> Option<Self> {
        match *callback {
            Callback::P2pSessionRequest { remote } => {
                Some(Self::SessionRequest(remote))
            }
            Callback::P2pSessionConnectFail { remote, error } => {
                Some(Self::ConnectionFailed {
                    peer: remote,
                    error,
                })
            }
            _ => None,
        }
    }

    /// The peer this event is about.
    pub fn peer(&self) -> PeerId {
        match self {
            Self::SessionRequest(peer) => *peer,
            Self::ConnectionFailed { peer, .. } => *peer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_callback_session_request() {
        let event = P2pEvent::from_callback(&Callback::P2pSessionRequest {
            remote: PeerId(3),
        });
        assert_eq!(event, Some(P2pEvent::SessionRequest(PeerId(3))));
    }

    #[test]
    fn test_from_callback_connect_fail_keeps_error_code() {
        let event = P2pEvent::from_callback(&Callback::P2pSessionConnectFail {
            remote: PeerId(4),
            error: 2,
        })
        .expect("should translate");
        assert_eq!(
            event,
            P2pEvent::ConnectionFailed {
                peer: PeerId(4),
                error: 2
            }
        );
        assert_eq!(event.peer(), PeerId(4));
    }

    #[test]
    fn test_from_callback_ignores_utility_callbacks() {
        assert_eq!(P2pEvent::from_callback(&Callback::Shutdown), None);
        assert_eq!(P2pEvent::from_callback(&Callback::IpCountryChanged), None);
    }
}

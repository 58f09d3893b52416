//! Peer messaging for platkit.
//!
//! A session-less datagram channel keyed by [`PeerId`]: the native layer
//! negotiates the actual path (direct, NAT-punched or relayed) the first
//! time a packet goes out, and this crate only shapes the calls around it.
//!
//! # Lifecycle
//!
//! ```text
//! remote sends ──→ P2pEvent::SessionRequest ──→ accept_session()
//!                                                   │
//!                      read_packet() ←── packet_available()
//!                                                   │
//!                                            close_session()
//! ```
//!
//! Every operation reports failure as a plain `bool` or `Option`; the
//! native layer gives no further detail and this facade doesn't invent any.
//!
//! [`PeerId`]: platkit_types::PeerId

mod events;
mod facade;

pub use events::P2pEvent;
pub use facade::{P2p, SendOptions};

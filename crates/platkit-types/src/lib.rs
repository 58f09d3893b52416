//! Value types for platkit.
//!
//! Everything in this crate is plain data that crosses the boundary between
//! the native SDK and the facades:
//!
//! - **Identifiers** ([`PeerId`], [`AppId`], [`AsyncCallHandle`]) as
//!   newtypes, so a peer can never be passed where an app id is expected.
//! - **Messaging** ([`Packet`], [`SendType`]) for the peer datagram channel.
//! - **Platform enums** ([`NotificationPosition`], [`Universe`],
//!   [`FileSignature`], ...) mirroring the native discriminants.
//! - **Server browser data** ([`ServerInfo`], [`GameServerItem`]).
//!
//! ```text
//! Facades (p2p, utils, servers)  ← reshape results into these types
//!     ↕
//! Types (this crate)             ← no behaviour beyond conversion
//!     ↕
//! Native boundary                ← speaks raw discriminants and buffers
//! ```

mod error;
mod ids;
mod packet;
mod platform;
mod server;

pub use error::TypeError;
pub use ids::{AppId, AsyncCallHandle, PeerId};
pub use packet::{Packet, SendType};
pub use platform::{
    FileSignature, GamepadTextInputLineMode, GamepadTextInputMode, Image,
    NotificationPosition, Universe,
};
pub use server::{GameServerItem, ServerInfo};

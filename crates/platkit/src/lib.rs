//! # platkit
//!
//! Safe bindings over a native multiplayer platform SDK.
//!
//! The native layer (anything implementing [`Native`]) does the real work.
//! platkit wraps it in three pieces:
//!
//! - [`P2p`]: NAT-traversing peer messaging with session accept/close.
//! - [`Utils`]: host queries, overlay control and async calls such as file
//!   signature checks.
//! - [`query_rules`]: Source `A2S_RULES` queries for servers found through
//!   the server browser.
//!
//! Everything hangs off one [`PlatformClient`], built once at startup and
//! driven by [`PlatformClient::run_callbacks`] from the host's main loop or
//! by a [`CallbackPump`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use platkit::prelude::*;
//!
//! let client = PlatformClient::builder()
//!     .config(ClientConfig::from_json_str(r#"{ "app_id": 480 }"#)?)
//!     .build(native)?;
//!
//! let mut events = client.p2p().subscribe();
//! loop {
//!     client.run_callbacks();
//!     while let Ok(P2pEvent::SessionRequest(peer)) = events.try_recv() {
//!         client.p2p().accept_session(peer);
//!     }
//!     // ...
//! }
//! ```

mod client;
mod config;
mod error;
mod pump;
pub mod telemetry;

pub use client::{PlatformClient, PlatformClientBuilder};
pub use config::ClientConfig;
pub use error::PlatformError;
pub use pump::CallbackPump;

pub use platkit_native::{Callback, Native};
#[cfg(feature = "loopback")]
pub use platkit_native::{LoopbackHub, LoopbackNative};
pub use platkit_p2p::{P2p, P2pEvent, SendOptions};
pub use platkit_servers::{QueryConfig, QueryError, QueryRules, Rules, query_rules};
pub use platkit_types::{
    AppId, FileSignature, Image, NotificationPosition, Packet, PeerId, SendType, ServerInfo,
    Universe,
};
pub use platkit_utils::{Utils, UtilsError, UtilsEvent};

/// Re-exports for `use platkit::prelude::*`.
pub mod prelude {
    pub use crate::{
        CallbackPump, ClientConfig, Native, P2p, P2pEvent, PlatformClient, PlatformError,
        QueryConfig, QueryRules, SendOptions, Utils, UtilsEvent,
    };
    pub use platkit_types::{AppId, NotificationPosition, Packet, PeerId, SendType, ServerInfo};
}

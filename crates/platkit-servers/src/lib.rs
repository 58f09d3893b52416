//! Server browser helpers for platkit.
//!
//! The native server browser hands out [`ServerInfo`] snapshots. Servers
//! that speak the Source query protocol can also be asked for their rule
//! list (cvars such as `mp_timelimit`), which this crate does over plain
//! UDP with [`query_rules`] or the [`QueryRules`] extension on `ServerInfo`.
//!
//! ```text
//! client ── A2S_RULES(-1) ──→ server
//!        ←── S2C_CHALLENGE ──
//!        ── A2S_RULES(c) ───→
//!        ←── A2S_RULES reply (single or split) ──
//! ```
//!
//! [`ServerInfo`]: platkit_types::ServerInfo

#![allow(async_fn_in_trait)]

mod codec;
mod config;
mod error;
mod query;

pub use codec::{Datagram, Reply, SplitAssembler, SplitPart};
pub use config::QueryConfig;
pub use error::QueryError;
pub use query::{QueryRules, Rules, query_rules};

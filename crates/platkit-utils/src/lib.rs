//! Platform utilities for platkit.
//!
//! Mostly stateless getters that forward straight to the native layer
//! ([`Utils`]), plus the two pieces that do hold state:
//!
//! - [`OverlayPositionCache`]: the overlay notification corner, cached
//!   here and pushed through to the native layer on every write
//! - [`CallResults`]: the bridge that turns an [`AsyncCallHandle`] into a
//!   [`CallResult`] future, resolved when something calls
//!   [`CallResults::pump`]
//!
//! [`AsyncCallHandle`]: platkit_types::AsyncCallHandle

mod call_result;
mod config;
mod error;
mod events;
mod facade;
mod overlay;

pub use call_result::{CallResult, CallResults, get_result, is_complete};
pub use config::UtilsConfig;
pub use error::UtilsError;
pub use events::UtilsEvent;
pub use facade::Utils;
pub use overlay::OverlayPositionCache;

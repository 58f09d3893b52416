//! Identifier newtypes.
//!
//! Every identifier the native layer hands out is a bare integer. Wrapping
//! each one in its own struct means the compiler rejects a `PeerId` where an
//! `AppId` belongs, even though both are integers underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PeerId
// ---------------------------------------------------------------------------

/// Opaque 64-bit identifier for a remote participant.
///
/// The facade never owns anything through a `PeerId`. It is purely a lookup
/// key passed down to the native layer, which keeps whatever session state
/// belongs to it.
///
/// `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Returns the raw 64-bit value passed to the native layer.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for PeerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AppId
// ---------------------------------------------------------------------------

/// Numeric id of the application the native SDK was initialised for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppId(pub u32);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AsyncCallHandle
// ---------------------------------------------------------------------------

/// Token for one in-flight asynchronous native operation.
///
/// The native layer returns one of these when an async call starts; the
/// handle is later exchanged for a typed result once the call completes.
/// The raw value `0` is reserved by the native layer for "the call could
/// not be started".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AsyncCallHandle(pub u64);

impl AsyncCallHandle {
    /// The handle the native layer returns when a call failed to start.
    pub const INVALID: AsyncCallHandle = AsyncCallHandle(0);

    /// Returns `false` for [`AsyncCallHandle::INVALID`].
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for AsyncCallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{:#x}", self.0)
    }
}

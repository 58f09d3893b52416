//! Raw callbacks and call states reported by the native layer.

use platkit_types::PeerId;

/// One event posted by the native layer's callback queue.
///
/// These are the raw shapes; the facades translate them into their own
/// typed event enums before anyone outside this workspace sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    /// A peer sent us a packet and we have no session with them yet.
    P2pSessionRequest { remote: PeerId },

    /// Packets to `remote` could not get through. `error` is the native
    /// session error code.
    P2pSessionConnectFail { remote: PeerId, error: u8 },

    /// The country of the user changed.
    IpCountryChanged,

    /// Running on battery with less than ten minutes left. Posted again
    /// every minute.
    LowBatteryPower { minutes_left: u8 },

    /// The platform client wants the process to shut down.
    Shutdown,

    /// The gamepad text dialog closed. `submitted` is `false` when the user
    /// cancelled.
    GamepadTextInputDismissed { submitted: bool },
}

/// Completion state of an asynchronous native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// The native layer is still working on it.
    Pending,

    /// The call finished. `failed` is the native layer's I/O failure flag.
    Completed { failed: bool },
}

impl CallState {
    /// Returns `true` once the call has finished, successfully or not.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Returns `true` only for a finished call whose failure flag is set.
    pub fn failed(self) -> bool {
        matches!(self, Self::Completed { failed: true })
    }
}

//! Typed utility events.

use platkit_native::Callback;

/// Host-level notifications posted by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilsEvent {
    /// The user's country, as seen by IP geolocation, changed.
    IpCountryChanged,

    /// Fewer than ten minutes of battery left. Repeats every minute.
    LowBatteryPower { minutes_left: u8 },

    /// The platform wants the process to shut down.
    Shutdown,

    /// The gamepad text dialog closed. `submitted` is `false` on cancel.
    GamepadTextInputDismissed { submitted: bool },
}

impl UtilsEvent {
    /// Translates a raw callback, or returns `None` if it belongs to
    /// another facade.
    pub fn from_callback(callback: &Callback) -> Option<Self> {
        match *callback {
            Callback::IpCountryChanged => Some(Self::IpCountryChanged),
            Callback::LowBatteryPower { minutes_left } => {
                Some(Self::LowBatteryPower { minutes_left })
            }
            Callback::Shutdown => Some(Self::Shutdown),
            Callback::GamepadTextInputDismissed { submitted } => {
                Some(Self::GamepadTextInputDismissed { submitted })
            }
            Callback::P2pSessionRequest { .. }
            | Callback::P2pSessionConnectFail { .. } => None,
        }
    }
}

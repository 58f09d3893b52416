//! Native SDK boundary for platkit.
//!
//! The vendor SDK does all the real work: session negotiation, NAT
//! traversal, relays, reliability. This crate only describes the shape of
//! its entry points as three traits so the facades can be written (and
//! tested) against any implementation:
//!
//! - [`NativeP2p`]: session-less peer datagrams
//! - [`NativeUtils`]: host queries, overlay control, async call results
//! - [`NativeCallbacks`]: the queue of posted [`Callback`]s
//!
//! Every method maps to exactly one native entry point. Buffers are passed
//! as slices sized exactly as the native convention expects.
//!
//! # Feature Flags
//!
//! - `loopback`: [`LoopbackNative`], an in-memory stand-in for the SDK
//!   used by tests and demos.

mod callback;
#[cfg(feature = "loopback")]
mod loopback;
mod results;

pub use callback::{CallState, Callback};
#[cfg(feature = "loopback")]
pub use loopback::{LoopbackHub, LoopbackNative, LoopbackUtils, SentPacket};
pub use results::{CallbackResult, CheckFileSignatureResult, UTILS_CALLBACKS};

use platkit_types::{
    AsyncCallHandle, GamepadTextInputLineMode, GamepadTextInputMode,
    NotificationPosition, PeerId, SendType,
};

/// Native peer-to-peer datagram entry points.
pub trait NativeP2p: Send + Sync + 'static {
    /// Accepts a pending session request from `user`.
    fn accept_session_with_user(&self, user: PeerId) -> bool;

    /// Releases all session resources held for `user`.
    fn close_session_with_user(&self, user: PeerId) -> bool;

    /// Returns the size of the next packet on `channel`, or `None` if no
    /// packet is waiting.
    fn is_packet_available(&self, channel: i32) -> Option<u32>;

    /// Copies the next packet on `channel` into `dest`.
    ///
    /// Returns the number of bytes written and the sender, or `None` if the
    /// read failed.
    fn read_packet(&self, dest: &mut [u8], channel: i32) -> Option<(u32, PeerId)>;

    /// Queues `data` for delivery to `remote`.
    fn send_packet(
        &self,
        remote: PeerId,
        data: &[u8],
        send_type: SendType,
        channel: i32,
    ) -> bool;
}

/// Native utility entry points.
pub trait NativeUtils: Send + Sync + 'static {
    fn seconds_since_app_active(&self) -> u32;

    fn seconds_since_computer_active(&self) -> u32;

    /// Raw universe discriminant.
    fn connected_universe(&self) -> i32;

    /// Server clock in unix seconds.
    fn server_real_time(&self) -> u32;

    /// Two-letter ISO 3166-1 country code from IP geolocation.
    fn ip_country(&self) -> String;

    /// Width and height of a cached image, or `None` if it doesn't exist.
    fn image_size(&self, image: i32) -> Option<(u32, u32)>;

    /// Copies a cached image as RGBA into `dest`, which must be exactly
    /// `width * height * 4` bytes.
    fn image_rgba(&self, image: i32, dest: &mut [u8]) -> bool;

    /// Battery charge in percent, or 255 when running on AC power.
    fn current_battery_power(&self) -> u8;

    fn app_id(&self) -> u32;

    fn set_overlay_notification_position(&self, position: NotificationPosition);

    fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32);

    fn is_overlay_enabled(&self) -> bool;

    fn overlay_needs_present(&self) -> bool;

    /// Completion state of an async call.
    fn is_api_call_completed(&self, call: AsyncCallHandle) -> CallState;

    /// Copies the result of a completed call into `dest`.
    ///
    /// `dest` must be exactly the size of the result struct tagged with
    /// `expected_callback`. Returns `None` if nothing could be copied
    /// (unknown call, still pending, wrong id or size), otherwise
    /// `Some(failed)` with the native failure flag.
    fn api_call_result(
        &self,
        call: AsyncCallHandle,
        dest: &mut [u8],
        expected_callback: i32,
    ) -> Option<bool>;

    /// Starts an async signature check of the executable at `path`.
    fn check_file_signature(&self, path: &str) -> AsyncCallHandle;

    fn show_gamepad_text_input(
        &self,
        mode: GamepadTextInputMode,
        line_mode: GamepadTextInputLineMode,
        description: &str,
        max_chars: u32,
        existing_text: &str,
    ) -> bool;

    /// Byte length of the last submitted gamepad text, including the
    /// trailing NUL, or 0 if there is none.
    fn entered_gamepad_text_length(&self) -> u32;

    /// Copies the last submitted gamepad text as NUL-terminated UTF-8.
    fn entered_gamepad_text(&self, dest: &mut [u8]) -> bool;

    fn ui_language(&self) -> String;

    fn is_running_in_vr(&self) -> bool;

    fn is_in_big_picture_mode(&self) -> bool;

    fn start_vr_dashboard(&self);

    fn is_vr_headset_streaming_enabled(&self) -> bool;

    fn set_vr_headset_streaming_enabled(&self, enabled: bool);
}

/// The native callback queue.
pub trait NativeCallbacks: Send + Sync + 'static {
    /// Pops the next posted callback, if any.
    fn next_callback(&self) -> Option<Callback>;
}

/// Everything a full client needs from the native layer.
pub trait Native: NativeP2p + NativeUtils + NativeCallbacks {}

impl<T> Native for T where T: NativeP2p + NativeUtils + NativeCallbacks {}

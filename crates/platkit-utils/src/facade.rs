//! The platform utilities facade.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platkit_native::{Callback, CheckFileSignatureResult, NativeUtils};
use platkit_types::{
    AppId, FileSignature, GamepadTextInputLineMode, GamepadTextInputMode, Image,
    NotificationPosition, Universe,
};
use tokio::sync::broadcast;

use crate::{CallResults, OverlayPositionCache, UtilsConfig, UtilsError, UtilsEvent};

/// Battery percentage the native layer reports while on AC power.
const ON_AC_POWER: u8 = 255;

/// Miscellaneous host queries and overlay control.
///
/// Nearly every method is a one-line forward to the native layer. The
/// exceptions are the overlay position (see [`OverlayPositionCache`]) and
/// the async [`check_file_signature`](Self::check_file_signature), which
/// only resolves while something drives [`pump_calls`](Self::pump_calls).
pub struct Utils<N> {
    native: Arc<N>,
    overlay: OverlayPositionCache,
    calls: CallResults<N>,
    events: broadcast::Sender<UtilsEvent>,
}

impl<N: NativeUtils> Utils<N> {
    pub fn new(native: Arc<N>, config: &UtilsConfig) -> Self {
        let overlay = OverlayPositionCache::new(config.overlay_position);
        if config.push_overlay_on_start {
            overlay.set(native.as_ref(), config.overlay_position);
        }
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            calls: CallResults::new(Arc::clone(&native)),
            native,
            overlay,
            events,
        }
    }

    /// Subscribes to battery, shutdown, country and gamepad dialog events.
    pub fn subscribe(&self) -> broadcast::Receiver<UtilsEvent> {
        self.events.subscribe()
    }

    // -- Activity --------------------------------------------------------

    /// Seconds since the application window was last active.
    pub fn seconds_since_app_active(&self) -> u32 {
        self.native.seconds_since_app_active()
    }

    /// Seconds since the user last touched mouse or keyboard.
    pub fn seconds_since_computer_active(&self) -> u32 {
        self.native.seconds_since_computer_active()
    }

    // -- Identity and locale ---------------------------------------------

    pub fn connected_universe(&self) -> Universe {
        let raw = self.native.connected_universe();
        Universe::try_from(raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "unrecognised universe, reporting Invalid");
            Universe::Invalid
        })
    }

    /// The platform's server clock.
    pub fn server_time(&self) -> DateTime<Utc> {
        let secs = self.native.server_real_time();
        DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default()
    }

    /// Two-letter country code of the client, from IP geolocation.
    pub fn ip_country(&self) -> String {
        self.native.ip_country()
    }

    /// Language the platform client UI runs in. Games usually want their
    /// own language setting instead.
    pub fn ui_language(&self) -> String {
        self.native.ui_language()
    }

    pub fn app_id(&self) -> AppId {
        AppId(self.native.app_id())
    }

    // -- Images ----------------------------------------------------------

    /// Dimensions of a cached image, if it exists.
    pub fn image_size(&self, image: i32) -> Option<(u32, u32)> {
        self.native.image_size(image)
    }

    /// Copies a cached image out as RGBA.
    pub fn image(&self, image: i32) -> Option<Image> {
        let (width, height) = self.image_size(image)?;
        let Some(len) = Image::rgba_len(width, height) else {
            tracing::warn!(image, width, height, "native image too large to copy");
            return None;
        };
        let mut data = vec![0u8; len];
        if !self.native.image_rgba(image, &mut data) {
            tracing::debug!(image, width, height, "native image copy failed");
            return None;
        }
        Some(Image {
            width,
            height,
            data,
        })
    }

    // -- Power -----------------------------------------------------------

    /// `true` on a laptop running from its battery.
    pub fn using_battery_power(&self) -> bool {
        self.native.current_battery_power() != ON_AC_POWER
    }

    /// Battery charge in `[0, 1]`. Reports `1.0` on AC power.
    pub fn current_battery_power(&self) -> f32 {
        let percent = f32::from(self.native.current_battery_power());
        (percent / 100.0).min(1.0)
    }

    // -- Overlay ---------------------------------------------------------

    /// The cached overlay notification corner. Never re-queried; see
    /// [`OverlayPositionCache`] for when this can go stale.
    pub fn overlay_notification_position(&self) -> NotificationPosition {
        self.overlay.get()
    }

    /// Moves overlay notifications to `position`, updating the cache.
    ///
    /// Outside a game context the native layer ignores this, while the
    /// cache still records it.
    pub fn set_overlay_notification_position(&self, position: NotificationPosition) {
        self.overlay.set(self.native.as_ref(), position);
    }

    /// Inset of notifications from the configured corner, in pixels.
    pub fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32) {
        self.native.set_overlay_notification_inset(horizontal, vertical);
    }

    /// `true` once the overlay process is running and hooked into the game.
    /// Stays `false` for the first few seconds while it loads.
    pub fn is_overlay_enabled(&self) -> bool {
        self.native.is_overlay_enabled()
    }

    /// Event-driven renderers poll this (around 33 Hz) and present a frame
    /// whenever it returns `true`, so the overlay can draw.
    pub fn overlay_needs_present(&self) -> bool {
        self.native.overlay_needs_present()
    }

    // -- VR and big picture ----------------------------------------------

    pub fn is_running_in_vr(&self) -> bool {
        self.native.is_running_in_vr()
    }

    pub fn is_in_big_picture_mode(&self) -> bool {
        self.native.is_in_big_picture_mode()
    }

    pub fn start_vr_dashboard(&self) {
        self.native.start_vr_dashboard();
    }

    /// Whether the headset view (rather than the desktop window) is
    /// streamed during in-home streaming.
    pub fn vr_headset_streaming(&self) -> bool {
        self.native.is_vr_headset_streaming_enabled()
    }

    pub fn set_vr_headset_streaming(&self, enabled: bool) {
        self.native.set_vr_headset_streaming_enabled(enabled);
    }

    // -- Gamepad text ----------------------------------------------------

    /// Opens the big picture text dialog. Only gamepad input is supported.
    pub fn show_gamepad_text_input(
        &self,
        mode: GamepadTextInputMode,
        line_mode: GamepadTextInputLineMode,
        description: &str,
        max_chars: u32,
        existing_text: &str,
    ) -> bool {
        self.native
            .show_gamepad_text_input(mode, line_mode, description, max_chars, existing_text)
    }

    /// The text submitted through the last gamepad dialog.
    ///
    /// Empty when nothing was submitted or the copy fails.
    pub fn entered_gamepad_text(&self) -> String {
        let len = self.native.entered_gamepad_text_length();
        if len == 0 {
            return String::new();
        }

        let mut buf = vec![0u8; len as usize];
        if !self.native.entered_gamepad_text(&mut buf) {
            tracing::debug!(len, "gamepad text copy failed");
            return String::new();
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        String::from_utf8_lossy(&buf[..end]).into_owned()
    }

    // -- Async calls -----------------------------------------------------

    /// Checks whether the executable at `path` carries a valid signature.
    ///
    /// Resolves once [`pump_calls`](Self::pump_calls) observes completion.
    ///
    /// # Errors
    /// - [`UtilsError::InvalidCall`]: `path` isn't valid UTF-8, or the
    ///   native layer refused the call
    /// - [`UtilsError::CallFailed`]: the call completed with no value
    pub async fn check_file_signature(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<FileSignature, UtilsError> {
        const CALL: &str = "check_file_signature";

        let Some(path) = path.as_ref().to_str() else {
            tracing::warn!(path = %path.as_ref().display(), "file signature path is not UTF-8");
            return Err(UtilsError::InvalidCall(CALL));
        };
        let handle = self.native.check_file_signature(path);
        if !handle.is_valid() {
            return Err(UtilsError::InvalidCall(CALL));
        }
        tracing::debug!(%handle, path = %path, "file signature check started");

        let result = self
            .calls
            .register::<CheckFileSignatureResult>(handle)
            .await
            .ok_or(UtilsError::CallFailed { call: CALL, handle })?;
        Ok(result.signature)
    }

    /// Resolves every async call that has completed since the last pump.
    pub fn pump_calls(&self) -> usize {
        self.calls.pump()
    }

    /// The underlying call registry, for result types this facade doesn't
    /// wrap.
    pub fn call_results(&self) -> &CallResults<N> {
        &self.calls
    }

    // -- Events ----------------------------------------------------------

    /// Routes a raw native callback to subscribers.
    ///
    /// Returns `true` if the callback belonged to this facade.
    pub fn handle_callback(&self, callback: &Callback) -> bool {
        let Some(event) = UtilsEvent::from_callback(callback) else {
            return false;
        };
        match event {
            UtilsEvent::Shutdown => tracing::info!("platform requested shutdown"),
            UtilsEvent::LowBatteryPower { minutes_left } => {
                tracing::warn!(minutes_left, "battery low");
            }
            _ => tracing::debug!(?event, "utility event"),
        }
        let _ = self.events.send(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use platkit_native::LoopbackNative;
    use platkit_types::PeerId;

    use super::*;

    fn utils() -> (Utils<LoopbackNative>, Arc<LoopbackNative>) {
        let native = Arc::new(LoopbackNative::standalone(PeerId(1)));
        (Utils::new(Arc::clone(&native), &UtilsConfig::default()), native)
    }

    // =====================================================================
    // Getters
    // =====================================================================

    #[test]
    fn test_forwarding_getters_report_native_state() {
        let (utils, native) = utils();
        native.with_utils(|u| {
            u.seconds_since_app_active = 12;
            u.seconds_since_computer_active = 340;
            u.ip_country = "SE".into();
            u.ui_language = "swedish".into();
            u.app_id = 730;
            u.running_in_vr = true;
        });

        assert_eq!(utils.seconds_since_app_active(), 12);
        assert_eq!(utils.seconds_since_computer_active(), 340);
        assert_eq!(utils.ip_country(), "SE");
        assert_eq!(utils.ui_language(), "swedish");
        assert_eq!(utils.app_id(), AppId(730));
        assert!(utils.is_running_in_vr());
        assert!(!utils.is_in_big_picture_mode());
    }

    #[test]
    fn test_connected_universe_unknown_value_maps_to_invalid() {
        let (utils, native) = utils();
        assert_eq!(utils.connected_universe(), Universe::Public);

        native.with_utils(|u| u.universe = 42);
        assert_eq!(utils.connected_universe(), Universe::Invalid);
    }

    #[test]
    fn test_server_time_converts_unix_seconds() {
        let (utils, native) = utils();
        native.with_utils(|u| u.server_time = 1_700_000_000);

        assert_eq!(utils.server_time().timestamp(), 1_700_000_000);
    }

    // =====================================================================
    // Battery
    // =====================================================================

    #[test]
    fn test_battery_on_ac_power() {
        let (utils, _) = utils();

        assert!(!utils.using_battery_power());
        assert_eq!(utils.current_battery_power(), 1.0);
    }

    #[test]
    fn test_battery_fraction_is_fractional() {
        let (utils, native) = utils();
        native.with_utils(|u| u.battery_percent = 42);

        assert!(utils.using_battery_power());
        assert!((utils.current_battery_power() - 0.42).abs() < 1e-6);
    }

    // =====================================================================
    // Images
    // =====================================================================

    #[test]
    fn test_image_copies_rgba() {
        let (utils, native) = utils();
        native.with_utils(|u| {
            u.images.insert(3, (1, 2, vec![9, 8, 7, 6, 5, 4, 3, 2]));
        });

        let image = utils.image(3).expect("image exists");

        assert_eq!((image.width, image.height), (1, 2));
        assert_eq!(image.pixel(0, 1), Some([5, 4, 3, 2]));
    }

    #[test]
    fn test_image_missing_returns_none() {
        let (utils, _) = utils();
        assert_eq!(utils.image_size(1), None);
        assert_eq!(utils.image(1), None);
    }

    #[test]
    fn test_image_copy_failure_returns_none() {
        let (utils, native) = utils();
        // Reported size doesn't match the stored bytes, so the copy fails.
        native.with_utils(|u| {
            u.images.insert(3, (4, 4, vec![0; 3]));
        });
        assert!(utils.image_size(3).is_some());
        assert_eq!(utils.image(3), None);
    }

    #[test]
    fn test_image_oversized_dimensions_returns_none() {
        let (utils, native) = utils();
        native.with_utils(|u| {
            u.images.insert(5, (0x8000_0000, 0x8000_0000, Vec::new()));
        });

        assert_eq!(utils.image_size(5), Some((0x8000_0000, 0x8000_0000)));
        assert_eq!(utils.image(5), None);
    }

    // =====================================================================
    // Overlay
    // =====================================================================

    #[test]
    fn test_overlay_position_read_after_write_returns_value_set() {
        let (utils, native) = utils();

        for position in [
            NotificationPosition::TopLeft,
            NotificationPosition::BottomLeft,
            NotificationPosition::TopRight,
        ] {
            utils.set_overlay_notification_position(position);
            native.with_utils(|u| u.overlay_position = NotificationPosition::BottomRight);
            assert_eq!(utils.overlay_notification_position(), position);
        }
    }

    #[test]
    fn test_overlay_position_push_on_start() {
        let native = Arc::new(LoopbackNative::standalone(PeerId(1)));
        let config = UtilsConfig {
            overlay_position: NotificationPosition::TopLeft,
            push_overlay_on_start: true,
            ..UtilsConfig::default()
        };

        let utils = Utils::new(Arc::clone(&native), &config);

        assert_eq!(utils.overlay_notification_position(), NotificationPosition::TopLeft);
        assert_eq!(
            native.with_utils(|u| u.overlay_position),
            NotificationPosition::TopLeft
        );
    }

    #[test]
    fn test_overlay_inset_and_vr_streaming_forward() {
        let (utils, native) = utils();

        utils.set_overlay_notification_inset(16, 8);
        utils.set_vr_headset_streaming(false);
        utils.start_vr_dashboard();

        assert!(!utils.vr_headset_streaming());
        native.with_utils(|u| {
            assert_eq!(u.overlay_inset, (16, 8));
            assert!(u.vr_dashboard_started);
        });
    }

    // =====================================================================
    // Gamepad text
    // =====================================================================

    #[test]
    fn test_entered_gamepad_text_none_entered_returns_empty() {
        let (utils, _) = utils();
        assert_eq!(utils.entered_gamepad_text(), "");
    }

    #[test]
    fn test_entered_gamepad_text_strips_nul() {
        let (utils, native) = utils();
        native.with_utils(|u| u.gamepad_text = Some("héllo".into()));

        assert_eq!(utils.entered_gamepad_text(), "héllo");
    }

    #[test]
    fn test_entered_gamepad_text_fetch_failure_returns_empty() {
        let (utils, native) = utils();
        native.with_utils(|u| {
            u.gamepad_text = Some("secret".into());
            u.gamepad_text_fetch_fails = true;
        });

        assert_eq!(utils.entered_gamepad_text(), "");
    }

    #[test]
    fn test_show_gamepad_text_input_seeds_existing_text() {
        let (utils, _) = utils();

        assert!(utils.show_gamepad_text_input(
            GamepadTextInputMode::Normal,
            GamepadTextInputLineMode::SingleLine,
            "Name your base",
            32,
            "Outpost",
        ));
        assert_eq!(utils.entered_gamepad_text(), "Outpost");
        // A second dialog can't open over the first.
        assert!(!utils.show_gamepad_text_input(
            GamepadTextInputMode::Password,
            GamepadTextInputLineMode::SingleLine,
            "PIN",
            4,
            "",
        ));
    }

    // =====================================================================
    // Events
    // =====================================================================

    #[test]
    fn test_handle_callback_broadcasts_utils_event() {
        let (utils, _) = utils();
        let mut rx = utils.subscribe();

        assert!(utils.handle_callback(&Callback::GamepadTextInputDismissed {
            submitted: true
        }));
        assert!(!utils.handle_callback(&Callback::P2pSessionRequest {
            remote: PeerId(2)
        }));

        assert_eq!(
            rx.try_recv().unwrap(),
            UtilsEvent::GamepadTextInputDismissed { submitted: true }
        );
        assert!(rx.try_recv().is_err());
    }
}

//! Client configuration.

use std::time::Duration;

use platkit_types::{AppId, NotificationPosition};
use platkit_utils::UtilsConfig;
use serde::{Deserialize, Serialize};

use crate::PlatformError;

/// Settings for a [`PlatformClient`](crate::PlatformClient).
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// App the client expects to run as. `None` accepts whatever the
    /// native layer reports.
    pub app_id: Option<AppId>,

    /// Buffer size of each facade's event broadcast. Subscribers that
    /// fall further behind than this miss events.
    pub event_capacity: usize,

    /// Initial overlay notification corner held by the position cache.
    pub overlay_position: NotificationPosition,

    /// Push `overlay_position` to the native layer when the client starts.
    pub push_overlay_on_start: bool,

    /// Rate of the optional [`CallbackPump`](crate::CallbackPump) in Hz.
    /// 0 disables it; the host calls `run_callbacks` itself.
    pub pump_rate_hz: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            event_capacity: 64,
            overlay_position: NotificationPosition::BottomRight,
            push_overlay_on_start: false,
            pump_rate_hz: 60,
        }
    }
}

impl ClientConfig {
    /// Highest supported pump rate.
    pub const MAX_PUMP_RATE_HZ: u32 = 240;

    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PlatformError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Clamps out-of-range values.
    ///
    /// - `pump_rate_hz` capped to [`Self::MAX_PUMP_RATE_HZ`].
    /// - `event_capacity` raised to at least 1.
    pub fn validated(mut self) -> Self {
        if self.pump_rate_hz > Self::MAX_PUMP_RATE_HZ {
            tracing::warn!(
                rate = self.pump_rate_hz,
                max = Self::MAX_PUMP_RATE_HZ,
                "pump_rate_hz exceeds maximum, clamping"
            );
            self.pump_rate_hz = Self::MAX_PUMP_RATE_HZ;
        }
        self.event_capacity = self.event_capacity.max(1);
        self
    }

    /// Interval between pump runs. `None` when the pump is disabled.
    pub fn pump_period(&self) -> Option<Duration> {
        (self.pump_rate_hz > 0)
            .then(|| Duration::from_nanos(1_000_000_000 / u64::from(self.pump_rate_hz)))
    }

    pub(crate) fn utils_config(&self) -> UtilsConfig {
        UtilsConfig {
            event_capacity: self.event_capacity,
            overlay_position: self.overlay_position,
            push_overlay_on_start: self.push_overlay_on_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ClientConfig::default();
        assert_eq!(config.app_id, None);
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.overlay_position, NotificationPosition::BottomRight);
        assert_eq!(config.pump_rate_hz, 60);
    }

    #[test]
    fn test_from_json_str_fills_defaults() {
        let config =
            ClientConfig::from_json_str(r#"{ "app_id": 480, "pump_rate_hz": 30 }"#).unwrap();
        assert_eq!(config.app_id, Some(AppId(480)));
        assert_eq!(config.pump_rate_hz, 30);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_from_json_str_invalid_is_config_error() {
        let err = ClientConfig::from_json_str(r#"{ "pump_rate_hz": "fast" }"#).unwrap_err();
        assert!(matches!(err, PlatformError::Config(_)));
    }

    #[test]
    fn test_validated_clamps_rate_and_capacity() {
        let config = ClientConfig {
            pump_rate_hz: 10_000,
            event_capacity: 0,
            ..ClientConfig::default()
        }
        .validated();
        assert_eq!(config.pump_rate_hz, ClientConfig::MAX_PUMP_RATE_HZ);
        assert_eq!(config.event_capacity, 1);
    }

    #[test]
    fn test_pump_period_zero_rate_is_none() {
        let config = ClientConfig {
            pump_rate_hz: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.pump_period(), None);
    }

    #[test]
    fn test_pump_period_matches_rate() {
        let config = ClientConfig {
            pump_rate_hz: 50,
            ..ClientConfig::default()
        };
        assert_eq!(config.pump_period(), Some(Duration::from_millis(20)));
    }
}

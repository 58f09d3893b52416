//! Utilities facade configuration.

use platkit_types::NotificationPosition;
use serde::{Deserialize, Serialize};

/// Settings for a [`Utils`](crate::Utils) facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilsConfig {
    /// Buffer size of the utility event broadcast.
    pub event_capacity: usize,

    /// The value the overlay position cache starts with.
    pub overlay_position: NotificationPosition,

    /// Push `overlay_position` to the native layer at construction, so the
    /// cache and the native state start out agreeing.
    pub push_overlay_on_start: bool,
}

impl Default for UtilsConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            overlay_position: NotificationPosition::BottomRight,
            push_overlay_on_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_native_overlay_default() {
        let config = UtilsConfig::default();
        assert_eq!(config.overlay_position, NotificationPosition::BottomRight);
        assert!(!config.push_overlay_on_start);
    }

    #[test]
    fn test_deserialize_partial_fills_defaults() {
        let config: UtilsConfig =
            serde_json::from_str(r#"{ "overlay_position": "TopLeft" }"#).unwrap();
        assert_eq!(config.overlay_position, NotificationPosition::TopLeft);
        assert_eq!(config.event_capacity, 64);
    }
}

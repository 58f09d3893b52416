//! Write-through cache for the overlay notification position.

use parking_lot::RwLock;
use platkit_native::NativeUtils;
use platkit_types::NotificationPosition;

/// The overlay notification corner, as last set through this cache.
///
/// The native layer has a setter but no getter for this value, so the
/// facade remembers what it pushed:
///
/// - [`set`](Self::set) updates the cache and then pushes the value down.
/// - [`get`](Self::get) returns the cache and never re-queries.
///
/// # Staleness
///
/// Anything that changes the position without going through this cache
/// (another binding in the same process, the native layer resetting it
/// outside a game context) is invisible here. `get` keeps returning the
/// last value set through `set` until the next `set`.
#[derive(Debug)]
pub struct OverlayPositionCache {
    position: RwLock<NotificationPosition>,
}

impl OverlayPositionCache {
    /// Creates a cache holding `initial`. Nothing is pushed to the native
    /// layer.
    pub fn new(initial: NotificationPosition) -> Self {
        Self {
            position: RwLock::new(initial),
        }
    }

    /// The cached position.
    pub fn get(&self) -> NotificationPosition {
        *self.position.read()
    }

    /// Caches `position` and pushes it to the native layer.
    pub fn set<N: NativeUtils + ?Sized>(&self, native: &N, position: NotificationPosition) {
        let mut cached = self.position.write();
        *cached = position;
        native.set_overlay_notification_position(position);
        tracing::debug!(?position, "overlay notification position set");
    }
}

impl Default for OverlayPositionCache {
    fn default() -> Self {
        Self::new(NotificationPosition::default())
    }
}

//! `PlatformClient` builder and callback dispatch.
//!
//! The client is the one place the native layer, the facades and the
//! callback queue meet:
//!
//! ```text
//! native callbacks ──→ run_callbacks() ──→ dispatch() ──→ P2p events
//!                            │                      └──→ Utils events
//!                            └──→ Utils::pump_calls() ──→ CallResult futures
//! ```

use std::sync::Arc;

use platkit_native::{Callback, Native};
use platkit_p2p::P2p;
use platkit_types::{AppId, NotificationPosition};
use platkit_utils::Utils;

use crate::{CallbackPump, ClientConfig, PlatformError};

/// Builder for a [`PlatformClient`].
///
/// # Example
///
/// ```rust,ignore
/// let client = PlatformClient::builder()
///     .app_id(AppId(480))
///     .pump_rate_hz(0)
///     .build(Arc::new(native))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlatformClientBuilder {
    config: ClientConfig,
}

impl PlatformClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Requires the native layer to run as `app_id`.
    pub fn app_id(mut self, app_id: AppId) -> Self {
        self.config.app_id = Some(app_id);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn overlay_position(mut self, position: NotificationPosition) -> Self {
        self.config.overlay_position = position;
        self
    }

    pub fn pump_rate_hz(mut self, rate: u32) -> Self {
        self.config.pump_rate_hz = rate;
        self
    }

    /// Builds the client over an initialised native layer.
    ///
    /// # Errors
    ///
    /// [`PlatformError::AppIdMismatch`] if an app id was configured and the
    /// native layer reports a different one.
    pub fn build<N: Native>(self, native: Arc<N>) -> Result<PlatformClient<N>, PlatformError> {
        let config = self.config.validated();

        let actual = AppId(native.app_id());
        match config.app_id {
            Some(expected) if expected != actual => {
                return Err(PlatformError::AppIdMismatch { expected, actual });
            }
            _ => {}
        }

        let p2p = P2p::new(Arc::clone(&native), config.event_capacity);
        let utils = Utils::new(Arc::clone(&native), &config.utils_config());

        tracing::info!(
            app = %actual,
            event_capacity = config.event_capacity,
            pump_rate_hz = config.pump_rate_hz,
            "platform client started"
        );

        Ok(PlatformClient {
            native,
            p2p,
            utils,
            config,
        })
    }
}

/// The process's handle on the platform.
///
/// Built once at startup and passed to whatever needs it. Share it behind an
/// `Arc` to use it from several tasks or to run a [`CallbackPump`].
pub struct PlatformClient<N> {
    native: Arc<N>,
    p2p: P2p<N>,
    utils: Utils<N>,
    config: ClientConfig,
}

impl PlatformClient<()> {
    /// Creates a new builder. Not generic, so `PlatformClient::builder()`
    /// needs no type annotations.
    pub fn builder() -> PlatformClientBuilder {
        PlatformClientBuilder::new()
    }
}

impl<N: Native> PlatformClient<N> {
    /// Peer messaging.
    pub fn p2p(&self) -> &P2p<N> {
        &self.p2p
    }

    /// Host queries, overlay control and async utility calls.
    pub fn utils(&self) -> &Utils<N> {
        &self.utils
    }

    pub fn native(&self) -> &Arc<N> {
        &self.native
    }

    /// The validated configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Routes one native callback to the facade that owns it.
    ///
    /// Returns `false` if no facade claimed it.
    pub fn dispatch(&self, callback: &Callback) -> bool {
        if self.p2p.handle_callback(callback) || self.utils.handle_callback(callback) {
            return true;
        }
        tracing::trace!(?callback, "callback not routed");
        false
    }

    /// Drains the native callback queue, then polls pending async calls.
    ///
    /// Call this once per frame, or let a [`CallbackPump`] do it. Returns
    /// the number of callbacks routed.
    pub fn run_callbacks(&self) -> usize {
        let mut routed = 0;
        while let Some(callback) = self.native.next_callback() {
            if self.dispatch(&callback) {
                routed += 1;
            }
        }
        self.utils.pump_calls();
        routed
    }

    /// Starts a [`CallbackPump`] at the configured rate. `None` when
    /// `pump_rate_hz` is 0.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_pump(self: &Arc<Self>) -> Option<CallbackPump> {
        let period = self.config.pump_period()?;
        Some(CallbackPump::start(Arc::clone(self), period))
    }

    /// Tears the client down.
    ///
    /// Pending async calls are abandoned and their futures resolve to
    /// `None`. Event subscribers see their channels close.
    pub fn shutdown(self) {
        let pending = self.utils.call_results().pending();
        if pending > 0 {
            tracing::warn!(pending, "shutting down with async calls in flight");
        }
        tracing::info!("platform client shut down");
    }
}

impl<N> std::fmt::Debug for PlatformClient<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

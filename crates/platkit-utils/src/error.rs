//! Error types for the utilities facade.

use platkit_types::AsyncCallHandle;

/// Errors surfaced by the async utility calls.
///
/// Everything else on the facade reports failure through `bool` or
/// `Option`, the way the native layer does.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// The native layer refused to start the call and handed back the
    /// invalid handle.
    #[error("native call {0} could not be started")]
    InvalidCall(&'static str),

    /// The call completed but produced no value. Nothing local can recover
    /// from this.
    #[error("native call {call} ({handle}) completed without a result")]
    CallFailed {
        call: &'static str,
        handle: AsyncCallHandle,
    },
}

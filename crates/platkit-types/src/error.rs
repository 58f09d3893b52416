//! Error types for converting raw native values.

/// Errors raised while turning a raw native value into a typed one.
///
/// The native layer speaks in plain integers. When one of those integers
/// has no matching enum variant we refuse to guess.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// A discriminant that does not map to any variant of `kind`.
    #[error("unknown {kind} value {value}")]
    UnknownValue {
        /// Name of the target type, for the error message.
        kind: &'static str,
        /// The raw value the native layer reported.
        value: i32,
    },
}

//! Fixed-layout results of asynchronous native calls.
//!
//! When an async call completes, the native layer copies its result struct
//! into a caller-supplied buffer. Each result type knows its callback id,
//! the exact byte size of that struct, and how to decode it.

use byteorder::{LittleEndian, ReadBytesExt};
use platkit_types::FileSignature;

/// Callback id base for the utilities interface.
pub const UTILS_CALLBACKS: i32 = 700;

/// A typed result that an asynchronous native call can produce.
pub trait CallbackResult: Sized + Send + 'static {
    /// The id the native layer tags this result with.
    const CALLBACK_ID: i32;

    /// Size in bytes of the native result struct.
    const SIZE: usize;

    /// Decodes the little-endian native struct. `bytes.len()` is
    /// always [`SIZE`](Self::SIZE).
    fn decode(bytes: &[u8]) -> Option<Self>;
}

/// Result of a file signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckFileSignatureResult {
    pub signature: FileSignature,
}

impl CallbackResult for CheckFileSignatureResult {
    const CALLBACK_ID: i32 = UTILS_CALLBACKS + 5;
    const SIZE: usize = 4;

    fn decode(mut bytes: &[u8]) -> Option<Self> {
        let raw = bytes.read_i32::<LittleEndian>().ok()?;
        let signature = FileSignature::try_from(raw).ok()?;
        Some(Self { signature })
    }
}

//! Platform enums and the decoded image type.
//!
//! Each enum here mirrors a native enum value-for-value, so converting to
//! the native side is `as i32` and converting back goes through
//! `TryFrom<i32>`.

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// Implements `TryFrom<i32>` for a fieldless native enum.
macro_rules! native_enum_try_from {
    ($ty:ident { $($value:literal => $variant:ident),+ $(,)? }) => {
        impl TryFrom<i32> for $ty {
            type Error = TypeError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(TypeError::UnknownValue {
                        kind: stringify!($ty),
                        value,
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// NotificationPosition
// ---------------------------------------------------------------------------

/// Screen corner where the overlay shows its notifications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum NotificationPosition {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    /// The native default, and the value the facade caches until told
    /// otherwise.
    #[default]
    BottomRight = 3,
}

native_enum_try_from!(NotificationPosition {
    0 => TopLeft,
    1 => TopRight,
    2 => BottomLeft,
    3 => BottomRight,
});

// ---------------------------------------------------------------------------
// Universe
// ---------------------------------------------------------------------------

/// Which backend universe the client is connected to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum Universe {
    #[default]
    Invalid = 0,
    Public = 1,
    Beta = 2,
    Internal = 3,
    Dev = 4,
}

native_enum_try_from!(Universe {
    0 => Invalid,
    1 => Public,
    2 => Beta,
    3 => Internal,
    4 => Dev,
});

// ---------------------------------------------------------------------------
// Gamepad text input
// ---------------------------------------------------------------------------

/// Whether the gamepad text dialog masks what the user types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum GamepadTextInputMode {
    #[default]
    Normal = 0,
    Password = 1,
}

/// Whether the gamepad text dialog accepts line breaks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum GamepadTextInputLineMode {
    #[default]
    SingleLine = 0,
    MultipleLines = 1,
}

// ---------------------------------------------------------------------------
// FileSignature
// ---------------------------------------------------------------------------

/// Outcome of an executable signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FileSignature {
    InvalidSignature = 0,
    ValidSignature = 1,
    FileNotFound = 2,
    NoSignaturesFoundForThisApp = 3,
    NoSignaturesFoundForThisFile = 4,
}

native_enum_try_from!(FileSignature {
    0 => InvalidSignature,
    1 => ValidSignature,
    2 => FileNotFound,
    3 => NoSignaturesFoundForThisApp,
    4 => NoSignaturesFoundForThisFile,
});

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// An RGBA image copied out of the native image cache.
///
/// `data.len()` is always `width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    /// Number of bytes an RGBA image of the given size occupies, or `None`
    /// if that doesn't fit in `usize`.
    pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
        usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?
            .checked_mul(4)
    }

    /// Returns the RGBA quadruple at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(at..at + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

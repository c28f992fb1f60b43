//! # Colors
//!
//! Every pixel in a document is a straight (non-premultiplied) 32-bit `0xAARRGGBB` value.

/// A packed, straight-alpha ARGB color.
///
/// Alpha 0 is fully transparent, 255 fully opaque. Unlike premultiplied representations,
/// transparent colors are *not* normalized, `0x00FF0000` and `0x00000000` are distinct pixels.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    bytemuck::Pod,
    bytemuck::Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Argb(pub u32);
impl Argb {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    #[must_use]
    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self((alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }
    /// Fully opaque color.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(0xFF, red, green, blue)
    }
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
    /// `[a, r, g, b]`
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
    /// `[r, g, b, a]`, the byte order most image encoders expect.
    #[must_use]
    pub const fn to_rgba_bytes(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }
}
impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<Argb> for u32 {
    fn from(value: Argb) -> Self {
        value.0
    }
}
impl std::fmt::Debug for Argb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Argb(#{:08X})", self.0)
    }
}
impl std::fmt::Display for Argb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("expected 6 or 8 hex digits, found {0}")]
    BadLength(usize),
    #[error("invalid hex digits in {0:?}")]
    BadDigit(String),
}

/// Parses `#RRGGBB`, `#AARRGGBB`, or either without the leading `#`.
/// Six digit forms are opaque.
impl std::str::FromStr for Argb {
    type Err = ParseColorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        // from_str_radix accepts a leading '+', which we don't.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::BadDigit(s.to_owned()));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| ParseColorError::BadDigit(s.to_owned()));
        match hex.len() {
            6 => Ok(Self(0xFF00_0000 | value?)),
            8 => Ok(Self(value?)),
            len => Err(ParseColorError::BadLength(len)),
        }
    }
}

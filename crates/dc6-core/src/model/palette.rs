use serde::{Deserialize, Serialize};

use crate::format::error::Dc6Error;
use crate::format::layout::{PALETTE_CHANNELS, PALETTE_ENTRIES};

/// A 256-entry RGBA color table indexed by frame pixel values.
///
/// Serializes as a JSON array of 256 `[r, g, b, a]` arrays; deserializing
/// applies the same shape check as [`Palette::from_rows`].
///
/// # Examples
/// ```
/// use dc6_core::Palette;
///
/// let palette = Palette::grayscale();
/// assert_eq!(palette.color(42), [42, 42, 42, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<[u8; 4]>")]
pub struct Palette {
    entries: Vec<[u8; PALETTE_CHANNELS]>,
}

/// The palette used when an animation has none: entry `i` is `(i, i, i, 255)`.
pub fn default_palette() -> Palette {
    Palette::grayscale()
}

impl Palette {
    pub fn grayscale() -> Self {
        let entries = (0..PALETTE_ENTRIES)
            .map(|i| {
                let level = i as u8;
                [level, level, level, u8::MAX]
            })
            .collect();
        Self { entries }
    }

    /// Build a palette from exactly 256 rows of exactly 4 channels.
    ///
    /// # Errors
    /// Returns `Dc6Error::PaletteShapeMismatch` for any other shape.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, Dc6Error> {
        let bad_row = rows
            .iter()
            .map(|row| row.as_ref().len())
            .find(|&channels| channels != PALETTE_CHANNELS);
        if rows.len() != PALETTE_ENTRIES || bad_row.is_some() {
            return Err(Dc6Error::PaletteShapeMismatch {
                entries: rows.len(),
                channels: bad_row.unwrap_or(PALETTE_CHANNELS),
            });
        }

        let entries = rows
            .iter()
            .map(|row| {
                let mut entry = [0u8; PALETTE_CHANNELS];
                entry.copy_from_slice(row.as_ref());
                entry
            })
            .collect();
        Ok(Self { entries })
    }

    /// Build a palette from 1024 packed RGBA bytes.
    pub fn from_rgba_bytes(bytes: &[u8]) -> Result<Self, Dc6Error> {
        if bytes.len() != PALETTE_ENTRIES * PALETTE_CHANNELS {
            return Err(Dc6Error::PaletteShapeMismatch {
                entries: bytes.len() / PALETTE_CHANNELS,
                channels: PALETTE_CHANNELS,
            });
        }
        let rows: Vec<&[u8]> = bytes.chunks(PALETTE_CHANNELS).collect();
        Self::from_rows(&rows)
    }

    pub fn color(&self, index: u8) -> [u8; PALETTE_CHANNELS] {
        self.entries[usize::from(index)]
    }

    pub fn entries(&self) -> &[[u8; PALETTE_CHANNELS]] {
        &self.entries
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Palette {
    type Error = Dc6Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Palette> for Vec<[u8; PALETTE_CHANNELS]> {
    fn from(palette: Palette) -> Self {
        palette.entries
    }
}

use crate::FrameSnapshot;
use crate::format::error::FrameError;
use crate::format::frame::{decode_frame, encode_frame};
use crate::format::layout::FRAME_TERMINATOR_LEN;

use super::palette::Palette;

/// One bitmap of an animation, held both as its scanline stream and as a
/// decoded index buffer.
///
/// Dimensions, pixels and the stream only change together, through
/// [`Frame::from_pixels`], [`Frame::from_compressed`] and
/// [`Frame::set_pixels`]. The remaining header fields are carried through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Non-zero when rows are mirrored relative to storage order.
    pub flipped: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub unknown: u32,
    pub next_block: u32,
    pub terminator: [u8; FRAME_TERMINATOR_LEN],
    width: u32,
    height: u32,
    compressed: Vec<u8>,
    pixels: Vec<u8>,
}

impl Frame {
    /// Build a frame from a top-row-first index buffer.
    ///
    /// # Examples
    /// ```
    /// use dc6_core::Frame;
    ///
    /// let frame = Frame::from_pixels(2, 2, vec![5, 0, 0, 7]).unwrap();
    /// assert_eq!(frame.raw_length(), frame.compressed().len());
    /// assert_eq!(frame.pixels(), &[5, 0, 0, 7]);
    /// ```
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let compressed = encode_frame(&pixels, width, height)?;
        Ok(Self::with_buffers(width, height, compressed, pixels))
    }

    /// Build a frame from a scanline stream, decoding it immediately.
    pub fn from_compressed(
        width: u32,
        height: u32,
        compressed: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let pixels = decode_frame(&compressed, width, height)?;
        Ok(Self::with_buffers(width, height, compressed, pixels))
    }

    fn with_buffers(width: u32, height: u32, compressed: Vec<u8>, pixels: Vec<u8>) -> Self {
        Self {
            flipped: 0,
            offset_x: 0,
            offset_y: 0,
            unknown: 0,
            next_block: 0,
            terminator: [0; FRAME_TERMINATOR_LEN],
            width,
            height,
            compressed,
            pixels,
        }
    }

    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_flipped(mut self, flipped: bool) -> Self {
        self.flipped = u32::from(flipped);
        self
    }

    /// Replace the pixels (same dimensions) and re-encode the stream.
    pub fn set_pixels(&mut self, pixels: Vec<u8>) -> Result<(), FrameError> {
        self.compressed = encode_frame(&pixels, self.width, self.height)?;
        self.pixels = pixels;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped != 0
    }

    /// Top-row-first palette indices, `width * height` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn compressed(&self) -> &[u8] {
        &self.compressed
    }

    pub fn raw_length(&self) -> usize {
        self.compressed.len()
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Translate the index buffer into row-major RGBA8 through `palette`.
    pub fn to_rgba(&self, palette: &Palette) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&index| palette.color(index))
            .collect()
    }

    pub fn snapshot(&self, include_pixels: bool) -> FrameSnapshot {
        FrameSnapshot {
            flipped: self.flipped,
            width: self.width,
            height: self.height,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            unknown: self.unknown,
            next_block: self.next_block,
            raw_length: self.raw_length() as u64,
            terminator: self.terminator,
            pixels: include_pixels.then(|| self.pixels.clone()),
        }
    }
}

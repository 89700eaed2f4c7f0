use tracing::{debug, trace, warn};

use super::error::Dc6Error;
use super::frame::pixel_count;
use super::layout;
use super::reader::ByteCursor;
use crate::model::{Animation, Direction, Frame};

/// Limits applied while decoding untrusted input.
///
/// # Examples
/// ```
/// use dc6_core::DecodeOptions;
///
/// let strict = DecodeOptions {
///     allow_trailing_bytes: false,
///     ..DecodeOptions::default()
/// };
/// assert!(strict.max_frame_pixels > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Largest `width * height` accepted for a single frame.
    pub max_frame_pixels: usize,
    /// Accept (and log) bytes left over after the last frame.
    pub allow_trailing_bytes: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_frame_pixels: layout::DEFAULT_MAX_FRAME_PIXELS,
            allow_trailing_bytes: true,
        }
    }
}

/// The fixed 16-byte file header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub version: i32,
    pub flags: u32,
    pub encoding: u32,
    pub termination: [u8; layout::TERMINATION_LEN],
}

/// Decode a complete DC6 buffer with default options.
///
/// # Examples
/// ```
/// use dc6_core::{Animation, Direction, Frame, decode, encode};
///
/// let mut animation = Animation::default();
/// animation.version = 6;
/// animation
///     .directions
///     .push(Direction::new(vec![Frame::from_pixels(2, 2, vec![5, 0, 0, 7]).unwrap()]));
///
/// let bytes = encode(&animation).unwrap();
/// let decoded = decode(&bytes).unwrap();
/// assert_eq!(decoded.version, 6);
/// assert_eq!(decoded.frame(0, 0).unwrap().pixels(), &[5, 0, 0, 7]);
/// ```
///
/// # Errors
/// Returns `Dc6Error` on truncated input, invalid counts, or a frame whose
/// scanline stream does not fit its dimensions. Nothing is returned for a
/// partially decoded file.
pub fn decode(bytes: &[u8]) -> Result<Animation, Dc6Error> {
    decode_with(bytes, &DecodeOptions::default())
}

pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Animation, Dc6Error> {
    let mut cursor = ByteCursor::new(bytes);
    let header = decode_header(&mut cursor)?;
    let directions = decode_body(&mut cursor, options)?;

    if !cursor.is_exhausted() {
        let offset = cursor.offset();
        let count = cursor.remaining();
        if !options.allow_trailing_bytes {
            return Err(Dc6Error::TrailingBytes { offset, count });
        }
        warn!(offset, count, "ignoring bytes after the last frame");
    }

    let mut animation = Animation::from_header(header);
    animation.directions = directions;
    Ok(animation)
}

/// Read the 16-byte header at the cursor.
pub fn decode_header(cursor: &mut ByteCursor<'_>) -> Result<Header, Dc6Error> {
    cursor.require(layout::HEADER_LEN)?;
    let header = Header {
        version: cursor.read_i32_le()?,
        flags: cursor.read_u32_le()?,
        encoding: cursor.read_u32_le()?,
        termination: cursor.read_array()?,
    };
    debug!(
        version = header.version,
        flags = header.flags,
        encoding = header.encoding,
        "decoded header"
    );
    Ok(header)
}

/// Read the direction/frame counts, the frame-pointer table and every frame
/// record that follows.
pub fn decode_body(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<Vec<Direction>, Dc6Error> {
    let direction_count = cursor.read_u32_le()?;
    let frames_per_direction = cursor.read_u32_le()?;
    if direction_count == 0 {
        return Err(Dc6Error::InvalidCount {
            field: "direction count",
            value: 0,
        });
    }
    if frames_per_direction == 0 {
        return Err(Dc6Error::InvalidCount {
            field: "frames per direction",
            value: 0,
        });
    }

    let total = u64::from(direction_count) * u64::from(frames_per_direction);
    if total > layout::MAX_FRAME_COUNT {
        return Err(Dc6Error::ImplausibleCount {
            directions: direction_count,
            frames_per_direction,
            limit: layout::MAX_FRAME_COUNT,
        });
    }
    let total = total as usize;
    debug!(direction_count, frames_per_direction, total, "decoding body");

    // Frame pointers are redundant for a sequential read. Reading the table
    // up front also bounds the allocations below by the input size.
    cursor.read(total * layout::FRAME_POINTER_LEN)?;

    let mut directions = Vec::with_capacity(direction_count as usize);
    for direction in 0..direction_count as usize {
        let mut frames = Vec::with_capacity(frames_per_direction as usize);
        for frame in 0..frames_per_direction as usize {
            frames.push(decode_frame_record(cursor, options, direction, frame)?);
        }
        directions.push(Direction::new(frames));
    }
    Ok(directions)
}

fn decode_frame_record(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
    direction: usize,
    frame: usize,
) -> Result<Frame, Dc6Error> {
    let record_offset = cursor.offset();
    cursor.require(layout::FRAME_HEADER_LEN)?;
    let flipped = cursor.read_u32_le()?;
    let width = cursor.read_u32_le()?;
    let height = cursor.read_u32_le()?;
    let offset_x = cursor.read_i32_le()?;
    let offset_y = cursor.read_i32_le()?;
    let unknown = cursor.read_u32_le()?;
    let next_block = cursor.read_u32_le()?;
    let raw_length = cursor.read_u32_le()?;

    let with_context = |source| Dc6Error::Frame {
        direction,
        frame,
        source,
    };
    let pixels = pixel_count(width, height).map_err(with_context)?;
    if pixels > options.max_frame_pixels {
        return Err(Dc6Error::FrameTooLarge {
            width,
            height,
            limit: options.max_frame_pixels,
        });
    }

    let compressed = cursor.read(raw_length as usize)?.to_vec();
    let terminator: [u8; layout::FRAME_TERMINATOR_LEN] = cursor.read_array()?;
    trace!(
        direction,
        frame,
        record_offset,
        width,
        height,
        raw_length,
        "decoding frame"
    );

    let mut decoded = Frame::from_compressed(width, height, compressed).map_err(with_context)?;
    decoded.flipped = flipped;
    decoded.offset_x = offset_x;
    decoded.offset_y = offset_y;
    decoded.unknown = unknown;
    decoded.next_block = next_block;
    decoded.terminator = terminator;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, decode, decode_header, decode_with};
    use crate::format::error::{Dc6Error, ErrorKind, FrameError};
    use crate::format::reader::ByteCursor;

    struct FileBuilder {
        bytes: Vec<u8>,
    }

    impl FileBuilder {
        fn new(directions: u32, frames_per_direction: u32) -> Self {
            let mut bytes = Vec::new();
            for value in [6u32, 1, 0] {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            bytes.extend_from_slice(&[0xEE; 4]);
            bytes.extend_from_slice(&directions.to_le_bytes());
            bytes.extend_from_slice(&frames_per_direction.to_le_bytes());
            for _ in 0..directions * frames_per_direction {
                bytes.extend_from_slice(&0u32.to_le_bytes());
            }
            Self { bytes }
        }

        fn frame(mut self, width: u32, height: u32, stream: &[u8]) -> Self {
            for value in [0u32, width, height] {
                self.bytes.extend_from_slice(&value.to_le_bytes());
            }
            self.bytes.extend_from_slice(&(-4i32).to_le_bytes());
            self.bytes.extend_from_slice(&9i32.to_le_bytes());
            for value in [0u32, 0, stream.len() as u32] {
                self.bytes.extend_from_slice(&value.to_le_bytes());
            }
            self.bytes.extend_from_slice(stream);
            self.bytes.extend_from_slice(&[0xEE, 0xEE, 0xEE]);
            self
        }
    }

    #[test]
    fn decode_single_frame_file() {
        let bytes = FileBuilder::new(1, 1)
            .frame(2, 2, &[0x81, 0x01, 7, 0x80, 0x01, 5, 0x80])
            .bytes;
        let animation = decode(&bytes).unwrap();
        assert_eq!(animation.version, 6);
        assert_eq!(animation.flags, 1);
        assert_eq!(animation.termination, [0xEE; 4]);
        let frame = animation.frame(0, 0).unwrap();
        assert_eq!(frame.pixels(), &[5, 0, 0, 7]);
        assert_eq!(frame.offset_x, -4);
        assert_eq!(frame.offset_y, 9);
        assert_eq!(frame.terminator, [0xEE; 3]);
    }

    #[test]
    fn decode_groups_frames_by_direction() {
        let bytes = FileBuilder::new(2, 2)
            .frame(1, 1, &[0x01, 1])
            .frame(1, 1, &[0x01, 2])
            .frame(1, 1, &[0x01, 3])
            .frame(1, 1, &[0x01, 4])
            .bytes;
        let animation = decode(&bytes).unwrap();
        assert_eq!(animation.directions.len(), 2);
        assert_eq!(animation.frame(1, 0).unwrap().pixels(), &[3]);
        assert_eq!(animation.frame(1, 1).unwrap().pixels(), &[4]);
    }

    #[test]
    fn header_needs_sixteen_bytes() {
        let data = [0u8; 15];
        let mut cursor = ByteCursor::new(&data);
        let err = decode_header(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn zero_directions_is_invalid_count() {
        let bytes = FileBuilder::new(0, 1).bytes;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Dc6Error::InvalidCount {
                field: "direction count",
                value: 0
            }
        ));
    }

    #[test]
    fn zero_frames_per_direction_is_invalid_count() {
        let bytes = FileBuilder::new(1, 0).bytes;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
    }

    #[test]
    fn truncated_frame_table_is_truncated_input() {
        let mut bytes = FileBuilder::new(1, 4).bytes;
        bytes.truncate(16 + 8 + 6);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Dc6Error::TruncatedInput {
                offset: 24,
                needed: 16,
                remaining: 6
            }
        ));
    }

    #[test]
    fn counts_above_frame_limit_are_implausible() {
        let bytes = FileBuilder::new(1, 1).bytes;
        let mut bytes = bytes[..24].to_vec();
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Dc6Error::ImplausibleCount { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
    }

    #[test]
    fn table_cut_right_after_counts_is_truncated_input() {
        let bytes = FileBuilder::new(8, 16).bytes;
        let err = decode(&bytes[..26]).unwrap_err();
        assert!(matches!(
            err,
            Dc6Error::TruncatedInput {
                offset: 24,
                needed: 512,
                remaining: 2
            }
        ));
    }

    #[test]
    fn raw_length_past_end_is_truncated_input() {
        let mut bytes = FileBuilder::new(1, 1).frame(1, 1, &[0x01, 1]).bytes;
        bytes.truncate(bytes.len() - 4);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn missing_frame_terminator_is_truncated_input() {
        let mut bytes = FileBuilder::new(1, 1).frame(1, 1, &[0x01, 1]).bytes;
        bytes.truncate(bytes.len() - 1);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn bad_scanline_reports_frame_position() {
        let bytes = FileBuilder::new(1, 2)
            .frame(1, 1, &[0x01, 1])
            .frame(1, 1, &[0x02, 1, 2])
            .bytes;
        let err = decode(&bytes).unwrap_err();
        match err {
            Dc6Error::Frame {
                direction,
                frame,
                source,
            } => {
                assert_eq!((direction, frame), (0, 1));
                assert!(matches!(source, FrameError::OutOfBounds { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn oversized_frame_is_rejected_before_allocation() {
        let bytes = FileBuilder::new(1, 1).frame(100_000, 100_000, &[]).bytes;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Dc6Error::FrameTooLarge { .. }));
    }

    #[test]
    fn trailing_bytes_follow_options() {
        let mut bytes = FileBuilder::new(1, 1).frame(1, 1, &[0x01, 1]).bytes;
        bytes.extend_from_slice(&[0, 0]);
        assert!(decode(&bytes).is_ok());

        let strict = DecodeOptions {
            allow_trailing_bytes: false,
            ..DecodeOptions::default()
        };
        let err = decode_with(&bytes, &strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingData);
    }
}

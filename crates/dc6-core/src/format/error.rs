use thiserror::Error;

/// Broad classification of every failure the codec can report.
///
/// # Examples
/// ```
/// use dc6_core::{Dc6Error, ErrorKind};
///
/// let err = Dc6Error::InvalidCount { field: "direction count", value: 0 };
/// assert_eq!(err.kind(), ErrorKind::InvalidCount);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A declared read needs more bytes than the input holds.
    TruncatedInput,
    /// A count or dimension is zero, inconsistent or implausibly large.
    InvalidCount,
    /// A scanline instruction addresses pixels outside the frame.
    BoundsViolation,
    /// A palette table is not exactly 256 entries of 4 channels.
    PaletteShapeMismatch,
    /// Bytes remain after the last frame and the options reject them.
    TrailingData,
    /// The input could not be read from its source.
    Io,
}

/// Raised by [`ByteCursor`](super::reader::ByteCursor) when a read runs past
/// the end of its buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("read out of bounds at offset {offset}: need {needed} bytes, {remaining} remaining")]
pub struct CursorError {
    pub offset: usize,
    pub needed: usize,
    pub remaining: usize,
}

/// Errors returned by the scanline codec for a single frame.
///
/// # Examples
/// ```
/// use dc6_core::FrameError;
///
/// let err = FrameError::RowUnderflow { offset: 9 };
/// assert!(err.to_string().contains("end-of-line"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("scanline stream truncated at offset {offset}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("end-of-line at offset {offset} moves past the top row")]
    RowUnderflow { offset: usize },
    #[error(
        "run of {count} pixels at row {row}, column {col} exceeds frame bounds {width}x{height}"
    )]
    OutOfBounds {
        row: i64,
        col: usize,
        count: usize,
        width: u32,
        height: u32,
    },
    #[error("pixel buffer holds {actual} bytes, frame needs {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("frame dimensions {width}x{height} overflow the address space")]
    DimensionOverflow { width: u32, height: u32 },
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::Truncated { .. } => ErrorKind::TruncatedInput,
            FrameError::RowUnderflow { .. } | FrameError::OutOfBounds { .. } => {
                ErrorKind::BoundsViolation
            }
            FrameError::PixelCountMismatch { .. } | FrameError::DimensionOverflow { .. } => {
                ErrorKind::InvalidCount
            }
        }
    }
}

impl From<CursorError> for FrameError {
    fn from(value: CursorError) -> Self {
        FrameError::Truncated {
            offset: value.offset,
            needed: value.needed,
            remaining: value.remaining,
        }
    }
}

/// Errors returned by animation decoding, encoding and model updates.
#[derive(Debug, Error)]
pub enum Dc6Error {
    #[error("input truncated at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid {field}: {value}")]
    InvalidCount { field: &'static str, value: u64 },
    #[error("{directions} directions x {frames_per_direction} frames exceeds the limit of {limit} frames")]
    ImplausibleCount {
        directions: u32,
        frames_per_direction: u32,
        limit: u64,
    },
    #[error("direction {direction} holds {actual} frames, expected {expected}")]
    UnevenDirections {
        direction: usize,
        expected: usize,
        actual: usize,
    },
    #[error("frame {width}x{height} exceeds the limit of {limit} pixels")]
    FrameTooLarge { width: u32, height: u32, limit: usize },
    #[error("direction {direction}, frame {frame}: {source}")]
    Frame {
        direction: usize,
        frame: usize,
        #[source]
        source: FrameError,
    },
    #[error("palette must be 256 entries of 4 channels, got {entries} entries with {channels} channels")]
    PaletteShapeMismatch { entries: usize, channels: usize },
    #[error("{count} unexpected bytes after the last frame at offset {offset}")]
    TrailingBytes { offset: usize, count: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Dc6Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Dc6Error::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Dc6Error::InvalidCount { .. }
            | Dc6Error::ImplausibleCount { .. }
            | Dc6Error::UnevenDirections { .. }
            | Dc6Error::FrameTooLarge { .. } => ErrorKind::InvalidCount,
            Dc6Error::Frame { source, .. } => source.kind(),
            Dc6Error::PaletteShapeMismatch { .. } => ErrorKind::PaletteShapeMismatch,
            Dc6Error::TrailingBytes { .. } => ErrorKind::TrailingData,
            Dc6Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<CursorError> for Dc6Error {
    fn from(value: CursorError) -> Self {
        Dc6Error::TruncatedInput {
            offset: value.offset,
            needed: value.needed,
            remaining: value.remaining,
        }
    }
}

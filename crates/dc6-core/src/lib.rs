//! DC6 core library: sprite-sheet decoding and encoding.
//!
//! This crate implements the codec used by the CLI: a forward-only cursor
//! feeds the header/body parser, which hands each frame's run-length stream
//! to the scanline codec and assembles an [`Animation`] of directions and
//! frames. Encoding walks the same layers in reverse. Parsing is
//! byte-oriented and side-effect free; the only I/O is [`decode_file`].
//!
//! Invariants:
//! - A decoded frame's pixel buffer is exactly `width * height` bytes.
//! - `decode(encode(a))` reproduces every header field and pixel of `a`.
//! - Decoding either returns a complete animation or an error, never a
//!   partially populated one.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use dc6_core::decode_file;
//!
//! let animation = decode_file(Path::new("sprite.dc6"))?;
//! println!("frames: {}", animation.frame_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

mod format;
mod model;

pub use format::error::{CursorError, Dc6Error, ErrorKind, FrameError};
pub use format::frame::{decode_frame, encode_frame, pixel_count};
pub use format::layout::{END_OF_LINE, MAX_RUN_LENGTH};
pub use format::parser::{DecodeOptions, Header, decode, decode_body, decode_header, decode_with};
pub use format::reader::ByteCursor;
pub use format::scanline::ScanlineOp;
pub use format::writer::encode;
pub use model::{Animation, Direction, Frame, Palette, default_palette};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Read and decode a DC6 file with the given options.
///
/// # Errors
/// Returns `Dc6Error::Io` when the file cannot be read, otherwise the same
/// errors as [`decode_with`].
pub fn decode_file_with(path: &Path, options: &DecodeOptions) -> Result<Animation, Dc6Error> {
    let bytes = fs::read(path)?;
    decode_with(&bytes, options)
}

pub fn decode_file(path: &Path) -> Result<Animation, Dc6Error> {
    decode_file_with(path, &DecodeOptions::default())
}

/// Structured description of a decoded file.
///
/// # Examples
/// ```
/// use dc6_core::{Animation, make_report};
///
/// let report = make_report("sprite.dc6", 0, &Animation::default(), false);
/// assert_eq!(report.report_version, dc6_core::REPORT_VERSION);
/// assert!(report.animation.directions.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input file metadata.
    pub input: InputInfo,
    /// Snapshot of the decoded animation.
    pub animation: AnimationSnapshot,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "dc6").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
///
/// # Examples
/// ```
/// use dc6_core::InputInfo;
///
/// let input = InputInfo {
///     path: "sprite.dc6".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided by the caller.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Value-only view of an [`Animation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub version: i32,
    pub flags: u32,
    pub encoding: u32,
    pub termination: [u8; 4],
    pub direction_count: u64,
    /// Absent when directions disagree on their length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_per_direction: Option<u64>,
    pub frame_count: u64,
    pub directions: Vec<DirectionSnapshot>,
    /// Explicit palette entries; absent when the default palette applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<[u8; 4]>>,
}

/// Value-only view of a [`Direction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionSnapshot {
    /// Position of the direction in the file.
    pub index: usize,
    pub frames: Vec<FrameSnapshot>,
}

/// Value-only view of a [`Frame`].
///
/// # Examples
/// ```
/// use dc6_core::Frame;
///
/// let snapshot = Frame::from_pixels(2, 1, vec![0, 3]).unwrap().snapshot(true);
/// assert_eq!(snapshot.raw_length, 4);
/// assert_eq!(snapshot.pixels, Some(vec![0, 3]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub flipped: u32,
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub unknown: u32,
    pub next_block: u32,
    /// Length of the stored scanline stream.
    pub raw_length: u64,
    pub terminator: [u8; 3],
    /// Top-row-first palette indices, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u8>>,
}

/// Build a report for a decoded animation.
pub fn make_report(
    input_path: &str,
    input_bytes: u64,
    animation: &Animation,
    include_pixels: bool,
) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "dc6".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        animation: animation.snapshot(include_pixels),
    }
}

/// Decode a file and describe it as a [`Report`].
pub fn report_file(
    path: &Path,
    options: &DecodeOptions,
    include_pixels: bool,
) -> Result<Report, Dc6Error> {
    let bytes = fs::read(path)?;
    let animation = decode_with(&bytes, options)?;
    Ok(make_report(
        &path.display().to_string(),
        bytes.len() as u64,
        &animation,
        include_pixels,
    ))
}

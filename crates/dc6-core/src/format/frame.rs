//! Scanline run-length codec for a single frame.
//!
//! Streams are stored bottom row first: decoding starts at row `height - 1`
//! and every end-of-line marker moves one row up. The pixel buffer itself is
//! row-major with the top row first.
//!
//! Several streams decode to the same pixels (runs may be split anywhere and
//! trailing transparent runs are optional), so `encode(decode(c)) == c` does
//! not hold in general. `decode(encode(p)) == p` always does.

use super::error::FrameError;
use super::layout;
use super::reader::ByteCursor;
use super::scanline::ScanlineOp;

/// Number of bytes in a `width x height` index buffer.
pub fn pixel_count(width: u32, height: u32) -> Result<usize, FrameError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(FrameError::DimensionOverflow { width, height })
}

/// Decode a compressed scanline stream into a `width * height` index buffer.
///
/// Pixels not covered by an opaque run keep index 0. A trailing end-of-line
/// after the final row is accepted but not required.
///
/// # Examples
/// ```
/// use dc6_core::decode_frame;
///
/// // bottom row: skip 1, write [7]; top row: write [5]
/// let stream = [0x81, 0x01, 7, 0x80, 0x01, 5, 0x80];
/// assert_eq!(decode_frame(&stream, 2, 2).unwrap(), vec![5, 0, 0, 7]);
/// ```
///
/// # Errors
/// Returns `FrameError` when a run leaves the frame, an end-of-line moves
/// above the top row, or an opaque run is cut short by the end of the
/// stream.
pub fn decode_frame(compressed: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let mut pixels = vec![layout::BACKGROUND_INDEX; pixel_count(width, height)?];
    let stride = width as usize;
    let mut cursor = ByteCursor::new(compressed);
    let mut row = i64::from(height) - 1;
    let mut col = 0usize;

    while !cursor.is_exhausted() {
        let offset = cursor.offset();
        match ScanlineOp::classify(cursor.read_u8()?) {
            ScanlineOp::EndOfLine => {
                if row < 0 {
                    return Err(FrameError::RowUnderflow { offset });
                }
                row -= 1;
                col = 0;
            }
            ScanlineOp::TransparentRun(n) => {
                let count = usize::from(n);
                check_run(row, col, count, width, height)?;
                col += count;
            }
            ScanlineOp::OpaqueRun(n) => {
                let count = usize::from(n);
                let run = cursor.read(count)?;
                if count == 0 {
                    continue;
                }
                check_run(row, col, count, width, height)?;
                let start = row as usize * stride + col;
                pixels[start..start + count].copy_from_slice(run);
                col += count;
            }
        }
    }

    Ok(pixels)
}

fn check_run(
    row: i64,
    col: usize,
    count: usize,
    width: u32,
    height: u32,
) -> Result<(), FrameError> {
    let fits_row = row >= 0 && row < i64::from(height);
    if !fits_row || col + count > width as usize {
        return Err(FrameError::OutOfBounds {
            row,
            col,
            count,
            width,
            height,
        });
    }
    Ok(())
}

/// Encode a `width * height` index buffer into a scanline stream.
///
/// Index 0 becomes transparent runs, everything else opaque runs; both are
/// split at 127 pixels. Transparent pixels at the end of a row are left to
/// the end-of-line marker, which follows every row including the last.
///
/// # Examples
/// ```
/// use dc6_core::{decode_frame, encode_frame};
///
/// let pixels = [5, 0, 0, 7];
/// let stream = encode_frame(&pixels, 2, 2).unwrap();
/// assert_eq!(stream, vec![0x81, 0x01, 7, 0x80, 0x01, 5, 0x80]);
/// assert_eq!(decode_frame(&stream, 2, 2).unwrap(), pixels);
/// ```
///
/// # Errors
/// Returns `FrameError::PixelCountMismatch` when `pixels` is not exactly
/// `width * height` bytes.
pub fn encode_frame(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = pixel_count(width, height)?;
    if pixels.len() != expected {
        return Err(FrameError::PixelCountMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let stride = width as usize;
    let mut out = Vec::with_capacity(expected + height as usize);
    for row in (0..height as usize).rev() {
        encode_scanline(&pixels[row * stride..(row + 1) * stride], &mut out);
        out.push(ScanlineOp::EndOfLine.to_byte());
    }
    Ok(out)
}

fn encode_scanline(line: &[u8], out: &mut Vec<u8>) {
    let max_run = usize::from(layout::MAX_RUN_LENGTH);
    let mut col = 0;
    while col < line.len() {
        let transparent = line[col] == layout::BACKGROUND_INDEX;
        let run_end = line[col..]
            .iter()
            .position(|&index| (index == layout::BACKGROUND_INDEX) != transparent)
            .map_or(line.len(), |len| col + len);

        if transparent {
            if run_end == line.len() {
                break;
            }
            let mut left = run_end - col;
            while left > 0 {
                let n = left.min(max_run);
                out.push(ScanlineOp::TransparentRun(n as u8).to_byte());
                left -= n;
            }
        } else {
            for chunk in line[col..run_end].chunks(max_run) {
                out.push(ScanlineOp::OpaqueRun(chunk.len() as u8).to_byte());
                out.extend_from_slice(chunk);
            }
        }
        col = run_end;
    }
}

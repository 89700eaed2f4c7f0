use tracing::debug;

use super::error::Dc6Error;
use super::frame::encode_frame;
use super::layout;
use crate::model::Animation;

/// Serialize an animation into DC6 bytes.
///
/// Every frame's scanline stream is re-encoded from its pixels, so the
/// output of `encode(decode(bytes))` decodes to the same pixels and header
/// fields as `bytes` but may differ from it byte for byte. The frame-pointer
/// table holds the absolute offset of each frame record.
///
/// # Errors
/// Returns `Dc6Error::InvalidCount` / `Dc6Error::UnevenDirections` when the
/// directions cannot be expressed as `directionCount x framesPerDirection`,
/// and `Dc6Error::Frame` when a frame's pixel buffer does not match its
/// dimensions.
pub fn encode(animation: &Animation) -> Result<Vec<u8>, Dc6Error> {
    let frames_per_direction = animation.frames_per_direction()?;
    let direction_count = animation.directions.len();

    let mut streams = Vec::with_capacity(animation.frame_count());
    for (direction, entry) in animation.directions.iter().enumerate() {
        for (frame, item) in entry.iter().enumerate() {
            let stream = encode_frame(item.pixels(), item.width(), item.height())
                .map_err(|source| Dc6Error::Frame {
                    direction,
                    frame,
                    source,
                })?;
            streams.push(stream);
        }
    }

    let table_offset = layout::HEADER_LEN + layout::BODY_COUNTS_LEN;
    let first_record = table_offset + streams.len() * layout::FRAME_POINTER_LEN;
    let records_len: usize = streams
        .iter()
        .map(|stream| record_len(stream.len()))
        .sum();

    let mut out = Vec::with_capacity(first_record + records_len);
    let header = animation.header();
    out.extend_from_slice(&header.version.to_le_bytes());
    out.extend_from_slice(&header.flags.to_le_bytes());
    out.extend_from_slice(&header.encoding.to_le_bytes());
    out.extend_from_slice(&header.termination);
    out.extend_from_slice(&to_u32("direction count", direction_count)?.to_le_bytes());
    out.extend_from_slice(&to_u32("frames per direction", frames_per_direction)?.to_le_bytes());

    let mut record_offset = first_record;
    for stream in &streams {
        out.extend_from_slice(&to_u32("frame offset", record_offset)?.to_le_bytes());
        record_offset += record_len(stream.len());
    }

    for (item, stream) in animation.frames().zip(&streams) {
        out.extend_from_slice(&item.flipped.to_le_bytes());
        out.extend_from_slice(&item.width().to_le_bytes());
        out.extend_from_slice(&item.height().to_le_bytes());
        out.extend_from_slice(&item.offset_x.to_le_bytes());
        out.extend_from_slice(&item.offset_y.to_le_bytes());
        out.extend_from_slice(&item.unknown.to_le_bytes());
        out.extend_from_slice(&item.next_block.to_le_bytes());
        out.extend_from_slice(&to_u32("raw length", stream.len())?.to_le_bytes());
        out.extend_from_slice(stream);
        out.extend_from_slice(&item.terminator);
    }

    debug!(
        direction_count,
        frames_per_direction,
        bytes = out.len(),
        "encoded animation"
    );
    Ok(out)
}

fn record_len(stream_len: usize) -> usize {
    layout::FRAME_HEADER_LEN + stream_len + layout::FRAME_TERMINATOR_LEN
}

fn to_u32(field: &'static str, value: usize) -> Result<u32, Dc6Error> {
    u32::try_from(value).map_err(|_| Dc6Error::InvalidCount {
        field,
        value: value as u64,
    })
}

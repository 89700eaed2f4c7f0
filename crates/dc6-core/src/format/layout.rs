/// Width of every integer field in the file.
pub const FIELD_LEN: usize = 4;

/// `version`, `flags`, `encoding` and the 4-byte termination block.
pub const HEADER_LEN: usize = 4 * FIELD_LEN;
pub const TERMINATION_LEN: usize = FIELD_LEN;

/// `directionCount` and `framesPerDirection`.
pub const BODY_COUNTS_LEN: usize = 2 * FIELD_LEN;
pub const FRAME_POINTER_LEN: usize = FIELD_LEN;

/// flipped, width, height, offsetX, offsetY, unknown, nextBlock, rawLength.
pub const FRAME_HEADER_LEN: usize = 8 * FIELD_LEN;
pub const FRAME_TERMINATOR_LEN: usize = 3;

pub const END_OF_LINE: u8 = 0x80;
pub const TRANSPARENT_FLAG: u8 = 0x80;
pub const MAX_RUN_LENGTH: u8 = 0x7F;

/// Palette index written by the encoder as transparent runs.
pub const BACKGROUND_INDEX: u8 = 0;

pub const PALETTE_ENTRIES: usize = 256;
pub const PALETTE_CHANNELS: usize = 4;

/// Upper bound on `directionCount * framesPerDirection`.
pub const MAX_FRAME_COUNT: u64 = 1 << 20;

/// Upper bound on `width * height` accepted by default when decoding.
pub const DEFAULT_MAX_FRAME_PIXELS: usize = 64 * 1024 * 1024;

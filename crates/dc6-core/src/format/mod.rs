//! DC6 binary format.
//!
//! The format code follows a layered structure:
//! - `layout`: field sizes and control-byte constants (source of truth)
//! - `reader`: the bounds-checked forward cursor
//! - `scanline`: control-byte classification
//! - `frame`: the per-frame run-length codec
//! - `parser` / `writer`: whole-file decode and encode
//! - `error`: explicit, actionable errors
//!
//! Everything here works on in-memory buffers and performs no I/O.

pub mod error;
pub mod frame;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod scanline;
pub mod writer;

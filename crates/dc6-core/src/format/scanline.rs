use super::layout;

/// One decoded scanline instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlineOp {
    /// Move to the next row up and reset the column.
    EndOfLine,
    /// Skip `n` columns without writing.
    TransparentRun(u8),
    /// Copy the next `n` stream bytes as palette indices.
    OpaqueRun(u8),
}

impl ScanlineOp {
    /// Classify a control byte. Total over `0..=255`.
    ///
    /// # Examples
    /// ```
    /// use dc6_core::ScanlineOp;
    ///
    /// assert_eq!(ScanlineOp::classify(0x80), ScanlineOp::EndOfLine);
    /// assert_eq!(ScanlineOp::classify(0x85), ScanlineOp::TransparentRun(5));
    /// assert_eq!(ScanlineOp::classify(0x05), ScanlineOp::OpaqueRun(5));
    /// ```
    pub fn classify(byte: u8) -> Self {
        if byte == layout::END_OF_LINE {
            ScanlineOp::EndOfLine
        } else if byte & layout::TRANSPARENT_FLAG != 0 {
            ScanlineOp::TransparentRun(byte & layout::MAX_RUN_LENGTH)
        } else {
            ScanlineOp::OpaqueRun(byte)
        }
    }

    /// Control byte for this instruction.
    ///
    /// Run lengths must already fit in 7 bits (`0..=127`); callers split
    /// longer runs. Debug builds assert this, release builds mask the count.
    /// A zero-length transparent run has no encoding of its own and maps to
    /// the end-of-line byte, so callers never emit one.
    pub fn to_byte(self) -> u8 {
        match self {
            ScanlineOp::EndOfLine => layout::END_OF_LINE,
            ScanlineOp::TransparentRun(n) => {
                debug_assert!(n <= layout::MAX_RUN_LENGTH, "transparent run of {n} exceeds 127");
                layout::TRANSPARENT_FLAG | (n & layout::MAX_RUN_LENGTH)
            }
            ScanlineOp::OpaqueRun(n) => {
                debug_assert!(n <= layout::MAX_RUN_LENGTH, "opaque run of {n} exceeds 127");
                n & layout::MAX_RUN_LENGTH
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScanlineOp;

    #[test]
    fn classify_is_total_and_counts_fit_seven_bits() {
        for byte in 0..=u8::MAX {
            match ScanlineOp::classify(byte) {
                ScanlineOp::EndOfLine => assert_eq!(byte, 0x80),
                ScanlineOp::TransparentRun(n) => {
                    assert!(byte > 0x80);
                    assert!((1..=0x7F).contains(&n));
                }
                ScanlineOp::OpaqueRun(n) => {
                    assert!(byte < 0x80);
                    assert_eq!(n, byte);
                }
            }
        }
    }

    #[test]
    fn end_of_line_wins_over_transparent_flag() {
        assert_eq!(ScanlineOp::classify(0x80), ScanlineOp::EndOfLine);
    }

    #[test]
    fn zero_is_an_empty_opaque_run() {
        assert_eq!(ScanlineOp::classify(0), ScanlineOp::OpaqueRun(0));
    }

    #[test]
    fn to_byte_inverts_classify() {
        for byte in 0..=u8::MAX {
            assert_eq!(ScanlineOp::classify(byte).to_byte(), byte);
        }
    }

    #[test]
    fn to_byte_accepts_longest_runs() {
        assert_eq!(ScanlineOp::OpaqueRun(127).to_byte(), 0x7F);
        assert_eq!(ScanlineOp::TransparentRun(127).to_byte(), 0xFF);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "opaque run of 200 exceeds 127")]
    fn to_byte_rejects_oversized_opaque_run() {
        ScanlineOp::OpaqueRun(200).to_byte();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "transparent run of 128 exceeds 127")]
    fn to_byte_rejects_oversized_transparent_run() {
        ScanlineOp::TransparentRun(128).to_byte();
    }
}

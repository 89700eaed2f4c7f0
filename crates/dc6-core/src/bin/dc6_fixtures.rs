use std::fs;
use std::path::{Path, PathBuf};

use dc6_core::{Animation, Direction, Frame, encode};

const FRAME_HEADER_FIELDS: usize = 8;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_fixture(&root, "basic", &encoded(&basic()?)?)?;
    write_fixture(&root, "long_runs", &encoded(&long_runs()?)?)?;

    let mut padded = encoded(&single(pixels(2, 2, &[5, 0, 0, 7])?))?;
    padded.extend_from_slice(&[0; 4]);
    write_fixture(&root, "trailing_bytes", &padded)?;

    write_fixture(&root, "handcrafted", &handcrafted())?;
    Ok(())
}

fn encoded(animation: &Animation) -> Result<Vec<u8>, String> {
    encode(animation).map_err(|err| format!("encode failed: {}", err))
}

fn write_fixture(root: &Path, case: &str, bytes: &[u8]) -> Result<(), String> {
    let dir = root.join(case);
    fs::create_dir_all(&dir).map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.dc6");
    fs::write(&path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn sprite_header() -> Animation {
    let mut animation = Animation::default();
    animation.version = 6;
    animation.flags = 1;
    animation.termination = [0xEE; 4];
    animation
}

fn single(frame: Frame) -> Animation {
    let mut animation = sprite_header();
    animation.directions.push(Direction::new(vec![frame]));
    animation
}

fn pixels(width: u32, height: u32, indices: &[u8]) -> Result<Frame, String> {
    let mut frame = Frame::from_pixels(width, height, indices.to_vec())
        .map_err(|err| format!("fixture frame {width}x{height}: {err}"))?;
    frame.terminator = [0xEE; 3];
    Ok(frame)
}

fn basic() -> Result<Animation, String> {
    let mut animation = sprite_header();
    animation.directions.push(Direction::new(vec![
        pixels(4, 3, &[0, 0, 5, 5, 7, 0, 0, 9, 0, 0, 0, 0])?.with_offset(-2, 3),
        pixels(2, 2, &[1, 2, 3, 4])?,
    ]));
    animation.directions.push(Direction::new(vec![
        pixels(3, 1, &[0, 0, 0])?.with_offset(1, -1),
        pixels(1, 4, &[8, 0, 8, 0])?.with_offset(5, 5).with_flipped(true),
    ]));
    Ok(animation)
}

fn long_runs() -> Result<Animation, String> {
    let mut indices = vec![0u8; 130];
    indices.extend((0..170u32).map(|i| (i % 255 + 1) as u8));
    indices.extend(std::iter::repeat_n(0x42, 200));
    indices.extend(std::iter::repeat_n(0, 100));
    Ok(single(pixels(300, 2, &indices)?.with_offset(10, -20)))
}

/// Non-canonical streams and an all-zero frame-pointer table, written
/// field by field since `encode` would normalize both.
fn handcrafted() -> Vec<u8> {
    let streams: [(u32, u32, i32, i32, &[u8]); 2] = [
        (2, 2, -4, 9, &[0x81, 0x01, 7, 0x80, 0x01, 5]),
        (3, 1, 0, 0, &[0x01, 1, 0x01, 2, 0x01, 3, 0x80]),
    ];

    let mut out = Vec::new();
    out.extend_from_slice(&6i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&[1, 2, 3, 4]);
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(streams.len() as u32).to_le_bytes());
    out.extend(std::iter::repeat_n(0, streams.len() * 4));

    for (width, height, offset_x, offset_y, stream) in streams {
        let fields: [[u8; 4]; FRAME_HEADER_FIELDS] = [
            0u32.to_le_bytes(),
            width.to_le_bytes(),
            height.to_le_bytes(),
            offset_x.to_le_bytes(),
            offset_y.to_le_bytes(),
            0x1234u32.to_le_bytes(),
            7u32.to_le_bytes(),
            (stream.len() as u32).to_le_bytes(),
        ];
        out.extend(fields.iter().flatten());
        out.extend_from_slice(stream);
        out.extend_from_slice(&[1, 2, 3]);
    }
    out
}

use std::borrow::Cow;

use crate::format::error::Dc6Error;
use crate::format::layout::TERMINATION_LEN;
use crate::format::parser::Header;
use crate::{AnimationSnapshot, DirectionSnapshot};

use super::frame::Frame;
use super::palette::Palette;

/// One facing of an animation: frames in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Direction {
    pub frames: Vec<Frame>,
}

impl Direction {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn snapshot(&self, index: usize, include_pixels: bool) -> DirectionSnapshot {
        DirectionSnapshot {
            index,
            frames: self
                .frames
                .iter()
                .map(|frame| frame.snapshot(include_pixels))
                .collect(),
        }
    }
}

/// A decoded DC6 file: pass-through header fields, directions of frames and
/// an optional palette used only when translating pixels to colors.
///
/// # Examples
/// ```
/// use dc6_core::{Animation, Direction, Frame};
///
/// let mut animation = Animation::default();
/// animation
///     .directions
///     .push(Direction::new(vec![Frame::from_pixels(2, 2, vec![5, 0, 0, 7]).unwrap()]));
/// assert_eq!(animation.frame_count(), 1);
/// assert_eq!(animation.effective_palette().color(7), [7, 7, 7, 255]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animation {
    pub version: i32,
    pub flags: u32,
    pub encoding: u32,
    pub termination: [u8; TERMINATION_LEN],
    pub directions: Vec<Direction>,
    palette: Option<Palette>,
}

impl Animation {
    /// An animation with the given header fields and no directions.
    pub fn from_header(header: Header) -> Self {
        Self {
            version: header.version,
            flags: header.flags,
            encoding: header.encoding,
            termination: header.termination,
            ..Self::default()
        }
    }

    pub fn header(&self) -> Header {
        Header {
            version: self.version,
            flags: self.flags,
            encoding: self.encoding,
            termination: self.termination,
        }
    }

    /// All frames, direction by direction.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.directions.iter().flat_map(Direction::iter)
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> + '_ {
        self.directions
            .iter_mut()
            .flat_map(|direction| direction.frames.iter_mut())
    }

    pub fn frame_count(&self) -> usize {
        self.directions.iter().map(Direction::len).sum()
    }

    pub fn frame(&self, direction: usize, index: usize) -> Option<&Frame> {
        self.directions.get(direction)?.frames.get(index)
    }

    /// Frames held by every direction.
    ///
    /// # Errors
    /// Returns `Dc6Error::InvalidCount` when there are no directions or the
    /// first one is empty, and `Dc6Error::UnevenDirections` when directions
    /// disagree on their length.
    pub fn frames_per_direction(&self) -> Result<usize, Dc6Error> {
        let first = self.directions.first().ok_or(Dc6Error::InvalidCount {
            field: "direction count",
            value: 0,
        })?;
        let expected = first.len();
        if expected == 0 {
            return Err(Dc6Error::InvalidCount {
                field: "frames per direction",
                value: 0,
            });
        }
        for (direction, entry) in self.directions.iter().enumerate() {
            if entry.len() != expected {
                return Err(Dc6Error::UnevenDirections {
                    direction,
                    expected,
                    actual: entry.len(),
                });
            }
        }
        Ok(expected)
    }

    /// Replace every frame with `frames`, regrouped into directions of
    /// `frames_per_direction` consecutive frames.
    ///
    /// # Examples
    /// ```
    /// use dc6_core::{Animation, Frame};
    ///
    /// let frames = (1..=4)
    ///     .map(|i| Frame::from_pixels(1, 1, vec![i]).unwrap())
    ///     .collect();
    /// let mut animation = Animation::default();
    /// animation.set_frames(frames, 2).unwrap();
    /// assert_eq!(animation.directions.len(), 2);
    /// assert_eq!(animation.frame(1, 0).unwrap().pixels(), &[3]);
    /// ```
    pub fn set_frames(
        &mut self,
        frames: Vec<Frame>,
        frames_per_direction: usize,
    ) -> Result<(), Dc6Error> {
        if frames_per_direction == 0 {
            return Err(Dc6Error::InvalidCount {
                field: "frames per direction",
                value: 0,
            });
        }
        if frames.is_empty() || frames.len() % frames_per_direction != 0 {
            return Err(Dc6Error::InvalidCount {
                field: "frame count",
                value: frames.len() as u64,
            });
        }
        if let Some(frame) = frames.iter().find(|f| f.width() == 0 || f.height() == 0) {
            let field = if frame.width() == 0 { "frame width" } else { "frame height" };
            return Err(Dc6Error::InvalidCount { field, value: 0 });
        }

        let mut directions = Vec::with_capacity(frames.len() / frames_per_direction);
        let mut frames = frames.into_iter();
        loop {
            let chunk: Vec<Frame> = frames.by_ref().take(frames_per_direction).collect();
            if chunk.is_empty() {
                break;
            }
            directions.push(Direction::new(chunk));
        }
        self.directions = directions;
        Ok(())
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Validate and install a 256 x 4 color table.
    ///
    /// # Errors
    /// Returns `Dc6Error::PaletteShapeMismatch` and leaves the current
    /// palette untouched when the table has any other shape.
    pub fn set_palette<R: AsRef<[u8]>>(&mut self, table: &[R]) -> Result<(), Dc6Error> {
        self.palette = Some(Palette::from_rows(table)?);
        Ok(())
    }

    pub fn replace_palette(&mut self, palette: Option<Palette>) -> Option<Palette> {
        std::mem::replace(&mut self.palette, palette)
    }

    /// The explicit palette, or the grayscale default.
    pub fn effective_palette(&self) -> Cow<'_, Palette> {
        match &self.palette {
            Some(palette) => Cow::Borrowed(palette),
            None => Cow::Owned(Palette::grayscale()),
        }
    }

    pub fn snapshot(&self, include_pixels: bool) -> AnimationSnapshot {
        AnimationSnapshot {
            version: self.version,
            flags: self.flags,
            encoding: self.encoding,
            termination: self.termination,
            direction_count: self.directions.len() as u64,
            frames_per_direction: self.frames_per_direction().ok().map(|n| n as u64),
            frame_count: self.frame_count() as u64,
            directions: self
                .directions
                .iter()
                .enumerate()
                .map(|(index, direction)| direction.snapshot(index, include_pixels))
                .collect(),
            palette: self.palette.as_ref().map(|p| p.entries().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Animation, Direction};
    use crate::format::error::{Dc6Error, ErrorKind};
    use crate::model::frame::Frame;

    fn frame(index: u8) -> Frame {
        Frame::from_pixels(1, 1, vec![index]).unwrap()
    }

    fn animation(directions: &[usize]) -> Animation {
        let mut animation = Animation::default();
        for &len in directions {
            animation
                .directions
                .push(Direction::new((0..len).map(|i| frame(i as u8)).collect()));
        }
        animation
    }

    #[test]
    fn flat_view_follows_direction_order() {
        let mut animation = animation(&[2, 2]);
        animation.directions[1].frames[0] = frame(9);
        let flat: Vec<u8> = animation.frames().map(|f| f.pixels()[0]).collect();
        assert_eq!(flat, vec![0, 1, 9, 1]);
        assert_eq!(animation.frame_count(), 4);
    }

    #[test]
    fn frames_mut_updates_in_place() {
        let mut animation = animation(&[1, 1]);
        for frame in animation.frames_mut() {
            frame.offset_x = 5;
        }
        assert!(animation.frames().all(|f| f.offset_x == 5));
    }

    #[test]
    fn frames_per_direction_requires_uniform_directions() {
        assert_eq!(animation(&[3, 3]).frames_per_direction().unwrap(), 3);

        let err = animation(&[3, 2]).frames_per_direction().unwrap_err();
        assert!(matches!(
            err,
            Dc6Error::UnevenDirections {
                direction: 1,
                expected: 3,
                actual: 2
            }
        ));

        let err = Animation::default().frames_per_direction().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
        let err = animation(&[0]).frames_per_direction().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
    }

    #[test]
    fn set_frames_regroups_flat_list() {
        let mut animation = animation(&[1]);
        let frames = (0..6).map(frame).collect();
        animation.set_frames(frames, 3).unwrap();
        assert_eq!(animation.directions.len(), 2);
        assert_eq!(animation.frames_per_direction().unwrap(), 3);
        assert_eq!(animation.frame(1, 2).unwrap().pixels(), &[5]);
    }

    #[test]
    fn set_frames_rejects_uneven_or_empty_input() {
        let mut animation = animation(&[2]);
        let err = animation.set_frames((0..5).map(frame).collect(), 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
        let err = animation.set_frames(Vec::new(), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
        let err = animation.set_frames(vec![frame(1)], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
        assert_eq!(animation.frame_count(), 2);
    }

    #[test]
    fn set_frames_rejects_zero_sized_frames() {
        let mut animation = Animation::default();
        let empty = Frame::from_pixels(0, 3, Vec::new()).unwrap();
        let err = animation.set_frames(vec![empty], 1).unwrap_err();
        assert!(matches!(
            err,
            Dc6Error::InvalidCount {
                field: "frame width",
                value: 0
            }
        ));
    }

    #[test]
    fn set_palette_validates_and_replaces() {
        let mut animation = Animation::default();
        assert!(animation.palette().is_none());
        animation.set_palette(&vec![[10u8, 20, 30, 40]; 256]).unwrap();
        assert_eq!(animation.effective_palette().color(0), [10, 20, 30, 40]);

        let err = animation.set_palette(&vec![[0u8; 3]; 256]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PaletteShapeMismatch);
        assert_eq!(animation.effective_palette().color(0), [10, 20, 30, 40]);

        animation.replace_palette(None);
        assert_eq!(animation.effective_palette().color(3), [3, 3, 3, 255]);
    }
}

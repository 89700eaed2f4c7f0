//! In-memory animation model.
//!
//! Ownership is strictly hierarchical: an [`Animation`] owns its
//! [`Direction`]s, which own their [`Frame`]s. The flat frame list is a view
//! over that hierarchy, never a second copy.

pub mod animation;
pub mod frame;
pub mod palette;

pub use animation::{Animation, Direction};
pub use frame::Frame;
pub use palette::{Palette, default_palette};

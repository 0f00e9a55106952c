//! Tweened motion: easing curves and looping position timelines.

pub mod ease;
pub mod timeline;

pub use ease::{Ease, EaseDirection};
pub use timeline::{Direction, PlaybackState, Repeat, Timeline, Tween};

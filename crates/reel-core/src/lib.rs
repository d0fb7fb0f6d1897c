// crates/reel-core/src/lib.rs
//
// Pure composition model: rational time, the timeline/stack/track/item
// tree, the document parser, and the composition walker. No I/O, no
// threads — everything here is a plain function of its inputs.

pub mod composition;
pub mod document;
pub mod error;
pub mod frame;
pub mod time;
pub mod transitions;
pub mod walker;

pub use composition::{Clip, ClipId, Gap, Item, MediaReference, Stack, Timeline, Track, TrackItem, TrackKind, Transition};
pub use error::{CoreError, Result};
pub use frame::{DecodedImage, Frame, Layer, PixelLayout};
pub use time::{RationalTime, TimeRange, TimeTransform};
pub use transitions::TransitionKind;
pub use walker::{walk, LayerDescriptor};

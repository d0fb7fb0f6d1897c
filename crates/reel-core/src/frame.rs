// crates/reel-core/src/frame.rs
//
// Plain output data — no GPU handles, no UI types. A `Frame` is what the
// walker plus the reader layer hand back to a caller; nothing downstream of
// this module knows about ffmpeg, `image`, or pixel formats beyond the
// `PixelLayout` tag.

use crate::time::RationalTime;
use crate::transitions::TransitionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
    Yuv420p,
}

/// A single decoded image. `None` entries (no pixels, zero size) stand in
/// for `MediaOpenFailed`/`MediaDecodeFailed` — callers always get a `Layer`,
/// never a dangling promise.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width:  u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data:   Vec<u8>,
}

impl DecodedImage {
    pub fn empty() -> Self {
        Self { width: 0, height: 0, layout: PixelLayout::Rgba8, data: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One blended layer of a composited frame. `image_b`/`transition_phase` are
/// only meaningful when `transition != TransitionKind::None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub image_a:          DecodedImage,
    pub image_b:          Option<DecodedImage>,
    pub transition:       TransitionKind,
    pub transition_phase: f32,
}

impl Layer {
    pub fn single(image: DecodedImage) -> Self {
        Self { image_a: image, image_b: None, transition: TransitionKind::None, transition_phase: 0.0 }
    }
}

/// The core's output for one presentation time: an ordered stack of layers,
/// bottom track first.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub time:   RationalTime,
    pub layers: Vec<Layer>,
}

impl Frame {
    pub fn empty(time: RationalTime) -> Self {
        Self { time, layers: Vec::new() }
    }
}

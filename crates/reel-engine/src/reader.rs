// crates/reel-engine/src/reader.rs
//
// The reader abstraction: an opaque media source producing one image per
// requested media-time. Movie and image-sequence readers implement this
// with no shared base behavior — the scheduler never distinguishes them.

use std::collections::HashMap;

use crossbeam_channel::{Receiver, TryRecvError};

use reel_core::{DecodedImage, PixelLayout, RationalTime, TimeRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoKind {
    Sequence,
    Container,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoStreamInfo {
    pub width:  u32,
    pub height: u32,
    pub layout: PixelLayout,
}

/// A snapshot of what a reader can provide, cached alongside it in the
/// registry so `Player::get_video_info` doesn't have to ask the reader again.
#[derive(Clone, Debug)]
pub struct Info {
    pub video_streams: Vec<VideoStreamInfo>,
    pub video_range:   TimeRange,
    pub video_kind:    VideoKind,
    pub tags:          HashMap<String, String>,
}

impl Info {
    pub fn is_empty(&self) -> bool {
        self.video_streams.is_empty()
    }
}

/// A cancellable, non-blocking-pollable handle to one in-flight decode.
/// Backed by a bounded channel rather than an async runtime — the scheduler
/// polls it with `try_recv`, never awaits.
pub struct PendingFrame {
    rx: Receiver<DecodedImage>,
}

pub enum Poll {
    Pending,
    Ready(DecodedImage),
}

impl PendingFrame {
    pub fn new(rx: Receiver<DecodedImage>) -> Self {
        Self { rx }
    }

    /// An already-resolved handle — used for requests that never needed to
    /// touch a reader (e.g. a `Missing` media reference).
    pub fn ready(image: DecodedImage) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(image);
        Self { rx }
    }

    /// Non-blocking poll. A disconnected sender (the decode thread dropped
    /// its end without replying — decode failure, reader torn down mid-read)
    /// resolves to an empty image rather than hanging the caller forever.
    pub fn poll(&self) -> Poll {
        match self.rx.try_recv() {
            Ok(image) => Poll::Ready(image),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Ready(DecodedImage::empty()),
        }
    }
}

/// Object-safe capability set a reader must provide. `stop()` initiates
/// asynchronous shutdown; `has_stopped()` becomes true once it's safe to
/// drop the reader without blocking.
pub trait Reader: Send + Sync {
    fn info(&self) -> Info;
    fn read_video_frame(&self, media_time: RationalTime, layer: u32, reuse: Option<DecodedImage>) -> PendingFrame;
    fn has_pending_frames(&self) -> bool;
    fn cancel_all(&self);
    fn stop(&self);
    fn has_stopped(&self) -> bool;
}

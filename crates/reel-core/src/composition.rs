// crates/reel-core/src/composition.rs
//
// The composition tree: an immutable, borrowed-friendly model of a timeline.
// No `Rc`/`Arc` child pointers — tracks and items live in flat `Vec`s and are
// addressed by dense, `Copy` ids (`ClipId`), per the arena-over-pointer-graph
// guidance for a systems-language port of this kind of document.

use std::path::PathBuf;

use crate::time::{RationalTime, TimeRange};
use crate::transitions::TransitionKind;

/// Dense, stable identity for a clip: its position in the composition tree.
/// Valid only for the lifetime of the `Timeline` it was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClipId {
    pub track: u32,
    pub item:  u32,
}

/// Where a clip's pixels come from.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaReference {
    /// A single movie file or still image, resolved relative to the
    /// timeline's working directory when not absolute.
    External {
        target_url: PathBuf,
    },
    /// A numbered sequence of still images, e.g. `shot_0001.png`.
    ImageSequence {
        target_dir:   PathBuf,
        name_prefix:  String,
        name_suffix:  String,
        start_frame:  i64,
        frame_step:   i64,
        /// `None` when the document doesn't declare a rate for this
        /// sequence; the registry then falls back to the `SequenceIO/
        /// DefaultSpeed` I/O option the scheduler sets from the timeline's
        /// own rate (spec.md §6).
        rate:         Option<u32>,
        zero_padding: usize,
    },
    /// The clip names a media reference that could not be resolved at parse
    /// time (unknown reference kind, absent `target_url`). The walker still
    /// produces a layer for it — `Reader Registry::getOrOpen` is what turns
    /// this into `MediaOpenFailed`.
    Missing,
}

/// A time-trimmed window into a media source.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub name:            String,
    pub media:           MediaReference,
    /// Trimmed range in the media's own native rate.
    pub source_range:    TimeRange,
    /// Linear speed scalar applied to this clip's own local time. 1.0 = no
    /// warp. Per spec.md's preserved Open Question, only clip-level warps are
    /// composed — not any ancestor stack/track warps.
    pub time_warp_scale: f64,
}

impl Clip {
    pub fn duration(&self) -> RationalTime {
        self.source_range.duration
    }
}

/// A blend region between two neighboring items in a track.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub kind:       TransitionKind,
    /// How far the transition reaches backward into the preceding item.
    pub in_offset:  RationalTime,
    /// How far the transition reaches forward into the following item.
    pub out_offset: RationalTime,
}

/// An empty stretch of track-time — no image, no layer produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Gap {
    pub duration: RationalTime,
}

/// One entry in a track's item sequence. A tagged sum, matched exhaustively
/// by the walker rather than modeled as a class hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Clip(Clip),
    Transition(Transition),
    Gap(Gap),
}

impl Item {
    /// Track-time footprint of this item. Transitions occupy zero footprint
    /// — they describe a blend between their neighbors, not a region of
    /// track time of their own.
    pub fn duration(&self) -> RationalTime {
        match self {
            Item::Clip(c) => c.duration(),
            Item::Gap(g) => g.duration,
            Item::Transition(t) => RationalTime::zero(t.in_offset.rate),
        }
    }

    pub fn as_clip(&self) -> Option<&Clip> {
        match self {
            Item::Clip(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Item::Transition(t) => Some(t),
            _ => None,
        }
    }
}

/// An item together with its resolved position in track-time.
#[derive(Clone, Debug)]
pub struct TrackItem {
    pub item:           Item,
    /// Start position in the track's own rate.
    pub start_in_track: RationalTime,
    /// Footprint in the track's own rate (item duration rescaled).
    pub track_duration: RationalTime,
}

impl TrackItem {
    pub fn trimmed_range(&self) -> TimeRange {
        TimeRange::new(self.start_in_track, self.track_duration)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Invariant: items do not overlap in track-time. `build()` computes
/// `start_in_track` by laying items out back-to-back in order — overlap can
/// only be introduced by a malformed document, which `build()` never
/// produces; anything handed a pre-built `Vec<TrackItem>` is trusted not to
/// violate it.
#[derive(Clone, Debug)]
pub struct Track {
    pub name:  String,
    pub kind:  TrackKind,
    pub items: Vec<TrackItem>,
    pub rate:  u32,
}

impl Track {
    /// Lay out `items` sequentially starting at track-time zero.
    pub fn build(name: String, kind: TrackKind, rate: u32, items: Vec<Item>) -> Self {
        let mut cursor = RationalTime::zero(rate);
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let track_duration = item.duration().rescaled_to(rate);
            resolved.push(TrackItem {
                item,
                start_in_track: cursor,
                track_duration,
            });
            cursor = cursor + track_duration;
        }
        Self { name, kind, items: resolved, rate }
    }

    pub fn duration(&self) -> RationalTime {
        self.items
            .last()
            .map(|ti| ti.start_in_track + ti.track_duration)
            .unwrap_or_else(|| RationalTime::zero(self.rate))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Stack {
    pub tracks: Vec<Track>,
}

impl Stack {
    pub fn video_tracks(&self) -> impl Iterator<Item = (u32, &Track)> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TrackKind::Video)
            .map(|(i, t)| (i as u32, t))
    }
}

/// The parsed edit-list document, read-only for the lifetime of the facade
/// that borrows it.
#[derive(Clone, Debug)]
pub struct Timeline {
    pub name:              String,
    pub global_start_time: RationalTime,
    pub rate:              u32,
    pub stack:             Stack,
    /// Directory relative paths in `MediaReference`s are resolved against.
    pub working_dir:       PathBuf,
}

impl Timeline {
    pub fn duration(&self) -> RationalTime {
        self.stack
            .tracks
            .iter()
            .map(|t| t.duration().rescaled_to(self.rate))
            .max_by(|a, b| a.compare_to(b))
            .unwrap_or_else(|| RationalTime::zero(self.rate))
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.stack
            .tracks
            .get(id.track as usize)?
            .items
            .get(id.item as usize)?
            .item
            .as_clip()
    }

    pub fn track_item(&self, id: ClipId) -> Option<&TrackItem> {
        self.stack.tracks.get(id.track as usize)?.items.get(id.item as usize)
    }
}

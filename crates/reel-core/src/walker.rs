// crates/reel-core/src/walker.rs
//
// The composition walker: given a presentation time, finds the visible item
// per video track and, if it neighbors a transition close enough to reach
// across, blends in the neighbor and a phase in [0, 1]. Pure function of the
// composition tree — no reader, no I/O, nothing here can block or fail.

use std::cmp::Ordering;

use crate::composition::{Clip, ClipId, Timeline, Track, TrackItem};
use crate::time::{RationalTime, TimeTransform};
use crate::transitions::TransitionKind;

/// One resolved layer for a single video track at a single presentation
/// time: which clip(s) to read from, at what media time, and how to blend
/// them. The reader registry and scheduler turn this into actual pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerDescriptor {
    pub primary:              ClipId,
    pub primary_media_time:   RationalTime,
    pub secondary:            Option<ClipId>,
    pub secondary_media_time: Option<RationalTime>,
    pub transition:           TransitionKind,
    pub transition_phase:     f32,
}

/// Walk every video track at `t_p`, in track order (bottom to top).
pub fn walk(timeline: &Timeline, t_p: RationalTime) -> Vec<LayerDescriptor> {
    let mut out = Vec::new();
    for (track_idx, track) in timeline.stack.video_tracks() {
        let t_track = (t_p - timeline.global_start_time).rescaled_to(track.rate);
        if let Some(layer) = walk_track(track_idx, track, t_track) {
            out.push(layer);
        }
    }
    out
}

fn walk_track(track_idx: u32, track: &Track, t_track: RationalTime) -> Option<LayerDescriptor> {
    let item_idx = track.items.iter().position(|ti| ti.trimmed_range().contains(t_track))?;
    let ti = &track.items[item_idx];
    // A Gap at this position produces no layer; transitions never occupy a
    // nonzero-width slice of track-time so the position() search never lands
    // on one directly.
    ti.item.as_clip()?;

    let (primary, primary_media_time) = media_time_at(track_idx, track, item_idx, t_track)?;
    let mut result = LayerDescriptor {
        primary,
        primary_media_time,
        secondary: None,
        secondary_media_time: None,
        transition: TransitionKind::None,
        transition_phase: 0.0,
    };

    let item_start = ti.start_in_track;
    let item_end_inclusive = ti.trimmed_range().end_inclusive();
    let rate = item_start.rate;

    let right_transition = track.items.get(item_idx + 1).and_then(|n| n.item.as_transition());
    if let Some(rt) = right_transition {
        let a = item_end_inclusive - rt.in_offset;
        if t_track.compare_to(&a) == Ordering::Greater {
            let b = item_end_inclusive + rt.out_offset + RationalTime::one_tick(rate);
            result.transition = rt.kind;
            result.transition_phase = phase_of(t_track, a, b);
            if let Some((sec_id, sec_time)) = media_time_at(track_idx, track, item_idx + 2, t_track) {
                result.secondary = Some(sec_id);
                result.secondary_media_time = Some(sec_time);
            }
        }
    }

    if result.transition == TransitionKind::None {
        let left_transition =
            item_idx.checked_sub(1).and_then(|i| track.items.get(i)).and_then(|n| n.item.as_transition());
        if let Some(lt) = left_transition {
            let b = item_start + lt.out_offset;
            if t_track.compare_to(&b) == Ordering::Less {
                let a = item_start - lt.in_offset - RationalTime::one_tick(rate);
                result.transition = lt.kind;
                result.transition_phase = phase_of(t_track, a, b);
                // The left neighbor is the actual primary for this blend —
                // what we resolved above becomes the secondary.
                if let Some(left_idx) = item_idx.checked_sub(2) {
                    if let Some((left_id, left_time)) = media_time_at(track_idx, track, left_idx, t_track) {
                        result.secondary = Some(result.primary);
                        result.secondary_media_time = Some(result.primary_media_time);
                        result.primary = left_id;
                        result.primary_media_time = left_time;
                    }
                }
            }
        }
    }

    Some(result)
}

fn phase_of(t: RationalTime, a: RationalTime, b: RationalTime) -> f32 {
    let span = b.to_seconds() - a.to_seconds();
    if span == 0.0 {
        return 1.0;
    }
    ((t.to_seconds() - a.to_seconds()) / span) as f32
}

/// Resolve the clip at `idx` in `track`, if any, to its `ClipId` and media
/// time — looking one slot back for the transition that determines the
/// clip's own left-offset shift into its source range.
fn media_time_at(
    track_idx: u32,
    track: &Track,
    idx: usize,
    t_track: RationalTime,
) -> Option<(ClipId, RationalTime)> {
    let ti = track.items.get(idx)?;
    let clip = ti.item.as_clip()?;
    let left_in_offset =
        idx.checked_sub(1).and_then(|i| track.items.get(i)).and_then(|n| n.item.as_transition()).map(|t| t.in_offset);
    let media_time = media_time_of(ti, clip, t_track, left_in_offset);
    Some((ClipId { track: track_idx, item: idx as u32 }, media_time))
}

/// `startMedia = clip.sourceRange.start − leftTransition.inOffset` (zero if
/// no left transition); apply the clip's own linear time warp around that
/// origin, then rescale to the clip's own native rate (the media's rate).
fn media_time_of(
    item: &TrackItem,
    clip: &Clip,
    t_track: RationalTime,
    left_in_offset: Option<RationalTime>,
) -> RationalTime {
    let native_rate = clip.source_range.start.rate;
    let clip_local = (t_track - item.start_in_track) + clip.source_range.start;
    let left_offset = left_in_offset.unwrap_or_else(|| RationalTime::zero(native_rate));
    let start_media = clip.source_range.start - left_offset;

    let warp = TimeTransform { offset: RationalTime::zero(native_rate), scale: clip.time_warp_scale };
    let warped = warp.apply(clip_local - start_media);
    (warped + start_media).rescaled_to(native_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Item, MediaReference, Stack, TrackKind};
    use std::path::PathBuf;

    fn clip(name: &str, frames: i64, rate: u32) -> Item {
        Item::Clip(Clip {
            name: name.to_string(),
            media: MediaReference::External { target_url: PathBuf::from(format!("{name}.mov")) },
            source_range: TimeRange::new(RationalTime::zero(rate), RationalTime::new(frames, rate)),
            time_warp_scale: 1.0,
        })
    }

    fn timeline_with(items: Vec<Item>, rate: u32) -> Timeline {
        let track = Track::build("V1".into(), TrackKind::Video, rate, items);
        Timeline {
            name: "t".into(),
            global_start_time: RationalTime::zero(rate),
            rate,
            stack: Stack { tracks: vec![track] },
            working_dir: PathBuf::from("."),
        }
    }

    use crate::time::TimeRange;

    #[test]
    fn single_clip_resolves_to_one_layer_no_transition() {
        let timeline = timeline_with(vec![clip("C", 48, 24)], 24);
        let layers = walk(&timeline, RationalTime::new(10, 24));
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].transition, TransitionKind::None);
        assert_eq!(layers[0].primary, ClipId { track: 0, item: 0 });
        assert_eq!(layers[0].primary_media_time, RationalTime::new(10, 24));
    }

    #[test]
    fn dissolve_phase_matches_boundary_formula() {
        use crate::composition::Transition;

        let in_offset = RationalTime::new(6, 24);
        let out_offset = RationalTime::new(6, 24);
        let items = vec![
            clip("A", 48, 24),
            Item::Transition(Transition { kind: TransitionKind::Dissolve, in_offset, out_offset }),
            clip("B", 48, 24),
        ];
        let timeline = timeline_with(items, 24);

        // item A occupies track-time [0, 48), end_inclusive = 47.
        let item_end_inclusive = RationalTime::new(47, 24);
        let a = item_end_inclusive - in_offset;
        let b = item_end_inclusive + out_offset + RationalTime::one_tick(24);

        let at_a = walk(&timeline, a);
        assert_eq!(at_a[0].transition, TransitionKind::None, "phase only begins strictly after a");

        let just_past_a = a + RationalTime::one_tick(24);
        let layers = walk(&timeline, just_past_a);
        assert_eq!(layers[0].transition, TransitionKind::Dissolve);
        assert_eq!(layers[0].primary, ClipId { track: 0, item: 0 });
        assert_eq!(layers[0].secondary, Some(ClipId { track: 0, item: 2 }));

        // t = itemEnd - 3 (A.end == 48) -> phase = (3+6)/(6+6+1)
        let t = RationalTime::new(48 - 3, 24);
        let layers = walk(&timeline, t);
        let expected = (t.to_seconds() - a.to_seconds()) / (b.to_seconds() - a.to_seconds());
        assert!((layers[0].transition_phase as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn gap_produces_no_layer() {
        use crate::composition::Gap;
        let items = vec![Item::Gap(Gap { duration: RationalTime::new(24, 24) })];
        let timeline = timeline_with(items, 24);
        let layers = walk(&timeline, RationalTime::new(5, 24));
        assert!(layers.is_empty());
    }

    #[test]
    fn unknown_transition_tag_degrades_to_none() {
        assert_eq!(TransitionKind::from_tag("SMPTE_Wipe"), TransitionKind::None);
        assert_eq!(TransitionKind::from_tag("SMPTE_Dissolve"), TransitionKind::Dissolve);
    }
}

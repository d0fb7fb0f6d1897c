// crates/reel-core/src/document.rs
//
// Deserializes the edit-list JSON (an OTIO-shaped subset: timeline / stack /
// track / clip / transition / gap / external-reference / image-sequence-
// reference) into the in-memory composition tree. Full OTIO schema fidelity
// (metadata dictionaries, markers, non-linear effects, audio authoring) is
// out of scope — this resolves exactly enough to drive the walker.

use std::path::PathBuf;

use serde::Deserialize;

use crate::composition::{Clip, Gap, Item, MediaReference, Stack, Timeline, Track, TrackKind, Transition};
use crate::error::{CoreError, Result};
use crate::time::{RationalTime, TimeRange};

#[derive(Deserialize)]
struct RationalTimeDto {
    value: i64,
    rate:  u32,
}

impl RationalTimeDto {
    fn into_core(self, field: &str) -> Result<RationalTime> {
        if self.rate == 0 {
            return Err(CoreError::CompositionInvalid(format!("{field}: rate must be positive")));
        }
        Ok(RationalTime::new(self.value, self.rate))
    }
}

#[derive(Deserialize)]
struct TimeRangeDto {
    start:    RationalTimeDto,
    duration: RationalTimeDto,
}

impl TimeRangeDto {
    fn into_core(self, field: &str) -> Result<TimeRange> {
        let start = self.start.into_core(&format!("{field}.start"))?;
        let duration = self.duration.into_core(&format!("{field}.duration"))?;
        if duration.value < 0 {
            return Err(CoreError::CompositionInvalid(format!("{field}: duration must not be negative")));
        }
        Ok(TimeRange::new(start, duration))
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum MediaReferenceDto {
    External {
        target_url: PathBuf,
    },
    ImageSequence {
        target_dir:   PathBuf,
        name_prefix:  String,
        name_suffix:  String,
        start_frame:  i64,
        #[serde(default = "default_frame_step")]
        frame_step:   i64,
        /// Absent means "use the timeline's own rate" — resolved later via
        /// `SequenceIO/DefaultSpeed` rather than here, since the document
        /// parser has no I/O-options context.
        #[serde(default)]
        rate:         Option<u32>,
        #[serde(default)]
        zero_padding: usize,
    },
    Missing,
}

fn default_frame_step() -> i64 {
    1
}

impl MediaReferenceDto {
    fn into_core(self) -> MediaReference {
        match self {
            MediaReferenceDto::External { target_url } => MediaReference::External { target_url },
            MediaReferenceDto::ImageSequence {
                target_dir,
                name_prefix,
                name_suffix,
                start_frame,
                frame_step,
                rate,
                zero_padding,
            } => MediaReference::ImageSequence {
                target_dir,
                name_prefix,
                name_suffix,
                start_frame,
                frame_step,
                rate,
                zero_padding,
            },
            MediaReferenceDto::Missing => MediaReference::Missing,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ItemDto {
    Clip {
        name: String,
        #[serde(default = "default_missing_media")]
        media: MediaReferenceDto,
        source_range: TimeRangeDto,
        #[serde(default = "default_warp_scale")]
        time_warp_scale: f64,
    },
    Transition {
        /// Raw document tag — unrecognized values degrade to `None` rather
        /// than failing the parse.
        kind: String,
        in_offset:  RationalTimeDto,
        out_offset: RationalTimeDto,
    },
    Gap {
        duration: RationalTimeDto,
    },
}

fn default_missing_media() -> MediaReferenceDto {
    MediaReferenceDto::Missing
}

fn default_warp_scale() -> f64 {
    1.0
}

impl ItemDto {
    fn into_core(self, field: &str) -> Result<Item> {
        match self {
            ItemDto::Clip { name, media, source_range, time_warp_scale } => Ok(Item::Clip(Clip {
                name,
                media: media.into_core(),
                source_range: source_range.into_core(&format!("{field}.source_range"))?,
                time_warp_scale,
            })),
            ItemDto::Transition { kind, in_offset, out_offset } => Ok(Item::Transition(Transition {
                kind: crate::transitions::TransitionKind::from_tag(&kind),
                in_offset: in_offset.into_core(&format!("{field}.in_offset"))?,
                out_offset: out_offset.into_core(&format!("{field}.out_offset"))?,
            })),
            ItemDto::Gap { duration } => {
                let duration = duration.into_core(&format!("{field}.duration"))?;
                Ok(Item::Gap(Gap { duration }))
            }
        }
    }
}

#[derive(Deserialize)]
enum TrackKindDto {
    Video,
    Audio,
}

impl From<TrackKindDto> for TrackKind {
    fn from(k: TrackKindDto) -> Self {
        match k {
            TrackKindDto::Video => TrackKind::Video,
            TrackKindDto::Audio => TrackKind::Audio,
        }
    }
}

#[derive(Deserialize)]
struct TrackDto {
    name:  String,
    kind:  TrackKindDto,
    #[serde(default)]
    rate:  Option<u32>,
    items: Vec<ItemDto>,
}

#[derive(Deserialize)]
struct StackDto {
    tracks: Vec<TrackDto>,
}

#[derive(Deserialize)]
struct TimelineDto {
    #[serde(default)]
    name: String,
    #[serde(default = "default_global_start")]
    global_start_time: RationalTimeDto,
    rate: u32,
    stack: StackDto,
    #[serde(default)]
    working_dir: Option<PathBuf>,
}

fn default_global_start() -> RationalTimeDto {
    RationalTimeDto { value: 0, rate: 24 }
}

/// Parse a composition document from its JSON text.
pub fn parse(json: &str) -> Result<Timeline> {
    let dto: TimelineDto =
        serde_json::from_str(json).map_err(|e| CoreError::CompositionInvalid(e.to_string()))?;
    build(dto)
}

fn build(dto: TimelineDto) -> Result<Timeline> {
    if dto.rate == 0 {
        return Err(CoreError::CompositionInvalid("timeline rate must be positive".into()));
    }
    if dto.stack.tracks.is_empty() {
        return Err(CoreError::CompositionInvalid("timeline has no tracks".into()));
    }

    let global_start_time = dto.global_start_time.into_core("global_start_time")?;

    let mut tracks = Vec::with_capacity(dto.stack.tracks.len());
    for (idx, track_dto) in dto.stack.tracks.into_iter().enumerate() {
        let track_rate = track_dto.rate.unwrap_or(dto.rate);
        if track_rate == 0 {
            return Err(CoreError::CompositionInvalid(format!("tracks[{idx}]: rate must be positive")));
        }
        let mut items = Vec::with_capacity(track_dto.items.len());
        for (item_idx, item_dto) in track_dto.items.into_iter().enumerate() {
            items.push(item_dto.into_core(&format!("tracks[{idx}].items[{item_idx}]"))?);
        }
        tracks.push(Track::build(track_dto.name, track_dto.kind.into(), track_rate, items));
    }

    Ok(Timeline {
        name: dto.name,
        global_start_time,
        rate: dto.rate,
        stack: Stack { tracks },
        working_dir: dto.working_dir.unwrap_or_else(|| PathBuf::from(".")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "rate": 24,
            "stack": {
                "tracks": [
                    { "name": "V1", "kind": "Video", "items": [
                        { "type": "Clip", "name": "A", "media": { "type": "External", "target_url": "a.mov" },
                          "source_range": { "start": { "value": 0, "rate": 24 }, "duration": { "value": 48, "rate": 24 } } },
                        { "type": "Transition", "kind": "SMPTE_Dissolve",
                          "in_offset": { "value": 6, "rate": 24 }, "out_offset": { "value": 6, "rate": 24 } },
                        { "type": "Clip", "name": "B", "media": { "type": "External", "target_url": "b.mov" },
                          "source_range": { "start": { "value": 0, "rate": 24 }, "duration": { "value": 48, "rate": 24 } } }
                    ] }
                ]
            }
        }"#
    }

    #[test]
    fn parses_a_well_formed_document() {
        let timeline = parse(sample()).expect("parse should succeed");
        assert_eq!(timeline.stack.tracks.len(), 1);
        assert_eq!(timeline.stack.tracks[0].items.len(), 3);
    }

    #[test]
    fn zero_rate_is_composition_invalid() {
        let bad = r#"{"rate":0,"stack":{"tracks":[]}}"#;
        let err = parse(bad).unwrap_err();
        assert!(matches!(err, CoreError::CompositionInvalid(_)));
    }

    #[test]
    fn empty_stack_is_composition_invalid() {
        let bad = r#"{"rate":24,"stack":{"tracks":[]}}"#;
        assert!(parse(bad).is_err());
    }

    #[test]
    fn unknown_transition_kind_degrades_to_none_not_an_error() {
        let doc = r#"{
            "rate": 24,
            "stack": { "tracks": [ { "name": "V1", "kind": "Video", "items": [
                { "type": "Transition", "kind": "SMPTE_Wipe",
                  "in_offset": { "value": 6, "rate": 24 }, "out_offset": { "value": 6, "rate": 24 } }
            ] } ] }
        }"#;
        let timeline = parse(doc).expect("unknown transition kind should not fail the parse");
        let item = &timeline.stack.tracks[0].items[0].item;
        assert_eq!(item.as_transition().unwrap().kind, crate::transitions::TransitionKind::None);
    }
}

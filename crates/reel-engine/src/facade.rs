// crates/reel-engine/src/facade.rs
//
// The public surface: lifecycle, request submission, cancellation, tuning
// knobs. Everything here is thread-safe — the heavy lifting lives in the
// scheduler thread this owns.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reel_core::{Clip, Item, MediaReference, RationalTime, Stack, Timeline, TimeRange, Track, TrackKind};

use crate::error::EngineError;
use crate::options::IoOptions;
use crate::queue::FramePromise;
use crate::reader::Info;
use crate::registry::open_reader;
use crate::scheduler::Scheduler;

pub struct Player {
    timeline:  Arc<Timeline>,
    scheduler: Scheduler,
}

impl Player {
    /// Take ownership of an already-parsed composition. Borrowed for the
    /// lifetime of the facade, same as the reader registry's clips.
    pub fn create(timeline: Timeline) -> Self {
        let timeline = Arc::new(timeline);
        let scheduler = Scheduler::spawn(timeline.clone());
        Self { timeline, scheduler }
    }

    /// If the I/O system can read `path` directly as media, synthesize a
    /// single-clip timeline around it. Otherwise, parse `path` as a
    /// composition document.
    pub fn create_from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();

        let opened = open_reader(
            &Clip {
                name: path.to_string_lossy().into_owned(),
                media: MediaReference::External { target_url: path.to_path_buf() },
                source_range: TimeRange::new(RationalTime::zero(24), RationalTime::zero(24)),
                time_warp_scale: 1.0,
            },
            Path::new("."),
            &IoOptions::default(),
        );

        if let Ok(reader) = opened {
            let info = reader.info();
            drop(reader);

            let rate = info.video_range.duration.rate.max(1);
            let working_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| std::path::PathBuf::from("."));
            let clip = Clip {
                name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                media: MediaReference::External { target_url: path.to_path_buf() },
                source_range: info.video_range,
                time_warp_scale: 1.0,
            };
            let track = Track::build("V1".into(), TrackKind::Video, rate, vec![Item::Clip(clip)]);
            let timeline = Timeline {
                name: String::new(),
                global_start_time: RationalTime::zero(rate),
                rate,
                stack: Stack { tracks: vec![track] },
                working_dir,
            };
            return Ok(Self::create(timeline));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|source| EngineError::MediaOpenFailed { path: path.to_path_buf(), source: source.into() })?;
        let timeline = reel_core::document::parse(&text)
            .map_err(|source| EngineError::MediaOpenFailed { path: path.to_path_buf(), source: source.into() })?;
        Ok(Self::create(timeline))
    }

    pub fn get_global_start_time(&self) -> RationalTime {
        self.timeline.global_start_time
    }

    pub fn get_duration(&self) -> RationalTime {
        self.timeline.duration()
    }

    /// Depth-first walk of the composition: the first video track's first
    /// clip whose reader yields non-empty video info.
    pub fn get_video_info(&self) -> Option<Info> {
        for (_, track) in self.timeline.stack.video_tracks() {
            for track_item in &track.items {
                let Some(clip) = track_item.item.as_clip() else { continue };
                let Ok(reader) = open_reader(clip, &self.timeline.working_dir, &IoOptions::default()) else { continue };
                let info = reader.info();
                if !info.is_empty() {
                    return Some(info);
                }
            }
        }
        None
    }

    pub fn get_frame(&self, time: RationalTime, layer: u32, reuse: Option<reel_core::DecodedImage>) -> FramePromise {
        self.scheduler.queue().submit(time, layer, reuse)
    }

    pub fn cancel_frames(&self) {
        self.scheduler.cancel_frames();
    }

    pub fn set_active_ranges(&self, ranges: Vec<TimeRange>) {
        self.scheduler.set_active_ranges(ranges);
    }

    pub fn set_request_count(&self, budget: usize) {
        self.scheduler.set_request_count(budget);
    }

    pub fn set_request_timeout(&self, timeout: Duration) {
        self.scheduler.set_request_timeout(timeout);
    }

    pub fn set_io_options(&self, options: IoOptions) {
        self.scheduler.set_io_options(options);
    }

    /// Number of readers currently open in the registry, same count the
    /// scheduler's periodic summary logs.
    pub fn open_reader_count(&self) -> usize {
        self.scheduler.open_reader_count()
    }
}

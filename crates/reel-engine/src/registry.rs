// crates/reel-engine/src/registry.rs
//
// Keyed by `ClipId` rather than a pointer or content hash — the composition
// tree is a dense arena, so the clip's own index already is a stable key for
// the lifetime of the `Timeline` it was resolved against.

use std::path::Path;
use std::sync::Arc;

use reel_core::{Clip, ClipId, MediaReference, RationalTime, TimeRange};

use crate::active_ranges::ActiveRangeTracker;
use crate::error::EngineError;
use crate::movie_reader::MovieReader;
use crate::options::IoOptions;
use crate::reader::{Info, Reader};
use crate::sequence_reader::{ImageSequenceReader, SequenceSpec};

enum ReaderState {
    Running,
    Stopping,
}

struct ReaderEntry {
    reader: Arc<dyn Reader>,
    info:   Info,
    #[allow(dead_code)] // kept for parity with the spec's {Running, Stopping, Stopped} states; Stopped readers are dropped, not stored.
    state:  ReaderState,
}

#[derive(Default)]
pub struct ReaderRegistry {
    open:     std::collections::HashMap<ClipId, ReaderEntry>,
    stopping: Vec<(ClipId, Arc<dyn Reader>)>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a clip's reader, on a cache miss calling `open` (either the
    /// real I/O system, via `crate::scheduler`'s `open_for`, or a
    /// deterministic test double). Fails with whatever `open` fails with —
    /// `MediaOpenFailed` for the real backends.
    pub fn get_or_open_with<F>(&mut self, id: ClipId, open: F) -> Result<(Arc<dyn Reader>, Info), EngineError>
    where
        F: FnOnce() -> Result<Arc<dyn Reader>, EngineError>,
    {
        if let Some(entry) = self.open.get(&id) {
            return Ok((entry.reader.clone(), entry.info.clone()));
        }

        let reader = open()?;
        let info = reader.info();
        tracing::info!(track = id.track, item = id.item, "opened reader");
        self.open.insert(id, ReaderEntry { reader: reader.clone(), info: info.clone(), state: ReaderState::Running });
        Ok((reader, info))
    }

    /// If `effective_range` (translated into the global time domain) doesn't
    /// intersect any active range, and the reader reports nothing pending,
    /// move it to the stopping list. Called once per tick, after new
    /// requests for this tick have already been dispatched.
    pub fn evict_if_idle(&mut self, id: ClipId, effective_range: &TimeRange, active: &ActiveRangeTracker) {
        let should_evict = match self.open.get(&id) {
            Some(entry) => !active.intersects_any(effective_range) && !entry.reader.has_pending_frames(),
            None => false,
        };
        if should_evict {
            if let Some(entry) = self.open.remove(&id) {
                entry.reader.stop();
                self.stopping.push((id, entry.reader));
            }
        }
    }

    /// Drop every stopping reader whose shutdown has completed.
    pub fn reap(&mut self) {
        self.stopping.retain(|(_, reader)| !reader.has_stopped());
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn open_ids(&self) -> Vec<ClipId> {
        self.open.keys().copied().collect()
    }

    pub fn stopping_count(&self) -> usize {
        self.stopping.len()
    }

    /// Ask every open and stopping reader to drop in-flight decode work.
    /// In-flight requests are still allowed to finish.
    pub fn cancel_all(&self) {
        for entry in self.open.values() {
            entry.reader.cancel_all();
        }
        for (_, reader) in &self.stopping {
            reader.cancel_all();
        }
    }

    /// Stop every open reader and wait for the stopping list to drain, used
    /// during facade teardown.
    pub fn stop_all_and_wait(&mut self) {
        let ids: Vec<ClipId> = self.open.keys().copied().collect();
        for id in ids {
            if let Some(entry) = self.open.remove(&id) {
                entry.reader.stop();
                self.stopping.push((id, entry.reader));
            }
        }
        while !self.stopping.is_empty() {
            self.reap();
            if !self.stopping.is_empty() {
                std::thread::yield_now();
            }
        }
    }
}

pub(crate) fn open_reader(clip: &Clip, working_dir: &Path, options: &IoOptions) -> Result<Arc<dyn Reader>, EngineError> {
    match &clip.media {
        MediaReference::External { target_url } => {
            let path = resolve_path(working_dir, target_url);
            let reader = MovieReader::open(&path, options)
                .map_err(|source| EngineError::MediaOpenFailed { path: path.clone(), source })?;
            Ok(Arc::new(reader))
        }
        MediaReference::ImageSequence { target_dir, name_prefix, name_suffix, start_frame, frame_step, rate, zero_padding } => {
            let dir = resolve_path(working_dir, target_dir);
            // A clip with no declared rate falls back to `SequenceIO/
            // DefaultSpeed`, the key the scheduler sets from the timeline's
            // own rate before every open (spec.md §6).
            let resolved_rate = rate.unwrap_or_else(|| {
                options
                    .get(crate::options::SEQUENCE_IO_DEFAULT_SPEED)
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(1)
            });
            let spec = SequenceSpec {
                target_dir: dir.clone(),
                name_prefix: name_prefix.clone(),
                name_suffix: name_suffix.clone(),
                start_frame: *start_frame,
                frame_step: *frame_step,
                rate: resolved_rate,
                zero_padding: *zero_padding,
            };
            // The document doesn't carry an explicit frame count; approximate
            // it from the clip's own trimmed duration at the sequence's rate.
            let frame_count = clip.source_range.duration.rescaled_to(resolved_rate).value.max(1);
            let reader = ImageSequenceReader::open(spec, frame_count, options)
                .map_err(|source| EngineError::MediaOpenFailed { path: dir, source })?;
            Ok(Arc::new(reader))
        }
        MediaReference::Missing => Err(EngineError::MediaOpenFailed {
            path: working_dir.join(&clip.name),
            source: anyhow::anyhow!("clip has no resolvable media reference"),
        }),
    }
}

fn resolve_path(working_dir: &Path, maybe_relative: &Path) -> std::path::PathBuf {
    if maybe_relative.is_absolute() {
        maybe_relative.to_path_buf()
    } else {
        working_dir.join(maybe_relative)
    }
}

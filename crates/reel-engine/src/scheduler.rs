// crates/reel-engine/src/scheduler.rs
//
// The single background worker: drains new requests, spawns reader reads,
// polls for completion with a non-blocking `try_recv` (never awaits, never
// blocks on a reader), fulfills promises, and periodically reaps idle
// readers. Mirrors the teacher's `MediaWorker` thread — one dedicated
// scheduler thread per facade, readers touched only from this thread.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use reel_core::{Clip, ClipId, DecodedImage, Frame, RationalTime, Timeline, TimeRange, TransitionKind};

use crate::active_ranges::ActiveRangeTracker;
use crate::error::EngineError;
use crate::options::{with_default_speed, IoOptions};
use crate::queue::{FrameRequest, RequestQueue};
use crate::reader::Poll as ReaderPoll;
use crate::reader::{PendingFrame, Reader};
use crate::registry::{open_reader, ReaderRegistry};

const SUMMARY_INTERVAL: Duration = Duration::from_secs(10);

/// Test-only seam: lets `#[cfg(test)]` code substitute a deterministic
/// reader for the real ffmpeg/image backends without touching the
/// production `spawn()` path, the same role `get_or_open_with` plays for
/// `ReaderRegistry` in isolation.
type Opener = Arc<dyn Fn(ClipId, &Clip) -> Result<Arc<dyn Reader>, EngineError> + Send + Sync>;

pub struct SchedulerTuning {
    pub budget:     usize,
    pub timeout:    Duration,
    pub io_options: IoOptions,
}

impl Default for SchedulerTuning {
    fn default() -> Self {
        Self { budget: 16, timeout: Duration::from_millis(1), io_options: IoOptions::default() }
    }
}

enum LayerSlot {
    Pending(PendingFrame),
    Ready(DecodedImage),
}

impl LayerSlot {
    fn poll_ready(&mut self) -> bool {
        if let LayerSlot::Pending(p) = self {
            if let ReaderPoll::Ready(image) = p.poll() {
                *self = LayerSlot::Ready(image);
            }
        }
        matches!(self, LayerSlot::Ready(_))
    }

    fn into_image(self) -> DecodedImage {
        match self {
            LayerSlot::Ready(image) => image,
            LayerSlot::Pending(_) => DecodedImage::empty(),
        }
    }
}

struct InFlightLayer {
    primary:    LayerSlot,
    secondary:  Option<LayerSlot>,
    transition: TransitionKind,
    phase:      f32,
}

impl InFlightLayer {
    fn empty() -> Self {
        Self {
            primary: LayerSlot::Ready(DecodedImage::empty()),
            secondary: None,
            transition: TransitionKind::None,
            phase: 0.0,
        }
    }

    fn poll_ready(&mut self) -> bool {
        let primary_ready = self.primary.poll_ready();
        let secondary_ready = self.secondary.as_mut().map(LayerSlot::poll_ready).unwrap_or(true);
        primary_ready && secondary_ready
    }

    fn into_layer(self) -> reel_core::Layer {
        reel_core::Layer {
            image_a: self.primary.into_image(),
            image_b: self.secondary.map(LayerSlot::into_image),
            transition: self.transition,
            transition_phase: self.phase,
        }
    }
}

struct InFlightRequest {
    time:    RationalTime,
    promise: crate::queue::FramePromise,
    layers:  Vec<InFlightLayer>,
}

impl InFlightRequest {
    fn all_ready(&mut self) -> bool {
        self.layers.iter_mut().all(InFlightLayer::poll_ready)
    }

    fn into_frame(self) -> Frame {
        Frame { time: self.time, layers: self.layers.into_iter().map(InFlightLayer::into_layer).collect() }
    }
}

/// Owns the background thread. Dropping the handle stops the scheduler and
/// joins the thread, guaranteeing every outstanding promise is resolved
/// before the drop returns.
pub struct Scheduler {
    queue:          Arc<RequestQueue>,
    active_ranges:  Arc<Mutex<ActiveRangeTracker>>,
    tuning:         Arc<Mutex<SchedulerTuning>>,
    shutdown:       Arc<AtomicBool>,
    open_readers:   Arc<AtomicUsize>,
    cancel_readers: Arc<AtomicBool>,
    join_handle:    Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn(timeline: Arc<Timeline>) -> Self {
        Self::spawn_with_opener(timeline, None)
    }

    /// `opener` is `None` in production (readers are opened through the real
    /// `reel-engine` backends); tests pass `Some(..)` to substitute a mock
    /// reader so the scheduler tick can be exercised without real media
    /// files.
    pub(crate) fn spawn_with_opener(timeline: Arc<Timeline>, opener: Option<Opener>) -> Self {
        let queue = Arc::new(RequestQueue::new());
        let active_ranges = Arc::new(Mutex::new(ActiveRangeTracker::new()));
        let tuning = Arc::new(Mutex::new(SchedulerTuning::default()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let open_readers = Arc::new(AtomicUsize::new(0));
        let cancel_readers = Arc::new(AtomicBool::new(false));

        let thread_queue = queue.clone();
        let thread_active_ranges = active_ranges.clone();
        let thread_tuning = tuning.clone();
        let thread_shutdown = shutdown.clone();
        let thread_open_readers = open_readers.clone();
        let thread_cancel_readers = cancel_readers.clone();
        let join_handle = thread::spawn(move || {
            run(
                timeline,
                thread_queue,
                thread_active_ranges,
                thread_tuning,
                thread_shutdown,
                thread_open_readers,
                thread_cancel_readers,
                opener,
            );
        });

        Self { queue, active_ranges, tuning, shutdown, open_readers, cancel_readers, join_handle: Some(join_handle) }
    }

    /// Number of readers the registry currently holds open. Exposed for the
    /// same reason the scheduler's periodic summary logs it — callers (and
    /// tests) can observe eviction taking effect without reaching into the
    /// registry, which lives on the scheduler thread.
    pub fn open_reader_count(&self) -> usize {
        self.open_readers.load(Ordering::SeqCst)
    }

    pub fn queue(&self) -> &Arc<RequestQueue> {
        &self.queue
    }

    pub fn set_active_ranges(&self, ranges: Vec<TimeRange>) {
        self.active_ranges.lock().unwrap().set(ranges);
    }

    pub fn set_request_count(&self, budget: usize) {
        self.tuning.lock().unwrap().budget = budget;
    }

    pub fn set_request_timeout(&self, timeout: Duration) {
        self.tuning.lock().unwrap().timeout = timeout;
    }

    pub fn set_io_options(&self, options: IoOptions) {
        self.tuning.lock().unwrap().io_options = options;
    }

    /// Drops every pending request and asks the scheduler thread to tell
    /// every open reader to discard its in-flight decode work. The registry
    /// itself lives only on the scheduler thread, so the actual
    /// `ReaderRegistry::cancel_all()` call happens there, at the top of the
    /// next tick — this just raises the flag it checks.
    pub fn cancel_frames(&self) {
        for request in self.queue.cancel_all() {
            request.promise.resolve(Frame::empty(request.time));
        }
        self.cancel_readers.store(true, Ordering::SeqCst);
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.queue.stop();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    timeline: Arc<Timeline>,
    queue: Arc<RequestQueue>,
    active_ranges: Arc<Mutex<ActiveRangeTracker>>,
    tuning: Arc<Mutex<SchedulerTuning>>,
    shutdown: Arc<AtomicBool>,
    open_readers: Arc<AtomicUsize>,
    cancel_readers: Arc<AtomicBool>,
    opener: Option<Opener>,
) {
    let mut registry = ReaderRegistry::new();
    let mut in_flight: Vec<InFlightRequest> = Vec::new();
    let mut last_summary = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        if cancel_readers.swap(false, Ordering::SeqCst) {
            registry.cancel_all();
        }

        let (budget, timeout, io_options) = {
            let t = tuning.lock().unwrap();
            (t.budget, t.timeout, t.io_options.clone())
        };

        let to_promote = budget.saturating_sub(in_flight.len());
        let promoted = if to_promote > 0 {
            queue.drain_up_to(to_promote, timeout)
        } else {
            // Budget is fully committed — nothing to promote this tick.
            // Still bound the spin so in-flight polling doesn't busy-loop.
            thread::sleep(timeout);
            Vec::new()
        };

        for request in promoted {
            let in_flight_request = promote(&mut registry, &timeline, request, &io_options, opener.as_ref());
            in_flight.push(in_flight_request);
        }

        let mut still_pending = Vec::with_capacity(in_flight.len());
        for mut request in in_flight.drain(..) {
            if request.all_ready() {
                let promise = request.promise.clone();
                promise.resolve(request.into_frame());
            } else {
                still_pending.push(request);
            }
        }
        in_flight = still_pending;

        {
            let active = active_ranges.lock().unwrap();
            for id in registry.open_ids() {
                if let Some(effective_range) = effective_range_global(&timeline, id) {
                    registry.evict_if_idle(id, &effective_range, &active);
                }
            }
        }
        registry.reap();
        open_readers.store(registry.open_count(), Ordering::SeqCst);

        if last_summary.elapsed() >= SUMMARY_INTERVAL {
            tracing::info!(
                pending = queue.pending_len(),
                in_flight = in_flight.len(),
                budget,
                open_readers = registry.open_count(),
                stopping_readers = registry.stopping_count(),
                "scheduler tick summary"
            );
            last_summary = Instant::now();
        }
    }

    for request in queue.cancel_all() {
        request.promise.resolve(Frame::empty(request.time));
    }
    for mut request in in_flight {
        // Best-effort final poll — whatever isn't ready yet resolves empty
        // rather than leaving the promise dangling.
        request.all_ready();
        let promise = request.promise.clone();
        promise.resolve(request.into_frame());
    }
    registry.stop_all_and_wait();
    open_readers.store(0, Ordering::SeqCst);
}

fn promote(
    registry: &mut ReaderRegistry,
    timeline: &Timeline,
    request: FrameRequest,
    io_options: &IoOptions,
    opener: Option<&Opener>,
) -> InFlightRequest {
    let descriptors = reel_core::walk(timeline, request.time);
    let mut layers = Vec::with_capacity(descriptors.len());

    for desc in descriptors {
        let layer = match open_and_read(registry, timeline, &desc, request.layer, io_options, opener) {
            Ok(layer) => layer,
            Err(e) => {
                tracing::warn!(error = %e, "layer resolution failed, serving empty image");
                InFlightLayer::empty()
            }
        };
        layers.push(layer);
    }

    InFlightRequest { time: request.time, promise: request.promise, layers }
}

/// Open (or reuse) a clip's reader, preferring the test `opener` seam over
/// the real ffmpeg/image-backed `open_reader` when one is supplied.
fn open_for(
    registry: &mut ReaderRegistry,
    id: ClipId,
    clip: &Clip,
    timeline: &Timeline,
    io_options: &IoOptions,
    opener: Option<&Opener>,
) -> Result<Arc<dyn Reader>, EngineError> {
    registry
        .get_or_open_with(id, || match opener {
            Some(open) => open(id, clip),
            None => open_reader(clip, &timeline.working_dir, &with_default_speed(io_options, timeline.rate)),
        })
        .map(|(reader, _)| reader)
}

fn open_and_read(
    registry: &mut ReaderRegistry,
    timeline: &Timeline,
    desc: &reel_core::LayerDescriptor,
    layer: u32,
    io_options: &IoOptions,
    opener: Option<&Opener>,
) -> Result<InFlightLayer, EngineError> {
    let primary_clip = timeline.clip(desc.primary).expect("walker produced a ClipId for an existing clip");
    let primary_reader = open_for(registry, desc.primary, primary_clip, timeline, io_options, opener)?;
    let primary = LayerSlot::Pending(primary_reader.read_video_frame(desc.primary_media_time, layer, None));

    let secondary = match (desc.secondary, desc.secondary_media_time) {
        (Some(sec_id), Some(sec_time)) => {
            let sec_clip = timeline.clip(sec_id).expect("walker produced a ClipId for an existing clip");
            let sec_reader = open_for(registry, sec_id, sec_clip, timeline, io_options, opener)?;
            Some(LayerSlot::Pending(sec_reader.read_video_frame(sec_time, layer, None)))
        }
        _ => None,
    };

    Ok(InFlightLayer { primary, secondary, transition: desc.transition, phase: desc.transition_phase })
}

/// A clip's trimmed range, extended backward by a left-neighbor transition's
/// `in_offset` and forward by a right-neighbor transition's `out_offset`,
/// translated into the global (presentation) time domain. This is what
/// protects a reader from eviction while it's being read slightly outside
/// its own nominal span during a blend.
fn effective_range_global(timeline: &Timeline, id: ClipId) -> Option<TimeRange> {
    let track = timeline.stack.tracks.get(id.track as usize)?;
    let ti = track.items.get(id.item as usize)?;
    ti.item.as_clip()?;

    let left_in_offset = id
        .item
        .checked_sub(1)
        .and_then(|i| track.items.get(i as usize))
        .and_then(|n| n.item.as_transition())
        .map(|t| t.in_offset)
        .unwrap_or_else(|| RationalTime::zero(track.rate));
    let right_out_offset = track
        .items
        .get(id.item as usize + 1)
        .and_then(|n| n.item.as_transition())
        .map(|t| t.out_offset)
        .unwrap_or_else(|| RationalTime::zero(track.rate));

    let start = ti.start_in_track - left_in_offset;
    let end_exclusive = ti.trimmed_range().end_exclusive() + right_out_offset;
    let duration = end_exclusive - start;

    let global_start_at_track_rate = timeline.global_start_time.rescaled_to(track.rate);
    Some(TimeRange::new(start + global_start_at_track_rate, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool as StdAtomicBool;

    use reel_core::{Item, MediaReference, PixelLayout, Stack, Track, TrackKind, Transition};

    use crate::reader::{Info, VideoKind};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// Resolves every read immediately with a solid-color image keyed off
    /// the clip's name, so tests can tell which clip a layer's pixels came
    /// from without decoding anything real. Mirrors the registry's own
    /// `MockReader` but lives here so scheduler tests don't reach into
    /// `registry`'s private test module.
    struct MockReader {
        color:        u8,
        stopped:      StdAtomicBool,
        cancel_count: Arc<AtomicUsize>,
    }

    impl MockReader {
        fn new(color: u8) -> Self {
            Self { color, stopped: StdAtomicBool::new(false), cancel_count: Arc::new(AtomicUsize::new(0)) }
        }

        fn with_cancel_counter(color: u8, cancel_count: Arc<AtomicUsize>) -> Self {
            Self { color, stopped: StdAtomicBool::new(false), cancel_count }
        }
    }

    impl Reader for MockReader {
        fn info(&self) -> Info {
            Info {
                video_streams: vec![],
                video_range: TimeRange::new(RationalTime::zero(24), RationalTime::new(48, 24)),
                video_kind: VideoKind::Sequence,
                tags: Default::default(),
            }
        }
        fn read_video_frame(&self, _media_time: RationalTime, _layer: u32, _reuse: Option<DecodedImage>) -> PendingFrame {
            PendingFrame::ready(DecodedImage { width: 2, height: 2, layout: PixelLayout::Rgba8, data: vec![self.color; 16] })
        }
        fn has_pending_frames(&self) -> bool {
            false
        }
        fn cancel_all(&self) {
            self.cancel_count.fetch_add(1, Ordering::SeqCst);
        }
        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
        fn has_stopped(&self) -> bool {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    /// Picks a color per clip name so a test can assert which clip's pixels
    /// ended up in a layer's `image_a`/`image_b`.
    fn mock_opener() -> Opener {
        Arc::new(|_id: ClipId, clip: &Clip| {
            let color = match clip.name.as_str() {
                "A" => 10,
                "B" => 200,
                _ => 1,
            };
            Ok(Arc::new(MockReader::new(color)) as Arc<dyn Reader>)
        })
    }

    /// Same as `mock_opener`, but every reader it opens increments a shared
    /// counter on `cancel_all()` — lets a test observe that cancellation
    /// actually reached the readers, not just the pending queue.
    fn mock_opener_with_cancel_counter(cancel_count: Arc<AtomicUsize>) -> Opener {
        Arc::new(move |_id: ClipId, clip: &Clip| {
            let color = match clip.name.as_str() {
                "A" => 10,
                "B" => 200,
                _ => 1,
            };
            Ok(Arc::new(MockReader::with_cancel_counter(color, cancel_count.clone())) as Arc<dyn Reader>)
        })
    }

    fn clip_item(name: &str, frames: i64, rate: u32) -> Item {
        Item::Clip(Clip {
            name: name.to_string(),
            media: MediaReference::External { target_url: PathBuf::from(format!("{name}.mov")) },
            source_range: TimeRange::new(RationalTime::zero(rate), RationalTime::new(frames, rate)),
            time_warp_scale: 1.0,
        })
    }

    fn timeline_with(items: Vec<Item>, rate: u32) -> Arc<Timeline> {
        let track = Track::build("V1".into(), TrackKind::Video, rate, items);
        Arc::new(Timeline {
            name: "t".into(),
            global_start_time: RationalTime::zero(rate),
            rate,
            stack: Stack { tracks: vec![track] },
            working_dir: PathBuf::from("."),
        })
    }

    /// Scenario 1 (spec §8): single clip, one layer, no transition.
    #[test]
    fn single_clip_request_resolves_with_one_opaque_layer() {
        init_tracing();
        let timeline = timeline_with(vec![clip_item("A", 48, 24)], 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));

        let promise = scheduler.queue().submit(RationalTime::new(10, 24), 0, None);
        let frame = promise.wait();

        assert_eq!(frame.time, RationalTime::new(10, 24));
        assert_eq!(frame.layers.len(), 1);
        assert_eq!(frame.layers[0].transition, TransitionKind::None);
        assert!(frame.layers[0].image_b.is_none());
        assert_eq!(frame.layers[0].image_a.data[0], 10);
    }

    /// Scenario 2 (spec §8): a dissolve mid-blend carries both images and a
    /// phase matching the §4.3 formula, not a hardcoded constant.
    #[test]
    fn dissolve_request_carries_both_images_and_the_phase_formula() {
        init_tracing();
        let in_offset = RationalTime::new(6, 24);
        let out_offset = RationalTime::new(6, 24);
        let items = vec![
            clip_item("A", 48, 24),
            Item::Transition(Transition { kind: TransitionKind::Dissolve, in_offset, out_offset }),
            clip_item("B", 48, 24),
        ];
        let timeline = timeline_with(items, 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));

        // A.end == 48 (track-time [0,48)); request at end-3, inside the blend.
        let t = RationalTime::new(48 - 3, 24);
        let promise = scheduler.queue().submit(t, 0, None);
        let frame = promise.wait();

        assert_eq!(frame.layers.len(), 1);
        let layer = &frame.layers[0];
        assert_eq!(layer.transition, TransitionKind::Dissolve);
        assert_eq!(layer.image_a.data[0], 10, "primary should be clip A");
        assert_eq!(layer.image_b.as_ref().unwrap().data[0], 200, "secondary should be clip B");

        let item_end_inclusive = RationalTime::new(47, 24);
        let a = item_end_inclusive - in_offset;
        let b = item_end_inclusive + out_offset + RationalTime::one_tick(24);
        let expected = (t.to_seconds() - a.to_seconds()) / (b.to_seconds() - a.to_seconds());
        assert!((layer.transition_phase as f64 - expected).abs() < 1e-6);
    }

    /// Scenario 4 (spec §8): every one of 100 back-to-back requests, served
    /// against a budget far smaller than the batch, eventually resolves.
    #[test]
    fn all_requests_resolve_even_when_budget_is_smaller_than_the_batch() {
        init_tracing();
        let timeline = timeline_with(vec![clip_item("A", 4800, 24)], 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));
        scheduler.set_request_count(16);

        let promises: Vec<_> = (0..100)
            .map(|i| scheduler.queue().submit(RationalTime::new(i, 24), 0, None))
            .collect();

        for (i, promise) in promises.into_iter().enumerate() {
            let frame = promise.wait();
            assert_eq!(frame.time, RationalTime::new(i as i64, 24));
        }
    }

    /// Scenario 5 (spec §8): cancelling a request that never got past the
    /// pending queue resolves it with an empty Frame at the right time.
    #[test]
    fn cancel_frames_resolves_pending_request_with_empty_frame() {
        init_tracing();
        let timeline = timeline_with(vec![clip_item("A", 48, 24)], 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));
        // Starve promotion so the request is still sitting in the pending queue.
        scheduler.set_request_count(0);

        let t = RationalTime::new(10, 24);
        let promise = scheduler.queue().submit(t, 0, None);
        scheduler.cancel_frames();
        let frame = promise.wait();

        assert_eq!(frame.time, t);
        assert!(frame.layers.is_empty());
    }

    /// spec §4.5/§5: `cancel_frames()` must reach every open reader's own
    /// `cancel_all()`, not just drop the pending queue.
    #[test]
    fn cancel_frames_tells_open_readers_to_discard_in_flight_work() {
        init_tracing();
        let timeline = timeline_with(vec![clip_item("A", 48, 24)], 24);
        let cancel_count = Arc::new(AtomicUsize::new(0));
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener_with_cancel_counter(cancel_count.clone())));

        // Open a reader for A by letting one request complete.
        scheduler.queue().submit(RationalTime::new(10, 24), 0, None).wait();
        assert_eq!(cancel_count.load(Ordering::SeqCst), 0);

        scheduler.cancel_frames();

        let deadline = Instant::now() + Duration::from_secs(2);
        while cancel_count.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(cancel_count.load(Ordering::SeqCst), 1, "cancel_frames should reach the open reader's cancel_all()");
    }

    /// Scenario 3 (spec §8): three clips across one track; once the active
    /// range covers only the middle clip, the outer two readers are no
    /// longer open.
    #[test]
    fn readers_outside_the_active_range_are_evicted() {
        init_tracing();
        let items = vec![clip_item("A", 48, 24), clip_item("B", 48, 24), clip_item("C", 48, 24)];
        let timeline = timeline_with(items, 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));

        // Touch all three clips so the registry opens a reader for each.
        for t in [10_i64, 60, 110] {
            scheduler.queue().submit(RationalTime::new(t, 24), 0, None).wait();
        }
        assert_eq!(scheduler.open_reader_count(), 3);

        // Active range now covers only B's track-time span, [48, 96).
        scheduler.set_active_ranges(vec![TimeRange::new(RationalTime::new(48, 24), RationalTime::new(48, 24))]);

        // Eviction runs once per tick, after dispatch; a couple of idle
        // ticks are enough for the stopping list to drain (MockReader
        // reports `has_stopped()` immediately after `stop()`).
        let deadline = Instant::now() + Duration::from_secs(2);
        while scheduler.open_reader_count() != 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(scheduler.open_reader_count(), 1, "only B's reader should remain open");
    }

    /// Scenario 6 (spec §8): dropping the scheduler while requests are
    /// outstanding still resolves every one of their futures.
    #[test]
    fn dropping_the_scheduler_resolves_every_outstanding_promise() {
        init_tracing();
        let timeline = timeline_with(vec![clip_item("A", 48, 24)], 24);
        let scheduler = Scheduler::spawn_with_opener(timeline, Some(mock_opener()));

        let promises: Vec<_> =
            (0..10).map(|i| scheduler.queue().submit(RationalTime::new(i, 24), 0, None)).collect();

        drop(scheduler);

        for promise in promises {
            assert!(promise.is_resolved(), "drop() must join the worker only after every promise resolves");
        }
    }
}

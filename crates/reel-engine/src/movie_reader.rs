// crates/reel-engine/src/movie_reader.rs
//
// Reader backed by a movie container. Owns one dedicated decode thread per
// open clip (mirroring the teacher's per-clip `LiveDecoder` running on its
// own playback thread) so a slow seek on one clip never blocks reads on
// another. Requests arrive over a bounded channel; each reply travels back
// on its own one-shot channel so the scheduler can poll it independently.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input_with_dictionary, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use reel_core::{DecodedImage, PixelLayout, RationalTime, TimeRange};

use crate::options::IoOptions;
use crate::reader::{Info, PendingFrame, Poll, Reader, VideoKind, VideoStreamInfo};

/// Forward every I/O option verbatim as a demuxer option dictionary, per
/// spec.md §6 ("all other keys are forwarded verbatim to the I/O system").
/// ffmpeg ignores keys it doesn't recognize rather than failing the open.
fn options_to_dictionary(options: &IoOptions) -> ffmpeg::Dictionary {
    let mut dict = ffmpeg::Dictionary::new();
    for (key, value) in options {
        dict.set(key, value);
    }
    dict
}

struct DecodeRequest {
    media_time: RationalTime,
    reply:      Sender<DecodedImage>,
}

enum WorkerCmd {
    Decode(DecodeRequest),
    CancelAll,
    Stop,
}

pub struct MovieReader {
    path:        PathBuf,
    info:        Info,
    cmd_tx:      Sender<WorkerCmd>,
    pending:     Arc<AtomicUsize>,
    stopped:     Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl MovieReader {
    pub fn open(path: &Path, options: &IoOptions) -> anyhow::Result<Self> {
        let ictx = input_with_dictionary(path, options_to_dictionary(options))?;
        let stream = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream in {}", path.display()))?;
        let tb = stream.time_base();
        let rate = (tb.denominator() as f64 / tb.numerator() as f64).round().max(1.0) as u32;
        let duration_ticks = stream.duration().max(0);
        let (width, height) = unsafe {
            let p = stream.parameters().as_ptr();
            ((*p).width as u32, (*p).height as u32)
        };

        let info = Info {
            video_streams: vec![VideoStreamInfo { width, height, layout: PixelLayout::Rgba8 }],
            video_range: TimeRange::new(RationalTime::zero(rate), RationalTime::new(duration_ticks, rate)),
            video_kind: VideoKind::Container,
            tags: Default::default(),
        };

        let (cmd_tx, cmd_rx) = bounded::<WorkerCmd>(64);
        let pending = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(AtomicBool::new(false));

        let worker_path = path.to_path_buf();
        let worker_options = options.clone();
        let worker_pending = pending.clone();
        let worker_stopped = stopped.clone();
        let join_handle = thread::spawn(move || {
            decode_loop(worker_path, worker_options, cmd_rx, worker_pending, worker_stopped);
        });

        Ok(Self { path: path.to_path_buf(), info, cmd_tx, pending, stopped, join_handle: Some(join_handle) })
    }
}

impl Reader for MovieReader {
    fn info(&self) -> Info {
        self.info.clone()
    }

    fn read_video_frame(&self, media_time: RationalTime, _layer: u32, _reuse: Option<DecodedImage>) -> PendingFrame {
        let (reply_tx, reply_rx) = bounded(1);
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.cmd_tx.send(WorkerCmd::Decode(DecodeRequest { media_time, reply: reply_tx })).is_err() {
            // Worker thread already gone — resolve empty rather than hang.
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return PendingFrame::ready(DecodedImage::empty());
        }
        PendingFrame::new(reply_rx)
    }

    fn has_pending_frames(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    fn cancel_all(&self) {
        let _ = self.cmd_tx.send(WorkerCmd::CancelAll);
    }

    fn stop(&self) {
        let _ = self.cmd_tx.send(WorkerCmd::Stop);
    }

    fn has_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for MovieReader {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn decode_loop(
    path: PathBuf,
    options: IoOptions,
    cmd_rx: crossbeam_channel::Receiver<WorkerCmd>,
    pending: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
) {
    for cmd in cmd_rx.iter() {
        match cmd {
            WorkerCmd::Decode(req) => {
                let image = decode_one(&path, &options, req.media_time).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "movie decode failed");
                    DecodedImage::empty()
                });
                let _ = req.reply.send(image);
                pending.fetch_sub(1, Ordering::SeqCst);
            }
            WorkerCmd::CancelAll => {
                // In-flight decodes here are synchronous (one request at a
                // time on this thread) so there's nothing to discard beyond
                // what's already queued — draining happens naturally as
                // queued Decode commands are processed.
            }
            WorkerCmd::Stop => break,
        }
    }
    stopped.store(true, Ordering::SeqCst);
}

fn decode_one(path: &Path, options: &IoOptions, media_time: RationalTime) -> anyhow::Result<DecodedImage> {
    let mut ictx = input_with_dictionary(path, options_to_dictionary(options))?;
    let video_idx = ictx
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow::anyhow!("no video stream"))?
        .index();

    let seek_ts = {
        let stream = ictx.stream(video_idx).ok_or_else(|| anyhow::anyhow!("stream gone"))?;
        let tb = stream.time_base();
        (media_time.to_seconds() * tb.denominator() as f64 / tb.numerator() as f64) as i64
    };
    let _ = ictx.seek(seek_ts, ..=seek_ts);

    let ictx2 = input_with_dictionary(path, options_to_dictionary(options))?;
    let stream2 = ictx2.stream(video_idx).ok_or_else(|| anyhow::anyhow!("stream gone"))?;
    let decoder_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
    let mut decoder = decoder_ctx.decoder().video()?;

    let (out_w, out_h) = (decoder.width(), decoder.height());
    let mut scaler = SwsContext::get(decoder.format(), decoder.width(), decoder.height(), Pixel::RGBA, out_w, out_h, Flags::BILINEAR)?;

    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != video_idx {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let pts = decoded.pts().unwrap_or(0);
            if pts < seek_ts {
                continue;
            }
            let mut out = ffmpeg::util::frame::video::Video::empty();
            scaler.run(&decoded, &mut out)?;
            let stride = out.stride(0);
            let raw = out.data(0);
            let row_bytes = out_w as usize * 4;
            let data: Vec<u8> = (0..out_h as usize).flat_map(|row| &raw[row * stride..row * stride + row_bytes]).copied().collect();
            return Ok(DecodedImage { width: out_w, height: out_h, layout: PixelLayout::Rgba8, data });
        }
    }
    Ok(DecodedImage::empty())
}

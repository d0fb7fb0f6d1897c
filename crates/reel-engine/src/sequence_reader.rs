// crates/reel-engine/src/sequence_reader.rs
//
// Reader backed by a numbered sequence of still images. No persistent decode
// thread is needed — each frame is an independent file, so reads are
// stateless and can be served directly off the request. Still returns a
// channel-backed `PendingFrame` for uniformity with `MovieReader`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use reel_core::{DecodedImage, PixelLayout, RationalTime, TimeRange};

use crate::options::IoOptions;
use crate::reader::{Info, PendingFrame, Reader, VideoKind, VideoStreamInfo};

pub struct SequenceSpec {
    pub target_dir:   PathBuf,
    pub name_prefix:  String,
    pub name_suffix:  String,
    pub start_frame:  i64,
    pub frame_step:   i64,
    pub rate:         u32,
    pub zero_padding: usize,
}

pub struct ImageSequenceReader {
    spec:    SequenceSpec,
    info:    Info,
    stopped: AtomicBool,
}

impl ImageSequenceReader {
    pub fn open(spec: SequenceSpec, frame_count: i64, _options: &IoOptions) -> anyhow::Result<Self> {
        let rate = spec.rate.max(1);
        let (width, height) = probe_first_frame_size(&spec)?;
        let info = Info {
            video_streams: vec![VideoStreamInfo { width, height, layout: PixelLayout::Rgba8 }],
            video_range: TimeRange::new(RationalTime::zero(rate), RationalTime::new(frame_count, rate)),
            video_kind: VideoKind::Sequence,
            tags: Default::default(),
        };
        Ok(Self { spec, info, stopped: AtomicBool::new(false) })
    }

    fn frame_path(&self, media_time: RationalTime) -> PathBuf {
        let frame_index = self.spec.start_frame + media_time.value * self.spec.frame_step;
        let name = format!(
            "{}{:0width$}{}",
            self.spec.name_prefix,
            frame_index,
            self.spec.name_suffix,
            width = self.spec.zero_padding
        );
        self.spec.target_dir.join(name)
    }
}

impl Reader for ImageSequenceReader {
    fn info(&self) -> Info {
        self.info.clone()
    }

    fn read_video_frame(&self, media_time: RationalTime, _layer: u32, _reuse: Option<DecodedImage>) -> PendingFrame {
        let path = self.frame_path(media_time);
        let image = load_image(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "sequence frame decode failed");
            DecodedImage::empty()
        });
        PendingFrame::ready(image)
    }

    fn has_pending_frames(&self) -> bool {
        // Every read above resolves synchronously before returning.
        false
    }

    fn cancel_all(&self) {}

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn has_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

fn probe_first_frame_size(spec: &SequenceSpec) -> anyhow::Result<(u32, u32)> {
    let name = format!(
        "{}{:0width$}{}",
        spec.name_prefix,
        spec.start_frame,
        spec.name_suffix,
        width = spec.zero_padding
    );
    let path = spec.target_dir.join(name);
    let img = image::open(&path)?;
    Ok((img.width(), img.height()))
}

fn load_image(path: &PathBuf) -> anyhow::Result<DecodedImage> {
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(DecodedImage { width, height, layout: PixelLayout::Rgba8, data: img.into_raw() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_frame(dir: &std::path::Path, name: &str, color: [u8; 4]) {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(color));
        img.save(dir.join(name)).expect("write test frame");
    }

    fn spec(dir: &std::path::Path) -> SequenceSpec {
        SequenceSpec {
            target_dir:   dir.to_path_buf(),
            name_prefix:  "shot_".into(),
            name_suffix:  ".png".into(),
            start_frame:  1,
            frame_step:   1,
            rate:         24,
            zero_padding: 4,
        }
    }

    #[test]
    fn frame_path_applies_prefix_padding_and_step() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "shot_0001.png", [10, 0, 0, 255]);
        let reader = ImageSequenceReader::open(spec(dir.path()), 48, &IoOptions::default()).unwrap();
        assert_eq!(reader.frame_path(RationalTime::zero(24)), dir.path().join("shot_0001.png"));
        assert_eq!(reader.frame_path(RationalTime::new(5, 24)), dir.path().join("shot_0006.png"));
    }

    #[test]
    fn open_probes_first_frame_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "shot_0001.png", [0, 0, 0, 255]);
        let reader = ImageSequenceReader::open(spec(dir.path()), 48, &IoOptions::default()).unwrap();
        let info = reader.info();
        assert_eq!(info.video_streams[0].width, 2);
        assert_eq!(info.video_streams[0].height, 2);
        assert_eq!(info.video_range.duration, RationalTime::new(48, 24));
    }

    #[test]
    fn read_video_frame_decodes_the_numbered_file() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "shot_0001.png", [1, 2, 3, 255]);
        write_frame(dir.path(), "shot_0002.png", [9, 9, 9, 255]);
        let reader = ImageSequenceReader::open(spec(dir.path()), 48, &IoOptions::default()).unwrap();

        let frame0 = match reader.read_video_frame(RationalTime::zero(24), 0, None).poll() {
            crate::reader::Poll::Ready(image) => image,
            crate::reader::Poll::Pending => panic!("sequence reads resolve synchronously"),
        };
        assert_eq!(&frame0.data[0..4], &[1, 2, 3, 255]);

        let frame1 = match reader.read_video_frame(RationalTime::new(1, 24), 0, None).poll() {
            crate::reader::Poll::Ready(image) => image,
            crate::reader::Poll::Pending => panic!("sequence reads resolve synchronously"),
        };
        assert_eq!(&frame1.data[0..4], &[9, 9, 9, 255]);
    }

    #[test]
    fn read_video_frame_out_of_range_resolves_empty_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "shot_0001.png", [0, 0, 0, 255]);
        let reader = ImageSequenceReader::open(spec(dir.path()), 48, &IoOptions::default()).unwrap();

        let frame = match reader.read_video_frame(RationalTime::new(999, 24), 0, None).poll() {
            crate::reader::Poll::Ready(image) => image,
            crate::reader::Poll::Pending => panic!("sequence reads resolve synchronously"),
        };
        assert!(frame.is_empty());
    }
}

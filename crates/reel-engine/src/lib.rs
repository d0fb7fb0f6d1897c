// crates/reel-engine/src/lib.rs
//
// Reader abstraction, reader registry, request queue, scheduler loop,
// active-range tracker, and the public facade. Built on threads and
// channels, not an async runtime — readers are touched only by the
// scheduler thread.

pub mod active_ranges;
pub mod error;
pub mod facade;
pub mod movie_reader;
pub mod options;
pub mod queue;
pub mod reader;
pub mod registry;
pub mod scheduler;
pub mod sequence_reader;

pub use active_ranges::ActiveRangeTracker;
pub use error::EngineError;
pub use facade::Player;
pub use movie_reader::MovieReader;
pub use options::{IoOptions, SEQUENCE_IO_DEFAULT_SPEED};
pub use queue::{FramePromise, FrameRequest, RequestQueue};
pub use reader::{Info, PendingFrame, Poll, Reader, VideoKind, VideoStreamInfo};
pub use registry::ReaderRegistry;
pub use scheduler::Scheduler;
pub use sequence_reader::{ImageSequenceReader, SequenceSpec};

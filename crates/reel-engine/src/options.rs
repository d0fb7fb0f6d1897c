// crates/reel-engine/src/options.rs
//
// Options are plain string -> string data, forwarded to readers verbatim
// except for the one key the core itself sets. No config file, no env vars
// — the only surface is this in-process map, following the teacher's
// `ProjectState`-as-plain-data convention (serde-able, no hidden globals).

use std::collections::HashMap;

/// Key the core sets itself when opening a clip: the timeline's rate, so an
/// image-sequence reader with no rate of its own falls back to something
/// sensible.
pub const SEQUENCE_IO_DEFAULT_SPEED: &str = "SequenceIO/DefaultSpeed";

pub type IoOptions = HashMap<String, String>;

pub fn with_default_speed(base: &IoOptions, rate: u32) -> IoOptions {
    let mut opts = base.clone();
    opts.insert(SEQUENCE_IO_DEFAULT_SPEED.to_string(), rate.to_string());
    opts
}

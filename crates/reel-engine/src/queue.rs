// crates/reel-engine/src/queue.rs
//
// FIFO of caller requests guarded by a mutex, with a condition variable the
// scheduler waits on. Each request carries its own one-shot `FramePromise`
// rather than routing all replies through one shared channel — that keeps a
// slow request from blocking a fast one's caller.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use reel_core::{DecodedImage, Frame, RationalTime};

#[derive(Clone)]
pub struct FramePromise {
    inner: Arc<(Mutex<Option<Frame>>, Condvar)>,
}

impl FramePromise {
    fn new() -> Self {
        Self { inner: Arc::new((Mutex::new(None), Condvar::new())) }
    }

    /// Resolve once. A second call (e.g. cancellation racing completion) is
    /// a no-op — the first resolution wins.
    pub fn resolve(&self, frame: Frame) {
        let (lock, cvar) = &*self.inner;
        let mut slot = lock.lock().unwrap();
        if slot.is_none() {
            *slot = Some(frame);
            cvar.notify_all();
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.0.lock().unwrap().is_some()
    }

    /// Block the calling thread until the Frame is available.
    pub fn wait(&self) -> Frame {
        let (lock, cvar) = &*self.inner;
        let mut slot = lock.lock().unwrap();
        while slot.is_none() {
            slot = cvar.wait(slot).unwrap();
        }
        slot.clone().unwrap()
    }
}

pub struct FrameRequest {
    pub time:    RationalTime,
    pub layer:   u32,
    pub reuse:   Option<DecodedImage>,
    pub promise: FramePromise,
}

pub struct RequestQueue {
    pending: Mutex<VecDeque<FrameRequest>>,
    cvar:    Condvar,
    stopped: std::sync::atomic::AtomicBool,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self { pending: Mutex::new(VecDeque::new()), cvar: Condvar::new(), stopped: std::sync::atomic::AtomicBool::new(false) }
    }

    /// Push a request and return its Frame promise. If the facade has
    /// already stopped, resolve immediately with an empty Frame instead of
    /// enqueuing.
    pub fn submit(&self, time: RationalTime, layer: u32, reuse: Option<DecodedImage>) -> FramePromise {
        let promise = FramePromise::new();
        if self.stopped.load(std::sync::atomic::Ordering::SeqCst) {
            promise.resolve(Frame::empty(time));
            return promise;
        }
        let request = FrameRequest { time, layer, reuse, promise: promise.clone() };
        {
            let mut pending = self.pending.lock().unwrap();
            pending.push_back(request);
        }
        self.cvar.notify_all();
        promise
    }

    /// Wait (bounded by `timeout`) for at least one pending request if the
    /// queue is currently empty, then move up to `n` of them out.
    pub fn drain_up_to(&self, n: usize, timeout: Duration) -> Vec<FrameRequest> {
        if n == 0 {
            return Vec::new();
        }
        let mut pending = self.pending.lock().unwrap();
        if pending.is_empty() {
            let (guard, _timeout_result) = self.cvar.wait_timeout(pending, timeout).unwrap();
            pending = guard;
        }
        let take = n.min(pending.len());
        pending.drain(..take).collect()
    }

    /// Clear the pending list, returning every request so the caller can
    /// resolve each with an empty Frame.
    pub fn cancel_all(&self) -> Vec<FrameRequest> {
        let mut pending = self.pending.lock().unwrap();
        pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn stop(&self) {
        self.stopped.store(true, std::sync::atomic::Ordering::SeqCst);
        self.cvar.notify_all();
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

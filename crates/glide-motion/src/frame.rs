//! Frame scheduling.
//!
//! A [`FrameScheduler`] runs callbacks once before the next repaint, passing
//! the frame timestamp in milliseconds. Two implementations are provided:
//!
//! - [`ManualFrameScheduler`]: frames run only when the owner calls
//!   [`ManualFrameScheduler::run_frame`]; deterministic, used by tests and
//!   by hosts that already own a render loop.
//! - [`IntervalFrameScheduler`]: a Tokio task that flushes queued callbacks
//!   at a fixed interval.
//!
//! [`FrameSlot`] coalesces bursts of requests into one callback per frame.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glide_config::FrameConfig;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::sync::lock;

/// Callback invoked with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64) + Send>;

/// Facility that runs callbacks before the next visual update.
pub trait FrameScheduler: Send + Sync {
    /// Current time on the scheduler's clock, in milliseconds.
    fn now(&self) -> f64;

    /// Run `callback` once on the next frame.
    fn request_frame(&self, callback: FrameCallback);
}

/// At most one pending frame request at a time.
///
/// [`FrameSlot::schedule`] claims the slot and requests a frame; further
/// calls are dropped until that frame has run.
#[derive(Debug, Default)]
pub struct FrameSlot {
    pending: AtomicBool,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Schedule `work` for the next frame unless a request is already pending.
    ///
    /// Returns `true` if a frame was requested, `false` if the call was
    /// coalesced into the outstanding request.
    pub fn schedule<F>(self: &Arc<Self>, scheduler: &dyn FrameScheduler, work: F) -> bool
    where
        F: FnOnce(f64) + Send + 'static,
    {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let slot = Arc::clone(self);
        scheduler.request_frame(Box::new(move |timestamp| {
            work(timestamp);
            slot.pending.store(false, Ordering::Release);
        }));
        true
    }
}

/// Frame scheduler driven explicitly by its owner.
#[derive(Default)]
pub struct ManualFrameScheduler {
    now: Mutex<f64>,
    queue: Mutex<Vec<FrameCallback>>,
    frames: AtomicU64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock without running a frame.
    pub fn set_now(&self, now: f64) {
        *lock(&self.now) = now;
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Number of frames run so far.
    pub fn frames_run(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Run one frame at `timestamp`.
    ///
    /// Only callbacks queued before this call run; callbacks they request
    /// are deferred to the following frame. Returns the number run.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        self.set_now(timestamp);
        let batch = std::mem::take(&mut *lock(&self.queue));
        let count = batch.len();
        for callback in batch {
            callback(timestamp);
        }
        self.frames.fetch_add(1, Ordering::Relaxed);
        count
    }

    /// Advance the clock by `delta_ms` and run a frame.
    pub fn advance(&self, delta_ms: f64) -> usize {
        let timestamp = self.now() + delta_ms;
        self.run_frame(timestamp)
    }

    /// Run frames `step_ms` apart until nothing is queued or `max_frames`
    /// have run. Returns the number of frames run.
    pub fn run_until_idle(&self, step_ms: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.advance(step_ms);
            frames += 1;
        }
        frames
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn now(&self) -> f64 {
        *lock(&self.now)
    }

    fn request_frame(&self, callback: FrameCallback) {
        lock(&self.queue).push(callback);
    }
}

/// Frame scheduler backed by a Tokio interval task.
///
/// Timestamps are milliseconds since the scheduler was spawned. The task is
/// aborted when the scheduler is dropped.
pub struct IntervalFrameScheduler {
    queue: Arc<Mutex<Vec<FrameCallback>>>,
    origin: Instant,
    interval: Duration,
    task: JoinHandle<()>,
}

impl IntervalFrameScheduler {
    /// Spawn the frame loop on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let queue: Arc<Mutex<Vec<FrameCallback>>> = Arc::default();
        let origin = Instant::now();

        let task_queue = Arc::clone(&queue);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let batch = std::mem::take(&mut *lock(&task_queue));
                if batch.is_empty() {
                    continue;
                }
                let timestamp = origin.elapsed().as_secs_f64() * 1000.0;
                tracing::trace!(callbacks = batch.len(), timestamp, "frame");
                for callback in batch {
                    callback(timestamp);
                }
            }
        });

        Self {
            queue,
            origin,
            interval,
            task,
        }
    }

    /// Spawn with the interval from configuration.
    ///
    /// An interval that is not a representable duration falls back to the
    /// default frame interval.
    pub fn from_config(config: &FrameConfig) -> Self {
        let interval = Duration::try_from_secs_f64(config.interval_ms.max(1.0) / 1000.0)
            .unwrap_or_else(|_| {
                Duration::from_secs_f64(FrameConfig::default().interval_ms / 1000.0)
            });
        Self::spawn(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for IntervalFrameScheduler {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&self, callback: FrameCallback) {
        lock(&self.queue).push(callback);
    }
}

impl Drop for IntervalFrameScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! Frame-driven scroll position animation.
//!
//! A [`ScrollAnimator`] moves one [`ScrollSurface`] from its current position
//! to a target over a duration, writing an eased position on every frame.
//! One animation runs at a time per animator; requests that arrive while it
//! runs are handled by the configured [`BusyPolicy`].
//!
//! # Usage
//!
//! ```ignore
//! let animator = ScrollAnimator::new(viewport, scheduler);
//! let done = animator.scroll_to(
//!     1200.0,
//!     ScrollOptions::new().with_duration(400.0).with_easing(Easing::EaseInOut),
//! )?;
//! done.await;
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use glide_config::{BusyPolicy, ScrollConfig};
use tracing::{debug, trace};

use crate::completion::{Completion, Resolver};
use crate::easing::Easing;
use crate::error::{MotionError, Result};
use crate::frame::FrameScheduler;
use crate::surface::{LayoutBox, ScrollSurface};
use crate::sync::lock;

/// Called once when a scroll animation reaches its target.
pub type ScrollCallback = Box<dyn FnOnce() + Send>;

/// Per-call options; unset fields fall back to the animator's defaults.
#[derive(Default)]
pub struct ScrollOptions {
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
    pub offset: Option<f64>,
    pub callback: Option<ScrollCallback>,
}

impl ScrollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ScrollOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollOptions")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("offset", &self.offset)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Animator-wide defaults.
#[derive(Debug, Clone, Copy)]
pub struct ScrollDefaults {
    pub duration_ms: f64,
    pub easing: Easing,
    pub offset: f64,
    pub busy_policy: BusyPolicy,
}

impl Default for ScrollDefaults {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            easing: Easing::EaseOutQuart,
            offset: 0.0,
            busy_policy: BusyPolicy::Drop,
        }
    }
}

impl ScrollDefaults {
    pub fn from_config(config: &ScrollConfig) -> Result<Self> {
        Ok(Self {
            duration_ms: config.duration_ms,
            easing: config.easing.parse()?,
            offset: config.offset,
            busy_policy: config.busy_policy,
        })
    }

    pub fn with_busy_policy(mut self, policy: BusyPolicy) -> Self {
        self.busy_policy = policy;
        self
    }
}

/// A fully resolved scroll request.
pub struct AnimationRequest {
    pub target: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    pub offset: f64,
    pub callback: Option<ScrollCallback>,
}

impl AnimationRequest {
    pub fn new(target: f64, options: ScrollOptions, defaults: &ScrollDefaults) -> Self {
        Self {
            target,
            duration_ms: options.duration.unwrap_or(defaults.duration_ms),
            easing: options.easing.unwrap_or(defaults.easing),
            offset: options.offset.unwrap_or(defaults.offset),
            callback: options.callback,
        }
    }

    /// Position the animation ends at.
    pub fn destination(&self) -> f64 {
        self.target + self.offset
    }
}

impl fmt::Debug for AnimationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRequest")
            .field("target", &self.target)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("offset", &self.offset)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Animator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Running,
}

struct Machine {
    state: AnimatorState,
    queue: VecDeque<(AnimationRequest, Resolver)>,
}

/// One animation in flight, carried from frame to frame.
struct Run {
    start: f64,
    distance: f64,
    start_time: f64,
    duration_ms: f64,
    easing: Easing,
    callback: Option<ScrollCallback>,
    resolver: Resolver,
}

impl Run {
    fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration_ms).clamp(0.0, 1.0)
    }
}

struct AnimatorInner {
    surface: Arc<dyn ScrollSurface>,
    scheduler: Arc<dyn FrameScheduler>,
    defaults: ScrollDefaults,
    machine: Mutex<Machine>,
}

/// Smoothly scrolls one surface. Clones share the same state machine.
#[derive(Clone)]
pub struct ScrollAnimator {
    inner: Arc<AnimatorInner>,
}

impl ScrollAnimator {
    pub fn new(surface: Arc<dyn ScrollSurface>, scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self::with_defaults(surface, scheduler, ScrollDefaults::default())
    }

    pub fn with_defaults(
        surface: Arc<dyn ScrollSurface>,
        scheduler: Arc<dyn FrameScheduler>,
        defaults: ScrollDefaults,
    ) -> Self {
        Self {
            inner: Arc::new(AnimatorInner {
                surface,
                scheduler,
                defaults,
                machine: Mutex::new(Machine {
                    state: AnimatorState::Idle,
                    queue: VecDeque::new(),
                }),
            }),
        }
    }

    /// Animate to `target` (plus the offset).
    ///
    /// While another animation runs, the busy policy decides: `Drop` returns
    /// an already-settled completion and leaves the running animation alone,
    /// `Queue` defers the request, `Reject` returns [`MotionError::ScrollBusy`].
    pub fn scroll_to(&self, target: f64, options: ScrollOptions) -> Result<Completion> {
        let request = AnimationRequest::new(target, options, &self.inner.defaults);

        {
            let mut machine = lock(&self.inner.machine);
            if machine.state == AnimatorState::Running {
                return match self.inner.defaults.busy_policy {
                    BusyPolicy::Drop => {
                        debug!(to = target, "scroll already running, request dropped");
                        Ok(Completion::resolved())
                    }
                    BusyPolicy::Reject => Err(MotionError::ScrollBusy),
                    BusyPolicy::Queue => {
                        let (resolver, completion) = Completion::channel();
                        machine.queue.push_back((request, resolver));
                        debug!(to = target, queued = machine.queue.len(), "scroll request queued");
                        Ok(completion)
                    }
                };
            }
            machine.state = AnimatorState::Running;
        }

        let (resolver, completion) = Completion::channel();
        self.inner.begin(request, resolver);
        Ok(completion)
    }

    /// Animate so that `element`'s top edge reaches the top of the surface.
    pub fn scroll_to_element(&self, element: &dyn LayoutBox, options: ScrollOptions) -> Result<Completion> {
        let target = self.inner.surface.position_of(element);
        self.scroll_to(target, options)
    }

    pub fn scroll_to_top(&self, options: ScrollOptions) -> Result<Completion> {
        self.scroll_to(0.0, options)
    }

    pub fn scroll_to_bottom(&self, options: ScrollOptions) -> Result<Completion> {
        let target = self.inner.surface.max_scroll_position();
        self.scroll_to(target, options)
    }

    /// Whether an animation is running.
    pub fn is_active(&self) -> bool {
        self.state() == AnimatorState::Running
    }

    pub fn state(&self) -> AnimatorState {
        lock(&self.inner.machine).state
    }

    /// Number of requests waiting behind the running animation.
    pub fn queued(&self) -> usize {
        lock(&self.inner.machine).queue.len()
    }

    pub fn defaults(&self) -> &ScrollDefaults {
        &self.inner.defaults
    }
}

impl AnimatorInner {
    fn begin(self: &Arc<Self>, request: AnimationRequest, resolver: Resolver) {
        let start = self.surface.scroll_position();
        let destination = request.destination();
        let run = Run {
            start,
            distance: destination - start,
            start_time: self.scheduler.now(),
            duration_ms: request.duration_ms,
            easing: request.easing,
            callback: request.callback,
            resolver,
        };
        debug!(
            from = start,
            to = destination,
            duration_ms = request.duration_ms,
            "scroll started"
        );
        self.schedule(run);
    }

    fn schedule(self: &Arc<Self>, run: Run) {
        let inner = Arc::clone(self);
        self.scheduler
            .request_frame(Box::new(move |timestamp| inner.tick(run, timestamp)));
    }

    fn tick(self: Arc<Self>, run: Run, timestamp: f64) {
        let progress = run.progress(timestamp);
        let position = run.start + run.distance * run.easing.evaluate(progress);
        trace!(progress, position, "scroll frame");
        self.surface.set_scroll_position(position);

        if progress < 1.0 {
            self.schedule(run);
            return;
        }

        let next = {
            let mut machine = lock(&self.machine);
            let next = machine.queue.pop_front();
            if next.is_none() {
                machine.state = AnimatorState::Idle;
            }
            next
        };

        debug!(position, "scroll finished");
        if let Some(callback) = run.callback {
            callback();
        }
        run.resolver.resolve();

        if let Some((request, resolver)) = next {
            self.begin(request, resolver);
        }
    }
}

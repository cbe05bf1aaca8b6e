//! Scroll-linked parallax translation.
//!
//! A [`ParallaxScroller`] listens to a scroll surface and, at most once per
//! frame, writes `translateY(<pos * speed>px)` (or `translateX`) to one
//! element's `transform`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use glide_config::Axis;
use tracing::{debug, trace};

use crate::frame::{FrameScheduler, FrameSlot};
use crate::surface::{ListenerId, ScrollSurface, StyleSink};
use crate::sync::lock;

/// Translation factor and axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxConfig {
    pub speed: f64,
    pub direction: Axis,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            direction: Axis::Vertical,
        }
    }
}

impl From<&glide_config::ParallaxConfig> for ParallaxConfig {
    fn from(config: &glide_config::ParallaxConfig) -> Self {
        Self {
            speed: config.speed,
            direction: config.direction,
        }
    }
}

impl ParallaxConfig {
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_direction(mut self, direction: Axis) -> Self {
        self.direction = direction;
        self
    }

    /// Transform value for a scroll position.
    pub fn transform(&self, scroll_position: f64) -> String {
        let movement = scroll_position * self.speed;
        match self.direction {
            Axis::Vertical => format!("translateY({}px)", movement),
            Axis::Horizontal => format!("translateX({}px)", movement),
        }
    }
}

struct ParallaxInner {
    element: Arc<dyn StyleSink>,
    surface: Arc<dyn ScrollSurface>,
    scheduler: Arc<dyn FrameScheduler>,
    config: Mutex<ParallaxConfig>,
    slot: Arc<FrameSlot>,
    listener: Mutex<Option<ListenerId>>,
    destroyed: AtomicBool,
    recomputations: AtomicU64,
}

/// Translates one element in proportion to the scroll position.
///
/// The initial transform is written on construction. Dropping the scroller
/// destroys it.
pub struct ParallaxScroller {
    inner: Arc<ParallaxInner>,
}

impl ParallaxScroller {
    pub fn new(
        element: Arc<dyn StyleSink>,
        surface: Arc<dyn ScrollSurface>,
        scheduler: Arc<dyn FrameScheduler>,
        config: ParallaxConfig,
    ) -> Self {
        let inner = Arc::new(ParallaxInner {
            element,
            surface,
            scheduler,
            config: Mutex::new(config),
            slot: Arc::new(FrameSlot::new()),
            listener: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            recomputations: AtomicU64::new(0),
        });

        let weak: Weak<ParallaxInner> = Arc::downgrade(&inner);
        let id = inner.surface.add_scroll_listener(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.request_update();
            }
        }));
        *lock(&inner.listener) = Some(id);

        inner.update_position();
        debug!(element = ?inner.element.id(), speed = config.speed, "parallax attached");
        Self { inner }
    }

    pub fn config(&self) -> ParallaxConfig {
        *lock(&self.inner.config)
    }

    /// Change the speed and recompute.
    pub fn set_speed(&self, speed: f64) {
        lock(&self.inner.config).speed = speed;
        self.inner.update_position();
    }

    pub fn set_direction(&self, direction: Axis) {
        lock(&self.inner.config).direction = direction;
        self.inner.update_position();
    }

    /// Number of transform writes caused by scroll notifications.
    pub fn recomputations(&self) -> u64 {
        self.inner.recomputations.load(Ordering::Relaxed)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    /// Stop listening and clear the element's transform. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(id) = lock(&self.inner.listener).take() {
            self.inner.surface.remove_scroll_listener(id);
        }
        self.inner.element.set_style("transform", "");
        debug!(element = ?self.inner.element.id(), "parallax destroyed");
    }
}

impl ParallaxInner {
    fn request_update(self: &Arc<Self>) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }
        let weak = Arc::downgrade(self);
        self.slot.schedule(self.scheduler.as_ref(), move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.recomputations.fetch_add(1, Ordering::Relaxed);
                inner.update_position();
            }
        });
    }

    fn update_position(&self) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }
        let position = self.surface.scroll_position();
        let transform = lock(&self.config).transform(position);
        trace!(position, %transform, "parallax update");
        self.element.set_style("transform", &transform);
    }
}

impl Drop for ParallaxScroller {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ManualFrameScheduler;
    use crate::memory::{MemoryElement, MemoryViewport};

    struct Fixture {
        element: Arc<MemoryElement>,
        viewport: Arc<MemoryViewport>,
        scheduler: Arc<ManualFrameScheduler>,
    }

    fn fixture() -> Fixture {
        Fixture {
            element: Arc::new(MemoryElement::new()),
            viewport: Arc::new(MemoryViewport::new(5000.0)),
            scheduler: Arc::new(ManualFrameScheduler::new()),
        }
    }

    fn attach(f: &Fixture, config: ParallaxConfig) -> ParallaxScroller {
        ParallaxScroller::new(f.element.clone(), f.viewport.clone(), f.scheduler.clone(), config)
    }

    #[test]
    fn test_initial_transform() {
        let f = fixture();
        f.viewport.set_scroll_position(100.0);
        let _parallax = attach(&f, ParallaxConfig::default());
        assert_eq!(f.element.style("transform").as_deref(), Some("translateY(50px)"));
    }

    #[test]
    fn test_burst_coalesces_to_one_write() {
        let f = fixture();
        let parallax = attach(&f, ParallaxConfig::default());
        let initial_writes = f.element.write_count("transform");

        f.viewport.set_scroll_position(50.0);
        f.viewport.set_scroll_position(150.0);
        f.viewport.set_scroll_position(200.0);
        assert_eq!(f.scheduler.pending(), 1);

        f.scheduler.advance(16.0);
        assert_eq!(f.element.write_count("transform"), initial_writes + 1);
        assert_eq!(parallax.recomputations(), 1);
        assert_eq!(f.element.style("transform").as_deref(), Some("translateY(100px)"));
    }

    #[test]
    fn test_horizontal_and_speed_change() {
        let f = fixture();
        let parallax = attach(
            &f,
            ParallaxConfig::default()
                .with_speed(0.25)
                .with_direction(Axis::Horizontal),
        );

        f.viewport.set_scroll_position(400.0);
        f.scheduler.advance(16.0);
        assert_eq!(f.element.style("transform").as_deref(), Some("translateX(100px)"));

        parallax.set_speed(-1.0);
        assert_eq!(f.element.style("transform").as_deref(), Some("translateX(-400px)"));

        parallax.set_direction(Axis::Vertical);
        assert_eq!(f.element.style("transform").as_deref(), Some("translateY(-400px)"));
        assert_eq!(f.scheduler.pending(), 0);
    }

    #[test]
    fn test_destroy_clears_and_detaches() {
        let f = fixture();
        let parallax = attach(&f, ParallaxConfig::default());
        assert_eq!(f.viewport.listener_count(), 1);

        parallax.destroy();
        parallax.destroy();
        assert!(parallax.is_destroyed());
        assert_eq!(f.viewport.listener_count(), 0);
        assert_eq!(f.element.style("transform"), None);

        f.viewport.set_scroll_position(300.0);
        f.scheduler.advance(16.0);
        assert_eq!(f.element.style("transform"), None);
    }

    #[test]
    fn test_frame_scheduled_before_destroy_is_suppressed() {
        let f = fixture();
        let parallax = attach(&f, ParallaxConfig::default());
        f.viewport.set_scroll_position(300.0);
        assert_eq!(f.scheduler.pending(), 1);

        parallax.destroy();
        f.scheduler.advance(16.0);
        assert_eq!(f.element.style("transform"), None);
    }

    #[test]
    fn test_drop_destroys() {
        let f = fixture();
        {
            let _parallax = attach(&f, ParallaxConfig::default());
            assert_eq!(f.viewport.listener_count(), 1);
        }
        assert_eq!(f.viewport.listener_count(), 0);
        assert_eq!(f.element.style("transform"), None);
    }
}

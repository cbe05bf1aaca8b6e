//! Shortcut façade over one environment.
//!
//! [`MotionEnv`] bundles the environment facilities (frame scheduler,
//! viewport, visibility) with the configured defaults, and offers one-call
//! shortcuts for the common effects. Every transition shortcut uses a fresh
//! [`TransitionManager`] and every scroll shortcut a fresh [`ScrollAnimator`],
//! so shortcuts never wait on or drop each other.

use std::sync::Arc;

use glide_config::{Axis, GlideConfig};

use crate::completion::Completion;
use crate::error::Result;
use crate::frame::FrameScheduler;
use crate::parallax::{ParallaxConfig, ParallaxScroller};
use crate::scroll::{ScrollAnimator, ScrollDefaults, ScrollOptions};
use crate::spy::{ScrollSpy, SpyOptions};
use crate::surface::{Element, LayoutBox, ScrollSurface, StyleSink};
use crate::transition::{TransitionDefaults, TransitionManager, TransitionOptions};
use crate::trigger::{ObserverConfig, ObserverOptions, ScrollTrigger, VisibilityEntry, VisibilityFacility};

#[derive(Clone)]
pub struct MotionEnv {
    scheduler: Arc<dyn FrameScheduler>,
    viewport: Arc<dyn ScrollSurface>,
    visibility: Arc<dyn VisibilityFacility>,
    scroll: ScrollDefaults,
    transition: TransitionDefaults,
    parallax: ParallaxConfig,
    spy: SpyOptions,
    observer: ObserverConfig,
}

impl MotionEnv {
    /// Environment with built-in defaults.
    pub fn new(
        scheduler: Arc<dyn FrameScheduler>,
        viewport: Arc<dyn ScrollSurface>,
        visibility: Arc<dyn VisibilityFacility>,
    ) -> Self {
        Self {
            scheduler,
            viewport,
            visibility,
            scroll: ScrollDefaults::default(),
            transition: TransitionDefaults::default(),
            parallax: ParallaxConfig::default(),
            spy: SpyOptions::default(),
            observer: ObserverConfig::default(),
        }
    }

    /// Environment with defaults taken from `config`.
    ///
    /// Fails if the configured easing names do not parse.
    pub fn from_config(
        scheduler: Arc<dyn FrameScheduler>,
        viewport: Arc<dyn ScrollSurface>,
        visibility: Arc<dyn VisibilityFacility>,
        config: &GlideConfig,
    ) -> Result<Self> {
        Ok(Self {
            scheduler,
            viewport,
            visibility,
            scroll: ScrollDefaults::from_config(&config.scroll)?,
            transition: TransitionDefaults::from_config(&config.transition)?,
            parallax: ParallaxConfig::from(&config.parallax),
            spy: SpyOptions::from_config(&config.spy),
            observer: ObserverConfig::from_config(&config.trigger),
        })
    }

    /// The same environment, scrolling `surface` instead of the viewport.
    pub fn within(&self, surface: Arc<dyn ScrollSurface>) -> Self {
        Self {
            viewport: surface,
            ..self.clone()
        }
    }

    pub fn viewport(&self) -> &Arc<dyn ScrollSurface> {
        &self.viewport
    }

    pub fn scheduler(&self) -> &Arc<dyn FrameScheduler> {
        &self.scheduler
    }

    /// A scroll animator for this environment's surface.
    pub fn scroll_animator(&self) -> ScrollAnimator {
        ScrollAnimator::with_defaults(
            Arc::clone(&self.viewport),
            Arc::clone(&self.scheduler),
            self.scroll,
        )
    }

    /// A transition manager for `element` with this environment's defaults.
    pub fn transitions(&self, element: Arc<dyn StyleSink>) -> TransitionManager {
        TransitionManager::with_defaults(element, self.transition)
    }

    fn run_transition(
        &self,
        element: Arc<dyn StyleSink>,
        property: &str,
        value: &str,
        duration: Option<f64>,
    ) -> Completion {
        let options = TransitionOptions {
            duration,
            ..TransitionOptions::default()
        };
        self.transitions(element).animate(property, value, options)
    }

    /// Transition `opacity` to 1.
    pub fn fade_in(&self, element: Arc<dyn StyleSink>, duration: Option<f64>) -> Completion {
        self.run_transition(element, "opacity", "1", duration)
    }

    /// Transition `opacity` to 0.
    pub fn fade_out(&self, element: Arc<dyn StyleSink>, duration: Option<f64>) -> Completion {
        self.run_transition(element, "opacity", "0", duration)
    }

    /// Translate vertically by `distance` (default `-100%`).
    pub fn slide_up(
        &self,
        element: Arc<dyn StyleSink>,
        distance: Option<&str>,
        duration: Option<f64>,
    ) -> Completion {
        let value = format!("translateY({})", distance.unwrap_or("-100%"));
        self.run_transition(element, "transform", &value, duration)
    }

    /// Translate vertically by `distance` (default `100%`).
    pub fn slide_down(
        &self,
        element: Arc<dyn StyleSink>,
        distance: Option<&str>,
        duration: Option<f64>,
    ) -> Completion {
        let value = format!("translateY({})", distance.unwrap_or("100%"));
        self.run_transition(element, "transform", &value, duration)
    }

    /// Scale to `scale` (default 1).
    pub fn scale_in(&self, element: Arc<dyn StyleSink>, scale: Option<f64>, duration: Option<f64>) -> Completion {
        let value = format!("scale({})", scale.unwrap_or(1.0));
        self.run_transition(element, "transform", &value, duration)
    }

    /// Scale to `scale` (default 0).
    pub fn scale_out(&self, element: Arc<dyn StyleSink>, scale: Option<f64>, duration: Option<f64>) -> Completion {
        let value = format!("scale({})", scale.unwrap_or(0.0));
        self.run_transition(element, "transform", &value, duration)
    }

    pub fn to(&self, target: f64, options: ScrollOptions) -> Result<Completion> {
        self.scroll_animator().scroll_to(target, options)
    }

    pub fn to_element(&self, element: &dyn LayoutBox, options: ScrollOptions) -> Result<Completion> {
        self.scroll_animator().scroll_to_element(element, options)
    }

    pub fn to_top(&self, options: ScrollOptions) -> Result<Completion> {
        self.scroll_animator().scroll_to_top(options)
    }

    pub fn to_bottom(&self, options: ScrollOptions) -> Result<Completion> {
        self.scroll_animator().scroll_to_bottom(options)
    }

    /// Forward visibility changes of `target` to `callback`.
    pub fn trigger<E, F>(&self, target: &E, callback: F, options: ObserverOptions) -> ScrollTrigger
    where
        E: Element + ?Sized,
        F: Fn(&VisibilityEntry) + Send + Sync + 'static,
    {
        ScrollTrigger::with_defaults(
            self.visibility.as_ref(),
            target,
            callback,
            self.observer.clone(),
            options,
        )
    }

    /// Attach a parallax effect; unset arguments use the configured values.
    pub fn parallax(
        &self,
        element: Arc<dyn StyleSink>,
        speed: Option<f64>,
        direction: Option<Axis>,
    ) -> ParallaxScroller {
        let config = ParallaxConfig {
            speed: speed.unwrap_or(self.parallax.speed),
            direction: direction.unwrap_or(self.parallax.direction),
        };
        ParallaxScroller::new(
            element,
            Arc::clone(&self.viewport),
            Arc::clone(&self.scheduler),
            config,
        )
    }

    /// Attach a scroll spy; `None` uses the configured options.
    pub fn spy(
        &self,
        sections: Vec<Arc<dyn LayoutBox>>,
        nav_items: Vec<Arc<dyn StyleSink>>,
        options: Option<SpyOptions>,
    ) -> ScrollSpy {
        ScrollSpy::new(
            sections,
            nav_items,
            Arc::clone(&self.viewport),
            options.unwrap_or_else(|| self.spy.clone()),
        )
    }
}

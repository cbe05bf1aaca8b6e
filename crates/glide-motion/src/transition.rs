//! Per-element style transitions with completion signals.
//!
//! A [`TransitionManager`] owns the `transition` declaration of one element
//! and drives property changes through it. Each [`TransitionManager::animate`]
//! call returns a [`Completion`] that settles when the element reports the
//! transition finished, or when a fallback timer of
//! `duration + delay + grace` elapses, whichever comes first.
//!
//! Animations of the same property run one after another; different
//! properties run independently.
//!
//! # Example
//!
//! ```ignore
//! let manager = TransitionManager::new(card.clone());
//! manager
//!     .animate("opacity", "1", TransitionOptions::new().with_duration(200.0))
//!     .await;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glide_config::TransitionConfig;
use tracing::{debug, trace};

use crate::completion::{race_timeout, Completion, Registration, Resolver, Settlement};
use crate::error::Result;
use crate::surface::StyleSink;
use crate::sync::lock;
use crate::timing::TimingFunction;

/// Per-call overrides; unset fields fall back to the manager's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitionOptions {
    pub duration: Option<f64>,
    pub easing: Option<TimingFunction>,
    pub delay: Option<f64>,
}

impl TransitionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_easing(mut self, easing: TimingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay = Some(delay_ms);
        self
    }
}

/// One entry of an element's `transition` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDescriptor {
    pub property: String,
    pub duration_ms: f64,
    pub easing: TimingFunction,
    pub delay_ms: f64,
}

impl fmt::Display for TransitionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}ms {}", self.property, self.duration_ms, self.easing)?;
        if self.delay_ms > 0.0 {
            write!(f, " {}ms", self.delay_ms)?;
        }
        Ok(())
    }
}

/// Manager-wide defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionDefaults {
    pub duration_ms: f64,
    pub easing: TimingFunction,
    pub delay_ms: f64,
    /// Extra wait past `duration + delay` before the fallback timer fires.
    pub fallback_grace_ms: f64,
}

impl Default for TransitionDefaults {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            easing: TimingFunction::EASE_OUT,
            delay_ms: 0.0,
            fallback_grace_ms: 100.0,
        }
    }
}

impl TransitionDefaults {
    pub fn from_config(config: &TransitionConfig) -> Result<Self> {
        Ok(Self {
            duration_ms: config.duration_ms,
            easing: config.easing.parse()?,
            delay_ms: config.delay_ms,
            fallback_grace_ms: config.fallback_grace_ms,
        })
    }

    fn descriptor(&self, property: &str, options: &TransitionOptions) -> TransitionDescriptor {
        TransitionDescriptor {
            property: property.to_string(),
            duration_ms: options.duration.unwrap_or(self.duration_ms),
            easing: options.easing.unwrap_or(self.easing),
            delay_ms: options.delay.unwrap_or(self.delay_ms),
        }
    }
}

struct PendingAnimation {
    id: u64,
    completion: Completion,
}

#[derive(Default)]
struct ManagerState {
    /// First-declaration order; re-declaring a property replaces it in place.
    descriptors: Vec<TransitionDescriptor>,
    pending: HashMap<String, PendingAnimation>,
}

struct ManagerInner {
    element: Arc<dyn StyleSink>,
    defaults: TransitionDefaults,
    state: Mutex<ManagerState>,
    next_id: AtomicU64,
}

/// Transition orchestration for one element. Clones share state.
#[derive(Clone)]
pub struct TransitionManager {
    inner: Arc<ManagerInner>,
}

impl TransitionManager {
    pub fn new(element: Arc<dyn StyleSink>) -> Self {
        Self::with_defaults(element, TransitionDefaults::default())
    }

    pub fn with_defaults(element: Arc<dyn StyleSink>, defaults: TransitionDefaults) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                element,
                defaults,
                state: Mutex::default(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Declare (or re-declare) a transition for `property`.
    pub fn add(&self, property: &str, options: TransitionOptions) {
        let descriptor = self.inner.defaults.descriptor(property, &options);
        self.inner.upsert(descriptor);
    }

    /// Drop the declaration for `property`, if any.
    pub fn remove(&self, property: &str) {
        let mut state = lock(&self.inner.state);
        state.descriptors.retain(|d| d.property != property);
        self.inner.write_declaration(&state.descriptors);
    }

    /// Drop every declaration.
    pub fn clear(&self) {
        let mut state = lock(&self.inner.state);
        state.descriptors.clear();
        self.inner.write_declaration(&state.descriptors);
    }

    /// Transition `property` to `value`.
    ///
    /// If an animation of the same property is still pending, this one starts
    /// after it settles. The returned completion settles exactly once.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn animate(&self, property: &str, value: &str, options: TransitionOptions) -> Completion {
        let descriptor = self.inner.defaults.descriptor(property, &options);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (resolver, completion) = Completion::channel();

        let previous = {
            let mut state = lock(&self.inner.state);
            state.pending.insert(
                property.to_string(),
                PendingAnimation {
                    id,
                    completion: completion.clone(),
                },
            )
        };
        let previous = previous
            .map(|pending| pending.completion)
            .filter(|completion| !completion.is_resolved());

        let inner = Arc::clone(&self.inner);
        let value = value.to_string();
        match previous {
            Some(previous) => {
                debug!(property, "transition waiting for previous animation");
                tokio::spawn(async move {
                    previous.await;
                    let race = inner.start(&descriptor, &value);
                    let settlement = race.await;
                    inner.finish(&descriptor.property, id, settlement, resolver);
                });
            }
            None => {
                let race = inner.start(&descriptor, &value);
                tokio::spawn(async move {
                    let settlement = race.await;
                    inner.finish(&descriptor.property, id, settlement, resolver);
                });
            }
        }

        completion
    }

    /// Start every animation and settle once all of them have.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn animate_multiple<I, P, V>(&self, animations: I) -> Completion
    where
        I: IntoIterator<Item = (P, V, TransitionOptions)>,
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let completions: Vec<Completion> = animations
            .into_iter()
            .map(|(property, value, options)| {
                self.animate(property.as_ref(), value.as_ref(), options)
            })
            .collect();
        Completion::all(completions)
    }

    /// Settles once every currently pending animation has; immediately if
    /// none are pending.
    pub fn wait_for_all(&self) -> Completion {
        let state = lock(&self.inner.state);
        Completion::all(
            state
                .pending
                .values()
                .map(|pending| pending.completion.clone())
                .collect::<Vec<_>>(),
        )
    }

    pub fn is_animating(&self) -> bool {
        !lock(&self.inner.state).pending.is_empty()
    }

    /// Number of properties with a pending animation.
    pub fn active_animations_count(&self) -> usize {
        lock(&self.inner.state).pending.len()
    }

    /// Current declarations in declaration order.
    pub fn descriptors(&self) -> Vec<TransitionDescriptor> {
        lock(&self.inner.state).descriptors.clone()
    }

    pub fn descriptor(&self, property: &str) -> Option<TransitionDescriptor> {
        lock(&self.inner.state)
            .descriptors
            .iter()
            .find(|d| d.property == property)
            .cloned()
    }

    pub fn defaults(&self) -> &TransitionDefaults {
        &self.inner.defaults
    }
}

impl ManagerInner {
    fn upsert(&self, descriptor: TransitionDescriptor) {
        let mut state = lock(&self.state);
        let existing = state
            .descriptors
            .iter()
            .position(|d| d.property == descriptor.property);
        match existing {
            Some(index) => state.descriptors[index] = descriptor,
            None => state.descriptors.push(descriptor),
        }
        self.write_declaration(&state.descriptors);
    }

    fn write_declaration(&self, descriptors: &[TransitionDescriptor]) {
        let declaration = descriptors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        trace!(%declaration, "transition declaration");
        self.element.set_style("transition", &declaration);
    }

    /// Declare, subscribe and apply the value; the returned future settles
    /// on the end signal or the fallback timer and removes the subscription.
    fn start(
        &self,
        descriptor: &TransitionDescriptor,
        value: &str,
    ) -> impl std::future::Future<Output = Settlement> + Send + 'static {
        self.upsert(descriptor.clone());

        let (signal_resolver, signal) = Completion::channel();
        let slot: Arc<Mutex<Option<Resolver>>> = Arc::new(Mutex::new(Some(signal_resolver)));
        let property = descriptor.property.clone();
        let listener_id = self.element.on_transition_end(Arc::new(move |ended: &str| {
            if ended == property {
                if let Some(resolver) = lock(&slot).take() {
                    resolver.resolve();
                }
            }
        }));
        let element = Arc::clone(&self.element);
        let registration = Registration::new(move || element.remove_transition_end(listener_id));

        self.element.set_style(&descriptor.property, value);

        let timeout_ms =
            (descriptor.duration_ms + descriptor.delay_ms + self.defaults.fallback_grace_ms).max(0.0);
        let timeout = Duration::try_from_secs_f64(timeout_ms / 1000.0).unwrap_or(Duration::MAX);
        debug!(property = %descriptor.property, value, timeout_ms, "transition started");

        async move {
            let settlement = race_timeout(signal, timeout).await;
            registration.dispose();
            settlement
        }
    }

    fn finish(&self, property: &str, id: u64, settlement: Settlement, resolver: Resolver) {
        {
            let mut state = lock(&self.state);
            if state.pending.get(property).is_some_and(|pending| pending.id == id) {
                state.pending.remove(property);
            }
        }
        match settlement {
            Settlement::Signalled => debug!(property, "transition finished"),
            Settlement::TimedOut => debug!(property, "transition settled by fallback timer"),
        }
        resolver.resolve();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryElement;
    use tokio::time::Instant;

    fn manager() -> (Arc<MemoryElement>, TransitionManager) {
        let element = Arc::new(MemoryElement::new());
        let manager = TransitionManager::new(element.clone());
        (element, manager)
    }

    fn assert_elapsed_ms(start: Instant, expected: u64) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(expected)
                && elapsed < Duration::from_millis(expected + 10),
            "expected ~{}ms, got {:?}",
            expected,
            elapsed
        );
    }

    #[test]
    fn test_declaration_string() {
        let (element, manager) = manager();
        manager.add("opacity", TransitionOptions::new());
        assert_eq!(element.style("transition").as_deref(), Some("opacity 300ms ease-out"));

        manager.add(
            "transform",
            TransitionOptions::new()
                .with_duration(500.0)
                .with_easing(TimingFunction::EASE_OUT_QUART)
                .with_delay(50.0),
        );
        assert_eq!(
            element.style("transition").as_deref(),
            Some(
                "opacity 300ms ease-out, \
                 transform 500ms cubic-bezier(0.165, 0.840, 0.440, 1.000) 50ms"
            )
        );
    }

    #[test]
    fn test_redeclare_keeps_order() {
        let (element, manager) = manager();
        manager.add("opacity", TransitionOptions::new());
        manager.add("transform", TransitionOptions::new());
        manager.add("opacity", TransitionOptions::new().with_duration(150.0));

        let properties: Vec<String> = manager.descriptors().into_iter().map(|d| d.property).collect();
        assert_eq!(properties, vec!["opacity", "transform"]);
        assert_eq!(manager.descriptor("opacity").map(|d| d.duration_ms), Some(150.0));
        assert_eq!(
            element.style("transition").as_deref(),
            Some("opacity 150ms ease-out, transform 300ms ease-out")
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let (element, manager) = manager();
        manager.add("opacity", TransitionOptions::new());
        manager.add("transform", TransitionOptions::new());

        manager.remove("opacity");
        manager.remove("missing");
        assert_eq!(element.style("transition").as_deref(), Some("transform 300ms ease-out"));

        manager.clear();
        assert_eq!(element.style("transition"), None);
        assert!(manager.descriptors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_signal_settles() {
        let (element, manager) = manager();
        let start = Instant::now();
        let done = manager.animate("opacity", "1", TransitionOptions::new());

        assert_eq!(element.style("opacity").as_deref(), Some("1"));
        assert_eq!(element.transition_listener_count(), 1);
        assert!(manager.is_animating());

        element.fire_transition_end("transform");
        element.fire_transition_end("opacity");
        done.await;

        assert_elapsed_ms(start, 0);
        assert_eq!(element.transition_listener_count(), 0);
        assert!(!manager.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timer_settles() {
        let (element, manager) = manager();
        let start = Instant::now();
        manager
            .animate(
                "opacity",
                "0",
                TransitionOptions::new().with_duration(200.0).with_delay(50.0),
            )
            .await;

        assert_elapsed_ms(start, 350);
        assert_eq!(element.transition_listener_count(), 0);
        assert_eq!(manager.active_animations_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_settles_after_grace() {
        let (element, manager) = manager();
        let start = Instant::now();
        let done = manager.animate("opacity", "1", TransitionOptions::new().with_duration(0.0));
        assert_eq!(element.transition_listener_count(), 1);

        done.await;
        assert_elapsed_ms(start, 100);
        assert_eq!(element.transition_listener_count(), 0);
        assert!(!manager.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_duration_waits_for_end_signal() {
        let (element, manager) = manager();
        let endless = manager.animate(
            "opacity",
            "1",
            TransitionOptions::new().with_duration(f64::INFINITY),
        );
        let huge = manager.animate("transform", "scale(2)", TransitionOptions::new().with_duration(1e25));
        assert_eq!(element.transition_listener_count(), 2);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!endless.is_resolved());
        assert!(!huge.is_resolved());

        element.fire_transition_end("opacity");
        element.fire_transition_end("transform");
        endless.await;
        huge.await;
        assert_eq!(element.transition_listener_count(), 0);
        assert_eq!(manager.active_animations_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_property_runs_in_sequence() {
        let (element, manager) = manager();
        let start = Instant::now();
        let first = manager.animate("opacity", "0", TransitionOptions::new());
        let second = manager.animate("opacity", "1", TransitionOptions::new());
        assert_eq!(manager.active_animations_count(), 1);
        assert_eq!(element.style("opacity").as_deref(), Some("0"));

        first.await;
        assert_elapsed_ms(start, 400);
        // The finished first run must not remove the second's entry.
        assert!(manager.is_animating());

        second.await;
        assert_elapsed_ms(start, 800);
        assert_eq!(element.style("opacity").as_deref(), Some("1"));
        assert!(!manager.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_properties_run_concurrently() {
        let (_element, manager) = manager();
        let start = Instant::now();
        let done = manager.animate_multiple([
            ("opacity", "1", TransitionOptions::new()),
            ("transform", "scale(1)", TransitionOptions::new().with_duration(500.0)),
        ]);
        assert_eq!(manager.active_animations_count(), 2);

        done.await;
        assert_elapsed_ms(start, 600);
        assert_eq!(manager.descriptors().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_all() {
        let (element, manager) = manager();
        let idle = manager.wait_for_all();
        assert!(idle.is_resolved());
        idle.await;

        let start = Instant::now();
        let _opacity = manager.animate("opacity", "1", TransitionOptions::new().with_duration(100.0));
        let _transform = manager.animate("transform", "none", TransitionOptions::new());
        element.fire_transition_end("opacity");

        manager.wait_for_all().await;
        assert_elapsed_ms(start, 400);
        assert!(!manager.is_animating());
    }

    #[test]
    fn test_defaults_from_config() {
        let config = TransitionConfig {
            duration_ms: 150.0,
            easing: "ease-in".to_string(),
            delay_ms: 20.0,
            fallback_grace_ms: 50.0,
        };
        let defaults = TransitionDefaults::from_config(&config).unwrap();
        assert_eq!(defaults.easing, TimingFunction::EaseIn);
        assert_eq!(defaults.fallback_grace_ms, 50.0);

        let bad = TransitionConfig {
            easing: "wobble".to_string(),
            ..config
        };
        assert!(TransitionDefaults::from_config(&bad).is_err());
    }
}

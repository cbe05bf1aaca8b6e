//! Viewport visibility triggers.
//!
//! A [`ScrollTrigger`] wraps one observer from a [`VisibilityFacility`] and
//! forwards every visibility entry it delivers to a callback, one call per
//! entry, in delivery order.
//!
//! # Example
//!
//! ```ignore
//! let trigger = ScrollTrigger::new(&facility, &*card, |entry| {
//!     if entry.is_intersecting {
//!         reveal(entry.target);
//!     }
//! }, ObserverOptions::default());
//! ```

use std::sync::Arc;

use glide_config::TriggerConfig;

use crate::surface::{Element, ElementId};

/// Observation settings for one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverConfig {
    /// Element whose bounds are used as the viewport; `None` for the
    /// top-level viewport.
    pub root: Option<ElementId>,
    /// CSS-style margin grown or shrunk around the root.
    pub root_margin: String,
    /// Visible fraction at which a change is reported.
    pub threshold: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: "0px".to_string(),
            threshold: 0.1,
        }
    }
}

/// Caller overrides merged over an [`ObserverConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverOptions {
    pub root: Option<ElementId>,
    pub root_margin: Option<String>,
    pub threshold: Option<f64>,
}

impl ObserverOptions {
    pub fn with_root(mut self, root: ElementId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = Some(margin.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

impl ObserverConfig {
    pub fn from_config(config: &TriggerConfig) -> Self {
        Self {
            root: None,
            root_margin: config.root_margin.clone(),
            threshold: config.threshold,
        }
    }

    /// Apply `options` field by field; unset fields keep this config's values.
    pub fn merged(mut self, options: ObserverOptions) -> Self {
        if options.root.is_some() {
            self.root = options.root;
        }
        if let Some(margin) = options.root_margin {
            self.root_margin = margin;
        }
        if let Some(threshold) = options.threshold {
            self.threshold = threshold;
        }
        self
    }
}

/// One visibility change reported by the facility.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the target, 0.0 to 1.0.
    pub intersection_ratio: f64,
    /// Time of the change in milliseconds.
    pub time: f64,
}

/// Receives each batch of entries the facility delivers.
pub type VisibilityCallback = Arc<dyn Fn(&[VisibilityEntry]) + Send + Sync>;

/// A live observer created by a [`VisibilityFacility`].
pub trait VisibilityObserver: Send + Sync {
    fn observe(&self, target: ElementId);

    fn unobserve(&self, target: ElementId);

    fn disconnect(&self);
}

/// Environment facility that reports element visibility changes.
pub trait VisibilityFacility: Send + Sync {
    fn create_observer(
        &self,
        config: &ObserverConfig,
        callback: VisibilityCallback,
    ) -> Box<dyn VisibilityObserver>;
}

/// Forwards visibility changes of one element to a callback.
///
/// Dropping the trigger disconnects its observer.
pub struct ScrollTrigger {
    target: ElementId,
    config: ObserverConfig,
    observer: Box<dyn VisibilityObserver>,
}

impl ScrollTrigger {
    /// Create a trigger with the default observer configuration and start
    /// observing `target` immediately.
    pub fn new<E, F>(
        facility: &dyn VisibilityFacility,
        target: &E,
        callback: F,
        options: ObserverOptions,
    ) -> Self
    where
        E: Element + ?Sized,
        F: Fn(&VisibilityEntry) + Send + Sync + 'static,
    {
        Self::with_defaults(facility, target, callback, ObserverConfig::default(), options)
    }

    /// Like [`ScrollTrigger::new`], merging `options` over `defaults`.
    pub fn with_defaults<E, F>(
        facility: &dyn VisibilityFacility,
        target: &E,
        callback: F,
        defaults: ObserverConfig,
        options: ObserverOptions,
    ) -> Self
    where
        E: Element + ?Sized,
        F: Fn(&VisibilityEntry) + Send + Sync + 'static,
    {
        let config = defaults.merged(options);
        let forward: VisibilityCallback = Arc::new(move |entries: &[VisibilityEntry]| {
            entries.iter().for_each(&callback);
        });
        let observer = facility.create_observer(&config, forward);

        let trigger = Self {
            target: target.id(),
            config,
            observer,
        };
        trigger.observe();
        trigger
    }

    /// Start observing the target.
    pub fn observe(&self) {
        self.observer.observe(self.target);
    }

    /// Stop observing the target; the observer stays alive.
    pub fn unobserve(&self) {
        self.observer.unobserve(self.target);
    }

    /// Shut the observer down.
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryElement, MemoryVisibility};
    use std::sync::Mutex;

    fn entry(target: ElementId, visible: bool) -> VisibilityEntry {
        VisibilityEntry {
            target,
            is_intersecting: visible,
            intersection_ratio: if visible { 1.0 } else { 0.0 },
            time: 0.0,
        }
    }

    #[test]
    fn test_config_merges_over_defaults() {
        let merged = ObserverConfig::default().merged(ObserverOptions::default().with_threshold(0.5));
        assert_eq!(merged.root, None);
        assert_eq!(merged.root_margin, "0px");
        assert_eq!(merged.threshold, 0.5);
    }

    #[test]
    fn test_observes_on_construction() {
        let facility = MemoryVisibility::new();
        let element = MemoryElement::new();
        let trigger = ScrollTrigger::new(
            &facility,
            &element,
            |_| {},
            ObserverOptions::default().with_root_margin("50px"),
        );

        assert!(facility.is_observing(element.id()));
        assert_eq!(trigger.config().root_margin, "50px");
        assert_eq!(facility.observer_configs()[0].threshold, 0.1);
    }

    #[test]
    fn test_forwards_each_entry_in_order() {
        let facility = MemoryVisibility::new();
        let element = MemoryElement::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _trigger = ScrollTrigger::new(
            &facility,
            &element,
            move |entry| sink.lock().unwrap().push(entry.is_intersecting),
            ObserverOptions::default(),
        );

        facility.emit(vec![
            entry(element.id(), true),
            entry(element.id(), false),
            entry(element.id(), true),
        ]);
        assert_eq!(*seen.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_lifecycle_is_idempotent() {
        let facility = MemoryVisibility::new();
        let element = MemoryElement::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let trigger = ScrollTrigger::new(
            &facility,
            &element,
            move |_| *counter.lock().unwrap() += 1,
            ObserverOptions::default(),
        );

        trigger.unobserve();
        trigger.unobserve();
        facility.emit(vec![entry(element.id(), true)]);
        assert_eq!(*count.lock().unwrap(), 0);

        trigger.observe();
        trigger.observe();
        facility.emit(vec![entry(element.id(), true)]);
        assert_eq!(*count.lock().unwrap(), 1);

        trigger.disconnect();
        trigger.disconnect();
        facility.emit(vec![entry(element.id(), true)]);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_drop_disconnects() {
        let facility = MemoryVisibility::new();
        let element = MemoryElement::new();
        {
            let _trigger = ScrollTrigger::new(&facility, &element, |_| {}, ObserverOptions::default());
            assert!(facility.is_observing(element.id()));
        }
        assert!(!facility.is_observing(element.id()));
    }
}

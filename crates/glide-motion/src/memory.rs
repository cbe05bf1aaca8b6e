//! In-memory environment surfaces.
//!
//! These implement the environment traits without a rendering backend. They
//! record every write so effects can be asserted on, and let the owner fire
//! the events a real environment would (scroll, transition end, visibility).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::surface::{
    Element, ElementId, LayoutBox, ListenerId, Listeners, ScrollListener, ScrollSurface, StyleSink,
    TransitionEndListener,
};
use crate::sync::lock;
use crate::trigger::{
    ObserverConfig, VisibilityCallback, VisibilityEntry, VisibilityFacility, VisibilityObserver,
};

/// Element with in-memory styles, classes and layout.
#[derive(Debug)]
pub struct MemoryElement {
    id: ElementId,
    styles: Mutex<HashMap<String, String>>,
    classes: Mutex<BTreeSet<String>>,
    writes: Mutex<Vec<(String, String)>>,
    offset_top: Mutex<f64>,
    viewport: Option<Weak<MemoryViewport>>,
    transition_end: Mutex<Listeners<TransitionEndListener>>,
}

impl Default for MemoryElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryElement {
    pub fn new() -> Self {
        Self {
            id: ElementId::new(),
            styles: Mutex::default(),
            classes: Mutex::default(),
            writes: Mutex::default(),
            offset_top: Mutex::new(0.0),
            viewport: None,
            transition_end: Mutex::default(),
        }
    }

    /// Element whose top edge sits `offset_top` pixels into the document.
    pub fn at(offset_top: f64) -> Self {
        let element = Self::new();
        element.set_offset_top(offset_top);
        element
    }

    /// Place the element inside `viewport`, so that its bounding top
    /// follows the viewport's scroll position.
    pub fn in_viewport(mut self, viewport: &Arc<MemoryViewport>) -> Self {
        self.viewport = Some(Arc::downgrade(viewport));
        self
    }

    pub fn set_offset_top(&self, offset_top: f64) {
        *lock(&self.offset_top) = offset_top;
    }

    /// Every `set_style` call so far, in order.
    pub fn style_writes(&self) -> Vec<(String, String)> {
        lock(&self.writes).clone()
    }

    /// Number of `set_style` calls for one property.
    pub fn write_count(&self, property: &str) -> usize {
        lock(&self.writes)
            .iter()
            .filter(|(p, _)| p == property)
            .count()
    }

    pub fn classes(&self) -> Vec<String> {
        lock(&self.classes).iter().cloned().collect()
    }

    pub fn transition_listener_count(&self) -> usize {
        lock(&self.transition_end).len()
    }

    /// Deliver a transition-end notification for `property`.
    pub fn fire_transition_end(&self, property: &str) {
        let listeners = lock(&self.transition_end).snapshot();
        for listener in listeners {
            listener(property);
        }
    }
}

impl Element for MemoryElement {
    fn id(&self) -> ElementId {
        self.id
    }
}

impl StyleSink for MemoryElement {
    fn style(&self, property: &str) -> Option<String> {
        lock(&self.styles).get(property).cloned()
    }

    fn set_style(&self, property: &str, value: &str) {
        {
            let mut styles = lock(&self.styles);
            if value.is_empty() {
                styles.remove(property);
            } else {
                styles.insert(property.to_string(), value.to_string());
            }
        }
        lock(&self.writes).push((property.to_string(), value.to_string()));
    }

    fn add_class(&self, class: &str) {
        lock(&self.classes).insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        lock(&self.classes).remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        lock(&self.classes).contains(class)
    }

    fn on_transition_end(&self, listener: TransitionEndListener) -> ListenerId {
        lock(&self.transition_end).add(listener)
    }

    fn remove_transition_end(&self, id: ListenerId) {
        lock(&self.transition_end).remove(id);
    }
}

impl LayoutBox for MemoryElement {
    fn offset_top(&self) -> f64 {
        *lock(&self.offset_top)
    }

    fn bounding_top(&self) -> f64 {
        let scrolled = self
            .viewport
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|viewport| viewport.scroll_position() - viewport.client_top())
            .unwrap_or(0.0);
        self.offset_top() - scrolled
    }
}

/// Scrollable region with an in-memory position.
///
/// Writes are clamped to `0..=max_scroll_position` and notify scroll
/// listeners synchronously.
#[derive(Debug)]
pub struct MemoryViewport {
    position: Mutex<f64>,
    max_position: Mutex<f64>,
    client_top: f64,
    writes: Mutex<Vec<f64>>,
    listeners: Mutex<Listeners<ScrollListener>>,
}

impl MemoryViewport {
    /// Top-level viewport that can scroll up to `max_position`.
    pub fn new(max_position: f64) -> Self {
        Self::container(max_position, 0.0)
    }

    /// Scroll container whose top edge sits `client_top` pixels below the
    /// top of the visible viewport.
    pub fn container(max_position: f64, client_top: f64) -> Self {
        Self {
            position: Mutex::new(0.0),
            max_position: Mutex::new(max_position.max(0.0)),
            client_top,
            writes: Mutex::default(),
            listeners: Mutex::default(),
        }
    }

    pub fn set_max_scroll_position(&self, max_position: f64) {
        *lock(&self.max_position) = max_position.max(0.0);
    }

    /// Every position written so far, after clamping.
    pub fn position_writes(&self) -> Vec<f64> {
        lock(&self.writes).clone()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Notify listeners without moving, as a burst of scroll events would.
    pub fn emit_scroll(&self) {
        let listeners = lock(&self.listeners).snapshot();
        for listener in listeners {
            listener();
        }
    }
}

impl ScrollSurface for MemoryViewport {
    fn scroll_position(&self) -> f64 {
        *lock(&self.position)
    }

    fn set_scroll_position(&self, position: f64) {
        let max = *lock(&self.max_position);
        let clamped = position.clamp(0.0, max);
        *lock(&self.position) = clamped;
        lock(&self.writes).push(clamped);
        self.emit_scroll();
    }

    fn max_scroll_position(&self) -> f64 {
        *lock(&self.max_position)
    }

    fn client_top(&self) -> f64 {
        self.client_top
    }

    fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId {
        lock(&self.listeners).add(listener)
    }

    fn remove_scroll_listener(&self, id: ListenerId) {
        lock(&self.listeners).remove(id);
    }
}

struct MemoryObserverState {
    config: ObserverConfig,
    callback: VisibilityCallback,
    targets: Mutex<HashSet<ElementId>>,
    connected: AtomicBool,
}

struct MemoryObserver {
    state: Arc<MemoryObserverState>,
}

impl VisibilityObserver for MemoryObserver {
    fn observe(&self, target: ElementId) {
        if self.state.connected.load(Ordering::Acquire) {
            lock(&self.state.targets).insert(target);
        }
    }

    fn unobserve(&self, target: ElementId) {
        lock(&self.state.targets).remove(&target);
    }

    fn disconnect(&self) {
        self.state.connected.store(false, Ordering::Release);
        lock(&self.state.targets).clear();
    }
}

/// Visibility facility whose entries are supplied by the owner.
#[derive(Default)]
pub struct MemoryVisibility {
    observers: Mutex<Vec<Arc<MemoryObserverState>>>,
}

impl MemoryVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations of every observer created so far.
    pub fn observer_configs(&self) -> Vec<ObserverConfig> {
        lock(&self.observers)
            .iter()
            .map(|o| o.config.clone())
            .collect()
    }

    /// Whether any connected observer is watching `target`.
    pub fn is_observing(&self, target: ElementId) -> bool {
        lock(&self.observers).iter().any(|o| {
            o.connected.load(Ordering::Acquire) && lock(&o.targets).contains(&target)
        })
    }

    /// Deliver `entries` to every connected observer, restricted to the
    /// targets each one observes. Observers with no matching entries are
    /// not called.
    pub fn emit(&self, entries: Vec<VisibilityEntry>) {
        let observers = lock(&self.observers).clone();
        for observer in observers {
            if !observer.connected.load(Ordering::Acquire) {
                continue;
            }
            let batch: Vec<VisibilityEntry> = {
                let targets = lock(&observer.targets);
                entries
                    .iter()
                    .filter(|e| targets.contains(&e.target))
                    .cloned()
                    .collect()
            };
            if !batch.is_empty() {
                (observer.callback)(&batch);
            }
        }
    }
}

impl VisibilityFacility for MemoryVisibility {
    fn create_observer(
        &self,
        config: &ObserverConfig,
        callback: VisibilityCallback,
    ) -> Box<dyn VisibilityObserver> {
        let state = Arc::new(MemoryObserverState {
            config: config.clone(),
            callback,
            targets: Mutex::default(),
            connected: AtomicBool::new(true),
        });
        lock(&self.observers).push(Arc::clone(&state));
        Box::new(MemoryObserver { state })
    }
}

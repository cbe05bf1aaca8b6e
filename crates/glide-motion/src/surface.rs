//! Environment surfaces the engine reads from and writes to.
//!
//! The engine never touches a rendering environment directly. Elements are
//! reached through [`StyleSink`] (style properties, class markers and
//! transition-end notifications) and [`LayoutBox`] (positions), scroll
//! containers through [`ScrollSurface`]. In-memory implementations live in
//! [`crate::memory`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an element within its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Generate a new unique element ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned when a listener is registered, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Called with the property name whenever a style transition finishes.
pub type TransitionEndListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Called after the scroll position changes.
pub type ScrollListener = Arc<dyn Fn() + Send + Sync>;

/// Anything with an identity in the environment.
pub trait Element: Send + Sync {
    fn id(&self) -> ElementId;
}

/// Mutable style state of one element.
pub trait StyleSink: Element {
    /// Current value of a style property, if set.
    fn style(&self, property: &str) -> Option<String>;

    /// Set a style property. An empty value removes the property.
    fn set_style(&self, property: &str, value: &str);

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn has_class(&self, class: &str) -> bool;

    /// Subscribe to "transition finished" notifications for any property.
    fn on_transition_end(&self, listener: TransitionEndListener) -> ListenerId;

    /// Remove a transition-end listener. Unknown IDs are ignored.
    fn remove_transition_end(&self, id: ListenerId);
}

/// Layout position of one element.
pub trait LayoutBox: Element {
    /// Top edge relative to the document (or scroll content) origin.
    fn offset_top(&self) -> f64;

    /// Top edge relative to the visible viewport.
    fn bounding_top(&self) -> f64;
}

/// A scrollable region: the whole viewport or a container element.
pub trait ScrollSurface: Send + Sync {
    fn scroll_position(&self) -> f64;

    fn set_scroll_position(&self, position: f64);

    /// Largest reachable scroll position.
    fn max_scroll_position(&self) -> f64;

    /// Top edge of the surface relative to the visible viewport
    /// (zero for the viewport itself).
    fn client_top(&self) -> f64 {
        0.0
    }

    fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId;

    /// Remove a scroll listener. Unknown IDs are ignored.
    fn remove_scroll_listener(&self, id: ListenerId);

    /// Position of `element` in this surface's scroll coordinates.
    fn position_of(&self, element: &dyn LayoutBox) -> f64 {
        element.bounding_top() - self.client_top() + self.scroll_position()
    }
}

/// Ordered listener registry for surface implementations.
///
/// Callers snapshot the registry and invoke listeners outside any lock, so
/// listeners may register or remove listeners while being notified.
pub struct Listeners<L> {
    next: u64,
    entries: Vec<(ListenerId, L)>,
}

impl<L> std::fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<L> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            next: 1,
            entries: Vec::new(),
        }
    }
}

impl<L: Clone> Listeners<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clone the current listeners in registration order.
    pub fn snapshot(&self) -> Vec<L> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }
}

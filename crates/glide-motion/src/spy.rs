//! Scroll spy: mark the navigation item of the section currently in view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use glide_config::SpyConfig;
use tracing::debug;

use crate::surface::{LayoutBox, ListenerId, ScrollSurface, StyleSink};
use crate::sync::lock;

#[derive(Debug, Clone, PartialEq)]
pub struct SpyOptions {
    /// Class added to the active navigation item.
    pub active_class: String,
    /// Added to the scroll position before comparing section tops.
    pub offset: f64,
}

impl Default for SpyOptions {
    fn default() -> Self {
        Self {
            active_class: "active".to_string(),
            offset: 100.0,
        }
    }
}

impl SpyOptions {
    pub fn from_config(config: &SpyConfig) -> Self {
        Self {
            active_class: config.active_class.clone(),
            offset: config.offset,
        }
    }

    pub fn with_active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

struct SpyInner {
    sections: Vec<Arc<dyn LayoutBox>>,
    nav_items: Vec<Arc<dyn StyleSink>>,
    surface: Arc<dyn ScrollSurface>,
    options: SpyOptions,
    active: Mutex<Option<usize>>,
    listener: Mutex<Option<ListenerId>>,
    destroyed: AtomicBool,
}

/// Keeps the active class on the navigation item whose section was most
/// recently scrolled past.
///
/// `sections[i]` pairs with `nav_items[i]`; sections are expected in
/// document order. Dropping the spy destroys it.
pub struct ScrollSpy {
    inner: Arc<SpyInner>,
}

impl ScrollSpy {
    /// Attach to `surface` and apply the initial state.
    pub fn new(
        sections: Vec<Arc<dyn LayoutBox>>,
        nav_items: Vec<Arc<dyn StyleSink>>,
        surface: Arc<dyn ScrollSurface>,
        options: SpyOptions,
    ) -> Self {
        let inner = Arc::new(SpyInner {
            sections,
            nav_items,
            surface,
            options,
            active: Mutex::new(None),
            listener: Mutex::new(None),
            destroyed: AtomicBool::new(false),
        });

        let weak: Weak<SpyInner> = Arc::downgrade(&inner);
        let id = inner.surface.add_scroll_listener(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.update();
            }
        }));
        *lock(&inner.listener) = Some(id);

        inner.update();
        Self { inner }
    }

    /// Index of the active section, if any section has been reached.
    pub fn active_index(&self) -> Option<usize> {
        *lock(&self.inner.active)
    }

    /// Recompute now, without waiting for a scroll notification.
    pub fn refresh(&self) {
        self.inner.update();
    }

    pub fn options(&self) -> &SpyOptions {
        &self.inner.options
    }

    /// Stop listening and remove the active class from every navigation
    /// item. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(id) = lock(&self.inner.listener).take() {
            self.inner.surface.remove_scroll_listener(id);
        }
        for item in &self.inner.nav_items {
            item.remove_class(&self.inner.options.active_class);
        }
        *lock(&self.inner.active) = None;
        debug!(sections = self.inner.sections.len(), "scroll spy destroyed");
    }
}

impl SpyInner {
    fn update(&self) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }
        let position = self.surface.scroll_position() + self.options.offset;
        let class = self.options.active_class.as_str();

        for item in &self.nav_items {
            item.remove_class(class);
        }

        // Last section whose top has been reached.
        let current = self
            .sections
            .iter()
            .rposition(|section| position >= section.offset_top());

        if let Some(item) = current.and_then(|index| self.nav_items.get(index)) {
            item.add_class(class);
        }

        let mut active = lock(&self.active);
        let previous = *active;
        if previous != current {
            debug!(from = ?previous, to = ?current, "active section changed");
            *active = current;
        }
    }
}

impl Drop for ScrollSpy {
    fn drop(&mut self) {
        self.destroy();
    }
}

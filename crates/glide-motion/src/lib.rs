//! glide-motion: scroll animation and transition orchestration.
//!
//! This crate provides:
//! - **Scroll animation**: frame-driven interpolation of a scroll position
//! - **Transitions**: per-element style transitions with completion signals
//! - **Scroll-linked effects**: parallax translation and active-section spy
//! - **Visibility triggers**: callbacks on viewport intersection changes
//!
//! # Architecture
//!
//! ```text
//! MotionEnv (scheduler + viewport + visibility + defaults)
//!   ├── ScrollAnimator     ── FrameScheduler ── ScrollSurface
//!   ├── ParallaxScroller   ── FrameSlot ─────── StyleSink
//!   ├── ScrollSpy          ── ScrollSurface ─── LayoutBox / StyleSink
//!   ├── ScrollTrigger      ── VisibilityFacility
//!   └── TransitionManager  ── StyleSink + race_timeout
//! ```
//!
//! The rendering environment is reached only through the traits in
//! [`surface`], [`frame`] and [`trigger`]; [`memory`] implements all of them
//! in memory.

pub mod completion;
pub mod easing;
pub mod env;
pub mod error;
pub mod frame;
pub mod memory;
pub mod parallax;
pub mod presets;
pub mod scroll;
pub mod spy;
pub mod surface;
pub mod timing;
pub mod transition;
pub mod trigger;

mod sync;

pub use completion::{race_timeout, Completion, Registration, Resolver, Settlement};
pub use easing::Easing;
pub use env::MotionEnv;
pub use error::{MotionError, Result};
pub use frame::{FrameCallback, FrameScheduler, FrameSlot, IntervalFrameScheduler, ManualFrameScheduler};
pub use memory::{MemoryElement, MemoryViewport, MemoryVisibility};
pub use parallax::{ParallaxConfig, ParallaxScroller};
pub use presets::{create_transition, Duration, Presets, TransitionPreset};
pub use scroll::{AnimationRequest, AnimatorState, ScrollAnimator, ScrollDefaults, ScrollOptions};
pub use spy::{ScrollSpy, SpyOptions};
pub use surface::{Element, ElementId, LayoutBox, ListenerId, Listeners, ScrollSurface, StyleSink};
pub use timing::{StepPosition, TimingFunction};
pub use transition::{TransitionDefaults, TransitionDescriptor, TransitionManager, TransitionOptions};
pub use trigger::{
    ObserverConfig, ObserverOptions, ScrollTrigger, VisibilityCallback, VisibilityEntry,
    VisibilityFacility, VisibilityObserver,
};

pub use glide_config::{Axis, BusyPolicy};

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glide_config::GlideConfig;
use glide_motion::{
    create_transition, Duration, Easing, Element, FrameScheduler, IntervalFrameScheduler,
    LayoutBox, MemoryElement, MemoryViewport, MemoryVisibility, MotionEnv, ObserverOptions,
    Presets, ScrollOptions, ScrollSurface, StyleSink, VisibilityEntry,
};

const SECTION_HEIGHT: f64 = 600.0;
const SECTIONS: usize = 4;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = GlideConfig::load_with_env();

    let scheduler = Arc::new(IntervalFrameScheduler::from_config(&config.frame));
    let viewport = Arc::new(MemoryViewport::new(SECTION_HEIGHT * (SECTIONS - 1) as f64));
    let visibility = Arc::new(MemoryVisibility::new());
    let env = MotionEnv::from_config(
        scheduler.clone(),
        viewport.clone(),
        visibility.clone(),
        &config,
    )
    .context("invalid motion configuration")?;

    info!(interval = ?scheduler.interval(), "frame loop started");

    // A page of equal-height sections, each with a navigation link.
    let sections: Vec<Arc<MemoryElement>> = (0..SECTIONS)
        .map(|i| Arc::new(MemoryElement::at(i as f64 * SECTION_HEIGHT).in_viewport(&viewport)))
        .collect();
    let nav: Vec<Arc<MemoryElement>> = (0..SECTIONS).map(|_| Arc::new(MemoryElement::new())).collect();
    let spy = env.spy(
        sections.iter().map(|s| s.clone() as Arc<dyn LayoutBox>).collect(),
        nav.iter().map(|n| n.clone() as Arc<dyn StyleSink>).collect(),
        None,
    );

    let hero = Arc::new(MemoryElement::new());
    let parallax = env.parallax(hero.clone(), None, None);

    let card = Arc::new(MemoryElement::at(SECTION_HEIGHT * 2.0).in_viewport(&viewport));
    card.set_style(
        "transition",
        &create_transition(&["opacity", "transform"], Some(Duration::FAST), None, None),
    );
    let revealed = card.clone();
    let trigger = env.trigger(
        &*card,
        move |entry: &VisibilityEntry| {
            if entry.is_intersecting {
                revealed.add_class("in-view");
            }
        },
        ObserverOptions::default().with_threshold(0.25),
    );

    env.to_bottom(ScrollOptions::new())?.await;
    info!(
        position = viewport.scroll_position(),
        active = ?spy.active_index(),
        hero = ?hero.style("transform"),
        "reached bottom"
    );

    visibility.emit(vec![VisibilityEntry {
        target: card.id(),
        is_intersecting: true,
        intersection_ratio: 1.0,
        time: scheduler.now(),
    }]);

    // Nothing reports transition ends here, so these settle on the fallback timer.
    let slide = Presets::SLIDE_UP;
    let entrance = env
        .transitions(card.clone())
        .animate_multiple([
            ("opacity", "1".to_string(), Presets::FADE_IN.options(None)),
            (slide.property, "translateY(0)".to_string(), slide.options(Some(Duration::SLOW))),
        ]);
    entrance.await;
    info!(classes = ?card.classes(), writes = card.style_writes().len(), "card revealed");

    env.to_element(
        sections[1].as_ref(),
        ScrollOptions::new().with_easing(Easing::EaseInOut),
    )?
    .await;
    info!(
        position = viewport.scroll_position(),
        active = ?spy.active_index(),
        "scrolled back to section"
    );

    drop(trigger);
    spy.destroy();
    parallax.destroy();
    info!(listeners = viewport.listener_count(), "scene torn down");
    Ok(())
}

//! End-to-end scenes driven through `MotionEnv` with in-memory surfaces.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use glide_config::GlideConfig;
use glide_motion::{
    BusyPolicy, Easing, Element, LayoutBox, ManualFrameScheduler, MemoryElement, MemoryViewport,
    MemoryVisibility, MotionEnv, ObserverOptions, ScrollOptions, ScrollSurface, StyleSink,
    TransitionOptions, VisibilityEntry,
};
use tokio::time::Instant;

struct Scene {
    scheduler: Arc<ManualFrameScheduler>,
    viewport: Arc<MemoryViewport>,
    visibility: Arc<MemoryVisibility>,
    env: MotionEnv,
}

fn scene(config: &GlideConfig) -> Result<Scene> {
    let scheduler = Arc::new(ManualFrameScheduler::new());
    let viewport = Arc::new(MemoryViewport::new(4000.0));
    let visibility = Arc::new(MemoryVisibility::new());
    let env = MotionEnv::from_config(
        scheduler.clone(),
        viewport.clone(),
        visibility.clone(),
        config,
    )?;
    Ok(Scene {
        scheduler,
        viewport,
        visibility,
        env,
    })
}

#[test]
fn scroll_drives_spy_and_parallax() -> Result<()> {
    let s = scene(&GlideConfig::default())?;

    let tops = [0.0, 500.0, 1000.0];
    let sections: Vec<Arc<MemoryElement>> = tops
        .iter()
        .map(|&top| Arc::new(MemoryElement::at(top).in_viewport(&s.viewport)))
        .collect();
    let nav: Vec<Arc<MemoryElement>> = (0..3).map(|_| Arc::new(MemoryElement::new())).collect();
    let spy = s.env.spy(
        sections.iter().map(|e| e.clone() as Arc<dyn LayoutBox>).collect(),
        nav.iter().map(|e| e.clone() as Arc<dyn StyleSink>).collect(),
        None,
    );

    let hero = Arc::new(MemoryElement::new());
    let parallax = s.env.parallax(hero.clone(), None, None);

    let done = s.env.to(
        550.0,
        ScrollOptions::new().with_duration(200.0).with_easing(Easing::Linear),
    )?;

    // Every animation frame writes the position, which notifies the spy
    // synchronously and schedules at most one parallax recomputation.
    let frames = s.scheduler.run_until_idle(16.0, 100);
    assert!(frames >= 13);
    assert!(done.is_resolved());
    assert_eq!(s.viewport.scroll_position(), 550.0);

    assert_eq!(spy.active_index(), Some(1));
    assert!(nav[1].has_class("active"));
    assert!(!nav[0].has_class("active"));
    assert_eq!(hero.style("transform").as_deref(), Some("translateY(275px)"));
    assert!(parallax.recomputations() <= frames as u64);

    spy.destroy();
    parallax.destroy();
    assert_eq!(s.viewport.listener_count(), 0);
    assert_eq!(hero.style("transform"), None);
    Ok(())
}

#[test]
fn queued_scrolls_run_back_to_back() -> Result<()> {
    let mut config = GlideConfig::default();
    config.scroll.busy_policy = BusyPolicy::Queue;
    let s = scene(&config)?;

    let animator = s.env.scroll_animator();
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut completions = Vec::new();
    for target in [300.0, 900.0, 100.0] {
        let order = Arc::clone(&order);
        completions.push(animator.scroll_to(
            target,
            ScrollOptions::new()
                .with_duration(50.0)
                .on_complete(move || order.lock().unwrap().push(target)),
        )?);
    }
    assert_eq!(animator.queued(), 2);

    s.scheduler.run_until_idle(10.0, 100);
    assert_eq!(*order.lock().unwrap(), vec![300.0, 900.0, 100.0]);
    assert!(completions.iter().all(|c| c.is_resolved()));
    assert_eq!(s.viewport.scroll_position(), 100.0);
    assert!(!animator.is_active());
    Ok(())
}

#[test]
fn reveal_on_visibility() -> Result<()> {
    let s = scene(&GlideConfig::default())?;
    let card = Arc::new(MemoryElement::new());
    let reveals = Arc::new(AtomicUsize::new(0));

    let target = Arc::clone(&card);
    let counter = Arc::clone(&reveals);
    let trigger = s.env.trigger(
        &*card,
        move |entry: &VisibilityEntry| {
            if entry.is_intersecting {
                target.add_class("visible");
                counter.fetch_add(1, Ordering::SeqCst);
            }
        },
        ObserverOptions::default().with_threshold(0.25),
    );

    let entry = |visible: bool| VisibilityEntry {
        target: card.id(),
        is_intersecting: visible,
        intersection_ratio: if visible { 0.5 } else { 0.0 },
        time: 0.0,
    };
    s.visibility.emit(vec![entry(false), entry(true)]);
    assert!(card.has_class("visible"));
    assert_eq!(reveals.load(Ordering::SeqCst), 1);

    drop(trigger);
    s.visibility.emit(vec![entry(true)]);
    assert_eq!(reveals.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn chained_opacity_transitions_take_both_durations() -> Result<()> {
    let s = scene(&GlideConfig::default())?;
    let card = Arc::new(MemoryElement::new());
    let manager = s.env.transitions(card.clone());

    // Simulate a style surface that reports the end of each transition
    // once its duration has passed.
    let ended = Arc::clone(&card);
    let reporter = tokio::spawn(async move {
        for _ in 0..2 {
            tokio::time::sleep(Duration::from_millis(300)).await;
            ended.fire_transition_end("opacity");
        }
    });

    let start = Instant::now();
    let out = manager.animate("opacity", "0", TransitionOptions::new());
    let back = manager.animate("opacity", "1", TransitionOptions::new());
    out.await;
    back.await;

    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(600) && elapsed < Duration::from_millis(610),
        "took {:?}",
        elapsed
    );
    assert_eq!(card.style("opacity").as_deref(), Some("1"));
    assert_eq!(card.transition_listener_count(), 0);
    reporter.await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn fallback_grace_comes_from_config() -> Result<()> {
    let mut config = GlideConfig::default();
    config.transition.fallback_grace_ms = 20.0;
    let s = scene(&config)?;
    let card = Arc::new(MemoryElement::new());

    let start = Instant::now();
    s.env.fade_in(card.clone(), Some(100.0)).await;
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(120) && elapsed < Duration::from_millis(130),
        "took {:?}",
        elapsed
    );
    Ok(())
}

#[test]
fn env_overrides_reach_the_engine() -> Result<()> {
    let mut config = GlideConfig::default();
    config.merge_with_vars(|key| match key {
        "GLIDE_SCROLL_EASING" => Some("linear".to_string()),
        "GLIDE_SCROLL_DURATION" => Some("100".to_string()),
        _ => None,
    });
    let s = scene(&config)?;

    s.env.to(1000.0, ScrollOptions::new())?;
    s.scheduler.run_frame(50.0);
    assert_eq!(s.viewport.scroll_position(), 500.0);
    Ok(())
}

// Host-side tests for the particle subsystems.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod engine {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod particles {
        include!("../src/core/particles.rs");
    }
}

use engine::constants::*;
use engine::particles::{hex_to_rgba, ParticleSet, SpawnPolicy, Theme, Viewport};

fn viewport() -> Viewport {
    Viewport {
        width: 800.0,
        height: 600.0,
    }
}

fn normal_policy() -> SpawnPolicy {
    SpawnPolicy {
        reduced_motion: false,
        guard_engaged: false,
        governor_cap: 1000,
    }
}

#[test]
fn hex_to_rgba_supports_six_digit_form() {
    assert_eq!(
        hex_to_rgba("#9bb0ff", 0.5).as_deref(),
        Some("rgba(155,176,255,0.5)")
    );
}

#[test]
fn hex_to_rgba_supports_three_digit_form() {
    assert_eq!(
        hex_to_rgba("#fc6", 1.0).as_deref(),
        Some("rgba(255,204,102,1)")
    );
    assert_eq!(hex_to_rgba("fff", 1.0).as_deref(), Some("rgba(255,255,255,1)"));
}

#[test]
fn hex_to_rgba_clamps_alpha() {
    assert_eq!(hex_to_rgba("#000", 2.5).as_deref(), Some("rgba(0,0,0,1)"));
    assert_eq!(hex_to_rgba("#000", -3.0).as_deref(), Some("rgba(0,0,0,0)"));
}

#[test]
fn hex_to_rgba_rejects_malformed_input() {
    assert_eq!(hex_to_rgba("#12345", 1.0), None);
    assert_eq!(hex_to_rgba("#zzzzzz", 1.0), None);
    assert_eq!(hex_to_rgba("", 1.0), None);
}

#[test]
fn leaf_spawn_is_time_gated() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    let policy = normal_policy();

    set.spawn_forest(0.0, &policy, &vp);
    assert_eq!(set.leaves().len(), 1);

    // inside the spawn window: population below cap but no new leaf
    set.spawn_forest(LEAF_SPAWN_INTERVAL_MS - 1.0, &policy, &vp);
    assert_eq!(set.leaves().len(), 1);

    set.spawn_forest(LEAF_SPAWN_INTERVAL_MS, &policy, &vp);
    assert_eq!(set.leaves().len(), 2);
}

#[test]
fn leaf_population_never_exceeds_cap() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    let policy = normal_policy();

    let mut now = 0.0;
    for _ in 0..30 {
        set.spawn_forest(now, &policy, &vp);
        assert!(set.leaves().len() <= LEAF_CAP);
        now += LEAF_SPAWN_INTERVAL_MS;
    }
    assert_eq!(set.leaves().len(), LEAF_CAP);
}

#[test]
fn reduced_motion_widens_leaf_spawn_window() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    let policy = SpawnPolicy {
        reduced_motion: true,
        ..normal_policy()
    };

    set.spawn_forest(0.0, &policy, &vp);
    set.spawn_forest(LEAF_SPAWN_INTERVAL_MS, &policy, &vp);
    assert_eq!(set.leaves().len(), 1);
    set.spawn_forest(LEAF_SPAWN_INTERVAL_REDUCED_MS, &policy, &vp);
    assert_eq!(set.leaves().len(), 2);

    let mut now = 0.0;
    for _ in 0..30 {
        set.spawn_forest(now, &policy, &vp);
        now += LEAF_SPAWN_INTERVAL_REDUCED_MS;
    }
    assert_eq!(set.leaves().len(), LEAF_CAP_REDUCED);
}

#[test]
fn engaged_guard_suppresses_spawns_without_truncating() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    let policy = normal_policy();

    let mut now = 0.0;
    while set.leaves().len() < LEAF_CAP {
        set.spawn_forest(now, &policy, &vp);
        now += LEAF_SPAWN_INTERVAL_MS;
    }

    // cap shrinks to 3 under guard, but the 6 live leaves stay
    let guarded = SpawnPolicy {
        guard_engaged: true,
        ..normal_policy()
    };
    for _ in 0..10 {
        set.spawn_forest(now, &guarded, &vp);
        now += LEAF_SPAWN_INTERVAL_MS;
    }
    assert_eq!(set.leaves().len(), LEAF_CAP);
}

#[test]
fn ocean_fills_to_cap_without_time_gate() {
    let mut set = ParticleSet::new(Theme::Ocean, 7);
    let vp = viewport();

    set.spawn_ocean(&normal_policy(), &vp);
    assert_eq!(set.specks().len(), SPECK_CAP);

    let reduced = SpawnPolicy {
        reduced_motion: true,
        ..normal_policy()
    };
    let mut small = ParticleSet::new(Theme::Ocean, 7);
    small.spawn_ocean(&reduced, &vp);
    assert_eq!(small.specks().len(), SPECK_CAP_REDUCED);
}

#[test]
fn ocean_honors_governor_cap() {
    let mut set = ParticleSet::new(Theme::Ocean, 7);
    let policy = SpawnPolicy {
        governor_cap: 10,
        ..normal_policy()
    };
    set.spawn_ocean(&policy, &viewport());
    assert_eq!(set.specks().len(), 10);
}

#[test]
fn cosmic_fills_to_cap_with_palette_colors() {
    let mut set = ParticleSet::new(Theme::Cosmic, 7);
    set.spawn_cosmic(&normal_policy(), &viewport());
    assert_eq!(set.stars().len(), STAR_CAP);
    set.stars().for_each(|star| {
        assert!(star.color.starts_with("rgba("), "color {:?}", star.color);
    });

    let reduced = SpawnPolicy {
        reduced_motion: true,
        ..normal_policy()
    };
    let mut small = ParticleSet::new(Theme::Cosmic, 7);
    small.spawn_cosmic(&reduced, &viewport());
    assert_eq!(small.stars().len(), STAR_CAP_REDUCED);
}

#[test]
fn void_theme_spawns_nothing() {
    let mut set = ParticleSet::new(Theme::Void, 7);
    let vp = viewport();
    let policy = normal_policy();

    for i in 0..10 {
        set.spawn_forest(i as f64 * LEAF_SPAWN_INTERVAL_MS, &policy, &vp);
        set.spawn_ocean(&policy, &vp);
        set.spawn_cosmic(&policy, &vp);
    }
    assert!(set.leaves().is_empty());
    assert!(set.fireflies().is_empty());
    assert!(set.specks().is_empty());
    assert!(set.stars().is_empty());
}

#[test]
fn spawn_for_inactive_theme_is_a_noop() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    set.spawn_ocean(&normal_policy(), &viewport());
    set.spawn_cosmic(&normal_policy(), &viewport());
    assert!(set.specks().is_empty());
    assert!(set.stars().is_empty());
}

#[test]
fn theme_change_clears_collections() {
    let mut set = ParticleSet::new(Theme::Cosmic, 7);
    set.spawn_cosmic(&normal_policy(), &viewport());
    assert!(!set.stars().is_empty());

    set.set_theme(Theme::Ocean);
    assert!(set.stars().is_empty());
    assert_eq!(set.theme(), Theme::Ocean);
}

#[test]
fn reset_all_clears_entities_and_leaf_timer() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    let policy = normal_policy();

    set.spawn_forest(0.0, &policy, &vp);
    assert_eq!(set.leaves().len(), 1);

    set.reset_all();
    assert!(set.leaves().is_empty());
    assert!(set.fireflies().is_empty());

    // spawn timer cleared: a leaf may appear immediately after reset
    set.spawn_forest(1.0, &policy, &vp);
    assert_eq!(set.leaves().len(), 1);
}

#[test]
fn step_advances_independent_motion() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    let vp = viewport();
    set.spawn_forest(0.0, &normal_policy(), &vp);

    let mut y_before = 0.0;
    set.leaves().for_each(|leaf| y_before = leaf.pos.y);
    set.step(1.0, &vp);
    let mut y_after = 0.0;
    set.leaves().for_each(|leaf| y_after = leaf.pos.y);
    assert!(y_after > y_before, "leaf did not fall: {y_before} -> {y_after}");
}

#[test]
fn firefly_population_respects_its_cap() {
    let mut set = ParticleSet::new(Theme::Forest, 7);
    set.spawn_forest(0.0, &normal_policy(), &viewport());
    assert_eq!(set.fireflies().len(), FIREFLY_CAP);

    let reduced = SpawnPolicy {
        reduced_motion: true,
        ..normal_policy()
    };
    let mut small = ParticleSet::new(Theme::Forest, 7);
    small.spawn_forest(0.0, &reduced, &viewport());
    assert_eq!(small.fireflies().len(), FIREFLY_CAP_REDUCED);
}

use super::constants::*;
use glam::Vec2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Visual theme for the Zen backdrop. Each theme owns an independent entity
/// collection; `Void` renders nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Forest,
    Ocean,
    Cosmic,
    Void,
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Inputs a spawn decision depends on. `governor_cap` comes from
/// `FrameGovernor::effective_cap`; `guard_engaged` is the throttle flag
/// (or explicit low-power mode), which the forest theme maps to its own
/// tighter leaf cap.
#[derive(Clone, Copy, Debug)]
pub struct SpawnPolicy {
    pub reduced_motion: bool,
    pub guard_engaged: bool,
    pub governor_cap: usize,
}

#[derive(Clone, Debug)]
pub struct Leaf {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub alpha: f32,
    pub fade_per_sec: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

#[derive(Clone, Debug)]
pub struct DriftSpeck {
    pub base: Vec2,
    pub drift_per_sec: f32,
    pub osc_amplitude: f32,
    pub osc_phase: f32,
    pub osc_speed: f32,
    pub alpha: f32,
    pub radius: f32,
}

impl DriftSpeck {
    /// Horizontal oscillation around the base column.
    pub fn x(&self) -> f32 {
        self.base.x + self.osc_amplitude * self.osc_phase.sin()
    }
}

#[derive(Clone, Debug)]
pub struct Star {
    pub pos: Vec2,
    pub radius: f32,
    pub color: String,
    pub twinkle_phase: f32,
    pub twinkle_speed: f32,
    pub twinkle_amplitude: f32,
    pub base_alpha: f32,
}

impl Star {
    pub fn current_alpha(&self) -> f32 {
        (self.base_alpha + self.twinkle_amplitude * self.twinkle_phase.sin()).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Firefly {
    pub pos: Vec2,
    pub vel: Vec2,
    pub glow_phase: f32,
    pub glow_speed: f32,
    pub radius: f32,
}

impl Firefly {
    pub fn current_alpha(&self) -> f32 {
        0.25 + 0.55 * (0.5 + 0.5 * self.glow_phase.sin())
    }
}

/// Owned mutable entity buffer. Only `spawn`, `cull` and iteration are
/// exposed so raw arrays never cross component boundaries.
#[derive(Debug)]
pub struct EntityBuffer<T> {
    entities: Vec<T>,
}

impl<T> Default for EntityBuffer<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
        }
    }
}

impl<T> EntityBuffer<T> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn spawn(&mut self, entity: T) {
        self.entities.push(entity);
    }

    pub fn cull(&mut self, keep: impl FnMut(&T) -> bool) {
        self.entities.retain(keep);
    }

    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.entities.iter().for_each(f);
    }

    pub fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.entities.iter_mut().for_each(f);
    }

    fn clear(&mut self) {
        self.entities.clear();
    }
}

/// Per-theme procedural particle generators.
///
/// Spawn policies never truncate live entities when a cap shrinks; a tighter
/// cap only suppresses future spawns, so an engaged guard drains populations
/// through normal culling instead of visually popping entities away.
pub struct ParticleSet {
    theme: Theme,
    rng: StdRng,
    leaves: EntityBuffer<Leaf>,
    fireflies: EntityBuffer<Firefly>,
    specks: EntityBuffer<DriftSpeck>,
    stars: EntityBuffer<Star>,
    last_leaf_spawn_ms: Option<f64>,
}

impl ParticleSet {
    pub fn new(theme: Theme, seed: u64) -> Self {
        // Mix the base seed so sibling subsystems seeded from the same
        // value stay decorrelated.
        let mix = seed ^ 0x9E37_79B9_7F4A_7C15u64;
        Self {
            theme,
            rng: StdRng::seed_from_u64(mix),
            leaves: EntityBuffer::default(),
            fireflies: EntityBuffer::default(),
            specks: EntityBuffer::default(),
            stars: EntityBuffer::default(),
            last_leaf_spawn_ms: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch themes, clearing every collection so the new theme starts from
    /// an empty field.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.reset_all();
        }
    }

    pub fn leaves(&self) -> &EntityBuffer<Leaf> {
        &self.leaves
    }

    pub fn leaves_mut(&mut self) -> &mut EntityBuffer<Leaf> {
        &mut self.leaves
    }

    pub fn fireflies(&self) -> &EntityBuffer<Firefly> {
        &self.fireflies
    }

    pub fn fireflies_mut(&mut self) -> &mut EntityBuffer<Firefly> {
        &mut self.fireflies
    }

    pub fn specks(&self) -> &EntityBuffer<DriftSpeck> {
        &self.specks
    }

    pub fn specks_mut(&mut self) -> &mut EntityBuffer<DriftSpeck> {
        &mut self.specks
    }

    pub fn stars(&self) -> &EntityBuffer<Star> {
        &self.stars
    }

    pub fn stars_mut(&mut self) -> &mut EntityBuffer<Star> {
        &mut self.stars
    }

    /// Forest spawns are time-gated: a new leaf appears only when the
    /// population is below the cap AND a full spawn window has elapsed since
    /// the last spawn. Fireflies are capacity-gated ambient glow.
    pub fn spawn_forest(&mut self, now_ms: f64, policy: &SpawnPolicy, vp: &Viewport) {
        if self.theme != Theme::Forest {
            return;
        }
        let leaf_cap = if policy.guard_engaged {
            LEAF_CAP_GUARDED
        } else if policy.reduced_motion {
            LEAF_CAP_REDUCED
        } else {
            LEAF_CAP
        };
        let interval = if policy.reduced_motion {
            LEAF_SPAWN_INTERVAL_REDUCED_MS
        } else {
            LEAF_SPAWN_INTERVAL_MS
        };
        let window_elapsed = match self.last_leaf_spawn_ms {
            Some(last) => now_ms - last >= interval,
            None => true,
        };
        if self.leaves.len() < leaf_cap && window_elapsed {
            let leaf = Leaf {
                pos: Vec2::new(self.rng.gen_range(0.0..vp.width.max(1.0)), -20.0),
                vel: Vec2::new(self.rng.gen_range(-15.0..15.0), self.rng.gen_range(18.0..48.0)),
                size: self.rng.gen_range(8.0..16.0),
                alpha: self.rng.gen_range(0.5..0.9),
                fade_per_sec: self.rng.gen_range(0.01..0.04),
                rotation: self.rng.gen_range(0.0..std::f32::consts::TAU),
                rotation_speed: self.rng.gen_range(-1.0..1.0),
            };
            self.leaves.spawn(leaf);
            self.last_leaf_spawn_ms = Some(now_ms);
        }

        let firefly_cap = if policy.reduced_motion {
            FIREFLY_CAP_REDUCED
        } else {
            FIREFLY_CAP
        }
        .min(policy.governor_cap);
        while self.fireflies.len() < firefly_cap {
            let firefly = Firefly {
                pos: Vec2::new(
                    self.rng.gen_range(0.0..vp.width.max(1.0)),
                    self.rng.gen_range(0.0..vp.height.max(1.0)),
                ),
                vel: Vec2::new(self.rng.gen_range(-8.0..8.0), self.rng.gen_range(-6.0..6.0)),
                glow_phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
                glow_speed: self.rng.gen_range(1.0..3.0),
                radius: self.rng.gen_range(1.0..2.5),
            };
            self.fireflies.spawn(firefly);
        }
    }

    /// Ocean spawns are capacity-gated: fill up to the cap every call, no
    /// time gate.
    pub fn spawn_ocean(&mut self, policy: &SpawnPolicy, vp: &Viewport) {
        if self.theme != Theme::Ocean {
            return;
        }
        let cap = if policy.reduced_motion {
            SPECK_CAP_REDUCED
        } else {
            SPECK_CAP
        }
        .min(policy.governor_cap);
        while self.specks.len() < cap {
            let speck = DriftSpeck {
                base: Vec2::new(
                    self.rng.gen_range(0.0..vp.width.max(1.0)),
                    self.rng.gen_range(0.0..vp.height.max(1.0)),
                ),
                drift_per_sec: self.rng.gen_range(4.0..14.0),
                osc_amplitude: self.rng.gen_range(5.0..20.0),
                osc_phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
                osc_speed: self.rng.gen_range(0.4..1.2),
                alpha: self.rng.gen_range(0.1..0.4),
                radius: self.rng.gen_range(1.0..3.0),
            };
            self.specks.spawn(speck);
        }
    }

    /// Cosmic spawns are capacity-gated with a per-entity palette color.
    pub fn spawn_cosmic(&mut self, policy: &SpawnPolicy, vp: &Viewport) {
        if self.theme != Theme::Cosmic {
            return;
        }
        let cap = if policy.reduced_motion {
            STAR_CAP_REDUCED
        } else {
            STAR_CAP
        }
        .min(policy.governor_cap);
        while self.stars.len() < cap {
            let hex = STAR_PALETTE[self.rng.gen_range(0..STAR_PALETTE.len())];
            let color = hex_to_rgba(hex, STAR_ALPHA).unwrap_or_else(|| {
                log::warn!("[particles] bad palette entry {hex:?}");
                "rgba(255,255,255,0.85)".to_string()
            });
            let star = Star {
                pos: Vec2::new(
                    self.rng.gen_range(0.0..vp.width.max(1.0)),
                    self.rng.gen_range(0.0..vp.height.max(1.0)),
                ),
                radius: self.rng.gen_range(0.5..1.8),
                color,
                twinkle_phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
                twinkle_speed: self.rng.gen_range(0.5..2.5),
                twinkle_amplitude: self.rng.gen_range(0.1..0.35),
                base_alpha: self.rng.gen_range(0.4..0.8),
            };
            self.stars.spawn(star);
        }
    }

    /// Advance every live entity by `dt_sec`. Independent random walks only;
    /// entities never interact. Culling off-screen or fully faded entities is
    /// the renderer's job, this layer just keeps the data shapes it needs.
    pub fn step(&mut self, dt_sec: f32, vp: &Viewport) {
        self.leaves.for_each_mut(|leaf| {
            leaf.pos += leaf.vel * dt_sec;
            leaf.rotation += leaf.rotation_speed * dt_sec;
            leaf.alpha = (leaf.alpha - leaf.fade_per_sec * dt_sec).max(0.0);
        });
        self.fireflies.for_each_mut(|fly| {
            fly.pos += fly.vel * dt_sec;
            fly.glow_phase += fly.glow_speed * dt_sec;
            // wrap inside the viewport so the glow never strands off-screen
            if fly.pos.x < 0.0 {
                fly.pos.x += vp.width;
            } else if fly.pos.x > vp.width {
                fly.pos.x -= vp.width;
            }
            if fly.pos.y < 0.0 {
                fly.pos.y += vp.height;
            } else if fly.pos.y > vp.height {
                fly.pos.y -= vp.height;
            }
        });
        self.specks.for_each_mut(|speck| {
            speck.base.y -= speck.drift_per_sec * dt_sec;
            speck.osc_phase += speck.osc_speed * dt_sec;
        });
        self.stars.for_each_mut(|star| {
            star.twinkle_phase += star.twinkle_speed * dt_sec;
        });
    }

    /// Clear every theme's collection and the leaf spawn timer. Called on
    /// theme change or session reset.
    pub fn reset_all(&mut self) {
        self.leaves.clear();
        self.fireflies.clear();
        self.specks.clear();
        self.stars.clear();
        self.last_leaf_spawn_ms = None;
    }
}

/// Convert `#rgb` or `#rrggbb` to a CSS `rgba(...)` string, clamping the
/// alpha to [0, 1]. Returns `None` for malformed input.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> Option<String> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let (r, g, b) = match digits.len() {
        3 => {
            let mut chars = digits.chars();
            let mut next = || {
                let c = chars.next()?;
                let v = c.to_digit(16)? as u8;
                Some(v * 16 + v)
            };
            (next()?, next()?, next()?)
        }
        6 => (
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    let a = alpha.clamp(0.0, 1.0);
    Some(format!("rgba({r},{g},{b},{a})"))
}

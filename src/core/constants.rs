// Engine tuning constants shared by the core subsystems and the web frontend.

// Frame governor
pub const FRAME_WINDOW_CAPACITY: usize = 120; // sliding sample window size
pub const MIN_SAMPLES_FOR_RATE: usize = 31; // below this the rate is the default
pub const DEFAULT_FPS: f64 = 60.0;
pub const THROTTLE_ENGAGE_FPS: f64 = 55.0;
pub const THROTTLE_RELEASE_FPS: f64 = 58.0; // hysteresis: dead band is [55, 58)
pub const THROTTLED_ENTITY_CAP: usize = 80;

// Forest theme
pub const LEAF_CAP: usize = 6;
pub const LEAF_CAP_REDUCED: usize = 4;
pub const LEAF_CAP_GUARDED: usize = 3;
pub const LEAF_SPAWN_INTERVAL_MS: f64 = 8000.0;
pub const LEAF_SPAWN_INTERVAL_REDUCED_MS: f64 = 12000.0;
pub const FIREFLY_CAP: usize = 12;
pub const FIREFLY_CAP_REDUCED: usize = 6;

// Ocean theme
pub const SPECK_CAP: usize = 25;
pub const SPECK_CAP_REDUCED: usize = 15;

// Cosmic theme
pub const STAR_CAP: usize = 120;
pub const STAR_CAP_REDUCED: usize = 80;
pub const STAR_PALETTE: &[&str] = &["#9bb0ff", "#cad7ff", "#fff4ea", "#ffd2a1", "#fc6"];
pub const STAR_ALPHA: f32 = 0.85;

// Typing session
pub const GHOST_RETENTION_MS: f64 = 5.0 * 60.0 * 1000.0;
pub const STATS_EMIT_INTERVAL_MS: f64 = 1000.0;

// Draft archive
pub const DRAFT_RING_CAPACITY: usize = 50;

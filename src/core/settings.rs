use super::bus::{Signal, SignalBus};
use super::particles::Theme;
use super::session::Mode;
use super::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

pub const SETTINGS_KEY: &str = "zentype.settings";

/// Which metric the stats bar displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsMetric {
    Wpm,
    Words,
    Chars,
}

/// Named bundle of settings values applied atomically as a single patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Focus,
    Ambient,
    Minimal,
}

/// The single authoritative user-preferences record. Flat on purpose: every
/// mutation is a partial patch merged into the previous full record, and the
/// merged record replaces storage and is broadcast whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub mode: Mode,
    pub reduced_motion: bool,
    pub low_power: bool,
    pub max_particles: usize,
    pub stats_metric: StatsMetric,
    pub show_stats_bar: bool,
    pub ghost_recovery_enabled: bool,
    pub sound_enabled: bool,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Forest,
            mode: Mode::Zen,
            reduced_motion: false,
            low_power: false,
            max_particles: 120,
            stats_metric: StatsMetric::Wpm,
            show_stats_bar: true,
            ghost_recovery_enabled: true,
            sound_enabled: false,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

/// Partial update. Absent keys mean "unchanged", never "reset to default".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_particles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_metric: Option<StatsMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_stats_bar: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghost_recovery_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f32>,
    /// Profile selection expands into its dependent keys before the patch is
    /// merged, persisted or broadcast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl SettingsPatch {
    fn merge_into(&self, settings: &mut Settings) {
        if let Some(v) = self.theme {
            settings.theme = v;
        }
        if let Some(v) = self.mode {
            settings.mode = v;
        }
        if let Some(v) = self.reduced_motion {
            settings.reduced_motion = v;
        }
        if let Some(v) = self.low_power {
            settings.low_power = v;
        }
        if let Some(v) = self.max_particles {
            settings.max_particles = v;
        }
        if let Some(v) = self.stats_metric {
            settings.stats_metric = v;
        }
        if let Some(v) = self.show_stats_bar {
            settings.show_stats_bar = v;
        }
        if let Some(v) = self.ghost_recovery_enabled {
            settings.ghost_recovery_enabled = v;
        }
        if let Some(v) = self.sound_enabled {
            settings.sound_enabled = v;
        }
        if let Some(v) = self.high_contrast {
            settings.high_contrast = v;
        }
        if let Some(v) = self.font_scale {
            settings.font_scale = v;
        }
    }
}

/// Expand a profile into its dependent keys. Explicit keys in the same patch
/// win over the profile's bundle.
fn expand_profile(profile: Profile, patch: &mut SettingsPatch) {
    let (theme, show_stats_bar, reduced_motion, sound_enabled) = match profile {
        Profile::Focus => (Theme::Void, false, false, false),
        Profile::Ambient => (Theme::Forest, true, false, true),
        Profile::Minimal => (Theme::Void, false, true, false),
    };
    patch.theme.get_or_insert(theme);
    patch.show_stats_bar.get_or_insert(show_stats_bar);
    patch.reduced_motion.get_or_insert(reduced_motion);
    patch.sound_enabled.get_or_insert(sound_enabled);
}

/// Single-writer, multi-reader settings store with guaranteed fan-out.
///
/// Display surfaces read the persisted record once on mount, then subscribe
/// to `SignalKind::SettingsChanged` for the rest of their lifetime. Polling
/// is disallowed, push only.
pub struct SettingsStore {
    store: Box<dyn KeyValueStore>,
    bus: Rc<RefCell<SignalBus>>,
    current: Settings,
}

impl SettingsStore {
    /// Load the persisted record, falling back to defaults on missing or
    /// malformed JSON. Neither case is a user-facing failure.
    pub fn load(store: Box<dyn KeyValueStore>, bus: Rc<RefCell<SignalBus>>) -> Self {
        let current = match store.get(SETTINGS_KEY) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!("[settings] malformed record, using defaults: {err}");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };
        Self {
            store,
            bus,
            current,
        }
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Merge `patch` into the last-known full record, persist the merged
    /// record and broadcast it whole (unless suppressed). Always constructs
    /// a new record; the previous snapshot is never mutated in place.
    pub fn apply_patch(&mut self, mut patch: SettingsPatch, broadcast: bool) -> Settings {
        if let Some(profile) = patch.profile.take() {
            expand_profile(profile, &mut patch);
        }

        let mut next = self.current.clone();
        patch.merge_into(&mut next);

        match serde_json::to_string(&next) {
            Ok(json) => {
                if let Err(err) = self.store.set(SETTINGS_KEY, &json) {
                    log::warn!("[settings] persist failed, staying in memory: {err}");
                }
            }
            Err(err) => log::warn!("[settings] encode failed: {err}"),
        }

        let prev = std::mem::replace(&mut self.current, next.clone());
        if broadcast {
            let bus = self.bus.borrow();
            bus.publish(&Signal::SettingsChanged(next.clone()));
            if prev.theme != next.theme {
                bus.publish(&Signal::ThemeChanged(next.theme));
            }
            if prev.show_stats_bar != next.show_stats_bar {
                bus.publish(&Signal::StatsBarToggled(next.show_stats_bar));
            }
        }
        next
    }
}

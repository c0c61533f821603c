pub mod bus;
pub mod constants;
pub mod drafts;
pub mod governor;
pub mod particles;
pub mod session;
pub mod settings;
pub mod store;

pub use bus::{Signal, SignalBus, SignalKind};
pub use drafts::{ArchiveEntry, DraftArchive, DraftSnapshot};
pub use governor::FrameGovernor;
pub use particles::{ParticleSet, SpawnPolicy, Theme, Viewport};
pub use session::{Mode, SessionEngine, StatsSnapshot};
pub use settings::{Settings, SettingsPatch, SettingsStore, StatsMetric};
pub use store::{BackoffPolicy, CoreError, KeyValueStore, MemoryStore};

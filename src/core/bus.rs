use super::particles::Theme;
use super::session::StatsSnapshot;
use super::settings::Settings;
use fnv::FnvHashMap;
use smallvec::SmallVec;

/// Closed registry of broadcast signals. Payload shape is fixed per variant;
/// publishers can never omit fields and subscribers get compile-time
/// checking instead of ad hoc string-keyed events.
#[derive(Clone, Debug)]
pub enum Signal {
    /// Carries the full merged settings record, never just the patch, so
    /// late or stateless subscribers can self-initialize from one message.
    SettingsChanged(Settings),
    TypingStats(StatsSnapshot),
    ThemeChanged(Theme),
    StatsBarToggled(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    SettingsChanged,
    TypingStats,
    ThemeChanged,
    StatsBarToggled,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::SettingsChanged(_) => SignalKind::SettingsChanged,
            Signal::TypingStats(_) => SignalKind::TypingStats,
            Signal::ThemeChanged(_) => SignalKind::ThemeChanged,
            Signal::StatsBarToggled(_) => SignalKind::StatsBarToggled,
        }
    }
}

type Subscriber = Box<dyn Fn(&Signal)>;

/// Fire-and-forget fan-out bus decoupling producers (session engine,
/// settings store) from display surfaces. Single-threaded cooperative; a
/// subscriber only ever observes a complete snapshot, never a half-updated
/// one.
#[derive(Default)]
pub struct SignalBus {
    subscribers: FnvHashMap<SignalKind, SmallVec<[Subscriber; 2]>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: SignalKind, f: impl Fn(&Signal) + 'static) {
        self.subscribers.entry(kind).or_default().push(Box::new(f));
    }

    pub fn publish(&self, signal: &Signal) {
        if let Some(subs) = self.subscribers.get(&signal.kind()) {
            for sub in subs {
                sub(signal);
            }
        }
    }

    pub fn subscriber_count(&self, kind: SignalKind) -> usize {
        self.subscribers.get(&kind).map_or(0, |s| s.len())
    }
}

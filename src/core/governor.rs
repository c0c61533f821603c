use super::constants::*;
use std::collections::VecDeque;

/// Observes real paint cadence and degrades visual density on slow devices.
///
/// The governor is purely advisory: it never touches entity collections
/// itself. Callers ask for [`FrameGovernor::effective_cap`] when spawning and
/// are responsible for honoring it. Throttling uses hysteresis (engage below
/// 55 FPS, release at 58 or above) so a frame rate hovering near the
/// threshold does not flap the guard on and off every tick.
#[derive(Debug, Default)]
pub struct FrameGovernor {
    samples: VecDeque<f64>,
    throttled: bool,
}

impl FrameGovernor {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(FRAME_WINDOW_CAPACITY),
            throttled: false,
        }
    }

    /// Record one frame timestamp (milliseconds) and re-evaluate the guard.
    pub fn sample(&mut self, now_ms: f64) {
        if self.samples.len() == FRAME_WINDOW_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(now_ms);

        let fps = self.average_fps();
        if !self.throttled && fps < THROTTLE_ENGAGE_FPS {
            self.throttled = true;
            log::debug!("[governor] throttle engaged at {:.1} fps", fps);
        } else if self.throttled && fps >= THROTTLE_RELEASE_FPS {
            self.throttled = false;
            log::debug!("[governor] throttle released at {:.1} fps", fps);
        }
    }

    /// Average frame rate over the sample window.
    ///
    /// The first ~30 samples are not enough to judge cadence, so the default
    /// rate is reported until the window holds `MIN_SAMPLES_FOR_RATE`
    /// entries. The divisor is floored at 1 ms to guard against a zero span.
    pub fn average_fps(&self) -> f64 {
        if self.samples.len() < MIN_SAMPLES_FOR_RATE {
            return DEFAULT_FPS;
        }
        let first = self.samples.front().copied().unwrap_or(0.0);
        let last = self.samples.back().copied().unwrap_or(0.0);
        let span_ms = (last - first).max(1.0);
        (self.samples.len() - 1) as f64 * 1000.0 / span_ms
    }

    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// Entity budget after applying the guard.
    ///
    /// Explicitly requested low-power mode always caps, regardless of the
    /// measured rate.
    pub fn effective_cap(&self, configured_max: usize, low_power: bool) -> usize {
        if low_power || self.throttled {
            THROTTLED_ENTITY_CAP.min(configured_max)
        } else {
            configured_max
        }
    }

    /// Clear the sample window and un-throttle. Called on session restart.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.throttled = false;
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

use serde::{Deserialize, Serialize};

/// How the fall interval tightens over a game.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GravityCurve {
    pub initial_ms: u32,
    pub step_ms: u32,
    pub step_every_secs: u32,
    pub floor_ms: u32,
}

impl Default for GravityCurve {
    fn default() -> Self {
        Self {
            initial_ms: 1000,
            step_ms: 100,
            step_every_secs: 30,
            floor_ms: 200,
        }
    }
}

impl GravityCurve {
    pub fn interval_at(&self, elapsed_secs: u64) -> u32 {
        let steps = elapsed_secs / u64::from(self.step_every_secs.max(1));
        let drop = u64::from(self.step_ms).saturating_mul(steps);
        let floor = self.floor_ms.min(self.initial_ms);
        u64::from(self.initial_ms)
            .saturating_sub(drop)
            .max(u64::from(floor))
            .max(1) as u32
    }
}

/// Frame-driven gravity accumulator.
#[derive(Clone, Debug)]
pub struct FallTimer {
    curve: GravityCurve,
    interval_ms: u32,
    counter_ms: f64,
    last_frame_ms: Option<f64>,
}

impl FallTimer {
    pub fn new(curve: GravityCurve) -> Self {
        Self {
            curve,
            interval_ms: curve.interval_at(0),
            counter_ms: 0.0,
            last_frame_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Feeds a frame timestamp. Returns true when the piece should fall one row.
    /// The first frame only sets the baseline.
    pub fn on_frame(&mut self, time_ms: f64) -> bool {
        let delta = self.last_frame_ms.map_or(0.0, |last| (time_ms - last).max(0.0));
        self.last_frame_ms = Some(time_ms);
        self.counter_ms += delta;
        if self.counter_ms > f64::from(self.interval_ms) {
            self.counter_ms = 0.0;
            true
        } else {
            false
        }
    }

    /// Called after a manual drop so gravity does not fire right behind it.
    pub fn reset_counter(&mut self) {
        self.counter_ms = 0.0;
    }

    /// Re-derives the interval from whole elapsed seconds. Returns true if it changed.
    pub fn on_elapsed(&mut self, elapsed_secs: u64) -> bool {
        let next = self.curve.interval_at(elapsed_secs);
        let changed = next != self.interval_ms;
        self.interval_ms = next;
        changed
    }
}

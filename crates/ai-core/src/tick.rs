/// Per-tick input handed to every hook the controller invokes.
///
/// `dt_seconds` is the (possibly time-scaled) simulation delta. Absolute time
/// is owned by the controller's [`Clock`](crate::Clock), not by this struct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32) -> Self {
        Self { tick, dt_seconds }
    }

    /// Context for the tick following this one, with the same delta.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            dt_seconds: self.dt_seconds,
        }
    }

    /// Negative or non-finite deltas are treated as zero.
    pub fn clamped_dt(&self) -> f32 {
        if self.dt_seconds.is_finite() {
            self.dt_seconds.max(0.0)
        } else {
            0.0
        }
    }
}

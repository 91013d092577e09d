use setpace_domain::Time;

/// Interval at which the host should drive [`Countdown`]s via
/// [`WorkoutSession::tick`](crate::WorkoutSession::tick).
pub const TICK_INTERVAL_MS: i64 = 100;

/// A countdown advanced by an external clock.
///
/// The countdown holds no timer of its own. The host samples its clock and
/// reports elapsed milliseconds; all deadline logic is plain state.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    duration: Time,
    elapsed_ms: i64,
}

impl Countdown {
    #[must_use]
    pub fn new(duration: Time) -> Self {
        Self {
            duration,
            elapsed_ms: 0,
        }
    }

    pub fn advance(&mut self, delta_ms: i64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms.max(0));
    }

    /// Remaining time as a percentage, 100 down to 0.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let duration_ms = self.duration_ms();
        if duration_ms == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        (100.0 - self.elapsed_ms as f32 / duration_ms as f32 * 100.0).max(0.0)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms()
    }

    /// Remaining whole seconds, rounded up.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        let remaining_ms = u64::try_from(self.duration_ms() - self.elapsed_ms).unwrap_or(0);
        u32::try_from(remaining_ms.div_ceil(1000)).unwrap_or(0)
    }

    fn duration_ms(&self) -> i64 {
        i64::from(self.duration) * 1000
    }
}

/// Format a second count as a zero-padded `MM:SS` string.
#[must_use]
pub fn format_mm_ss(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

use time::Duration;

/// Remaining quantity at or below this is treated as fully filled.
pub const DEFAULT_FILL_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct RolloverConfig {
    /// UnconfirmedNew records older than this, relative to the supplied clock, are dropped.
    pub staleness: Duration,
    pub fill_epsilon: f64,
}

impl RolloverConfig {
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_fill_epsilon(mut self, fill_epsilon: f64) -> Self {
        self.fill_epsilon = fill_epsilon;
        self
    }
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            staleness: Duration::days(1),
            fill_epsilon: DEFAULT_FILL_EPSILON,
        }
    }
}

// ─── Installation Progress ───
// Observational sink passed into every long-running call.

use tracing::info;

/// Receives phase labels and fractional completion.
///
/// Implementations must not block or panic; progress never gates
/// control flow.
pub trait Progress: Send + Sync {
    /// A new phase started (e.g. "Installing Libraries").
    fn step(&self, label: &str);
    /// Completion of the current phase, in `[0, 1]`.
    fn update(&self, fraction: f32);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn step(&self, _label: &str) {}
    fn update(&self, _fraction: f32) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn step(&self, label: &str) {
        info!("{}", label);
    }

    fn update(&self, fraction: f32) {
        tracing::debug!("progress {:.0}%", fraction * 100.0);
    }
}

/// Adapts a pair of closures into a [`Progress`] sink.
pub struct CallbackProgress<S, U> {
    on_step: S,
    on_update: U,
}

impl<S, U> CallbackProgress<S, U>
where
    S: Fn(&str) + Send + Sync,
    U: Fn(f32) + Send + Sync,
{
    pub fn new(on_step: S, on_update: U) -> Self {
        Self { on_step, on_update }
    }
}

impl<S, U> Progress for CallbackProgress<S, U>
where
    S: Fn(&str) + Send + Sync,
    U: Fn(f32) + Send + Sync,
{
    fn step(&self, label: &str) {
        (self.on_step)(label)
    }

    fn update(&self, fraction: f32) {
        (self.on_update)(fraction.clamp(0.0, 1.0))
    }
}

/// `done / total` as a fraction; an empty phase counts as finished.
pub(crate) fn fraction(done: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        done as f32 / total as f32
    }
}

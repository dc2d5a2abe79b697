//! Tick callback that reports run progress through `tracing`.

use deckhand_core::{TickCallback, TickSummary, WorkContainer};
use tracing::{debug, info};

/// Logs every completed job, and a status line every `report_every` ticks.
pub struct ProgressCallback {
    report_every: u64,
    completed: u64,
}

impl ProgressCallback {
    /// Report status every `report_every` ticks (0 disables the status line).
    pub const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            completed: 0,
        }
    }

    /// Jobs completed so far.
    pub const fn completed(&self) -> u64 {
        self.completed
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, container: &WorkContainer) {
        for job in &summary.completed {
            self.completed = self.completed.saturating_add(1);
            info!(tick = summary.tick, %job, total = self.completed, "Job done");
        }
        for (agent, job) in &summary.detached {
            debug!(tick = summary.tick, %agent, %job, "Agent dropped job");
        }

        if self.report_every > 0 && summary.tick.is_multiple_of(self.report_every) {
            let busy = container.agents().iter().filter(|a| !a.is_idle()).count();
            info!(
                tick = summary.tick,
                elapsed = summary.elapsed,
                busy,
                crew = container.agents().len(),
                open_jobs = summary.open_jobs,
                "Status"
            );
        }
    }
}

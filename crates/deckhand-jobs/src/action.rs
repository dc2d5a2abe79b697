//! The terminal unit of work in a toil.

use crate::error::JobError;
use crate::toil::ToilFrame;

/// A stateful unit of work performed once all of a toil's requirements hold.
///
/// Actions keep their own progress between ticks (timers, claimed items,
/// requested paths). `work` is called at most once per tick.
pub trait Action<W, S> {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Advance the action by `dt` seconds. Returns `true` on the tick the
    /// action completes.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] only for invariant violations; "cannot make
    /// progress yet" is `Ok(false)`.
    fn work(
        &mut self,
        worker: &mut W,
        site: &mut S,
        frame: &ToilFrame,
        dt: f32,
    ) -> Result<bool, JobError>;

    /// Called when the worker abandons the job. Release anything held and
    /// reset transient progress.
    fn on_quit(&mut self, worker: &mut W, site: &mut S, frame: &ToilFrame) {
        let _ = (worker, site, frame);
    }
}

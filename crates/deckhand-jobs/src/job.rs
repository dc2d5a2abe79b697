//! Jobs: a root toil plus worker bookkeeping.
//!
//! A job has at most one worker. Assigning a second worker while one holds
//! the job is an invariant violation, as is quitting a job you do not hold.
//! Two ways of letting go exist:
//!
//! - [`Job::quit`] releases the worker and runs the toil-tree quit so every
//!   action can reset.
//! - [`Job::detach`] only clears the worker field. The agent loop uses it
//!   when a job stops qualifying mid-work, leaving action state in place.

use deckhand_types::{AgentId, JobId, TilePos};
use tracing::debug;

use crate::error::JobError;
use crate::requirement::Verdict;
use crate::toil::{Toil, ToilFrame};

/// Deepest executor nesting a job accepts.
pub const MAX_TOIL_DEPTH: usize = 32;

/// Anything that can hold a job.
pub trait Worker {
    /// Identity used for assignment checks.
    fn worker_id(&self) -> AgentId;
}

/// A unit of work at a position, resolved through its toil tree.
pub struct Job<W, S> {
    id: JobId,
    label: String,
    position: TilePos,
    root: Toil<W, S>,
    worker: Option<AgentId>,
    cancelled: bool,
}

impl<W: Worker, S> Job<W, S> {
    /// Create a job around `root`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::TooDeep`] if the toil tree nests more than
    /// [`MAX_TOIL_DEPTH`] levels.
    pub fn new(label: impl Into<String>, position: TilePos, root: Toil<W, S>) -> Result<Self, JobError> {
        let label = label.into();
        let depth = root.depth();
        if depth > MAX_TOIL_DEPTH {
            return Err(JobError::TooDeep {
                label,
                depth,
                limit: MAX_TOIL_DEPTH,
            });
        }
        Ok(Self {
            id: JobId::new(),
            label,
            position,
            root,
            worker: None,
            cancelled: false,
        })
    }

    /// Job identifier.
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Where the work happens.
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// The current worker.
    pub const fn worker(&self) -> Option<AgentId> {
        self.worker
    }

    /// Whether the job has been cancelled.
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The root toil.
    pub const fn root(&self) -> &Toil<W, S> {
        &self.root
    }

    /// Frame handed to the root toil.
    pub const fn frame(&self) -> ToilFrame {
        ToilFrame::new(self.id, self.position)
    }

    /// Give the job to `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::AlreadyAssigned`] if a worker already holds it.
    pub fn assign(&mut self, agent: AgentId) -> Result<(), JobError> {
        if let Some(worker) = self.worker {
            return Err(JobError::AlreadyAssigned {
                job: self.id,
                worker,
            });
        }
        self.worker = Some(agent);
        debug!(job = %self.id, %agent, label = self.label, "Job assigned");
        Ok(())
    }

    /// Release `worker` and let every action in the tree reset.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotAssigned`] if nobody holds the job, or
    /// [`JobError::WrongWorker`] if someone else does.
    pub fn quit(&mut self, worker: &mut W, site: &mut S) -> Result<(), JobError> {
        let agent = worker.worker_id();
        match self.worker {
            None => return Err(JobError::NotAssigned { job: self.id }),
            Some(holder) if holder != agent => {
                return Err(JobError::WrongWorker {
                    job: self.id,
                    agent,
                    worker: holder,
                });
            }
            Some(_) => {}
        }
        self.worker = None;
        let frame = self.frame();
        self.root.quit(worker, site, &frame);
        debug!(job = %self.id, %agent, label = self.label, "Worker quit job");
        Ok(())
    }

    /// Clear the worker without notifying any action. Returns the previous
    /// worker.
    pub fn detach(&mut self) -> Option<AgentId> {
        self.worker.take()
    }

    /// Flag the job as cancelled. The flag does not interrupt work; whoever
    /// owns the job is expected to notice it and tear the job down.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Whether the root toil qualifies for `worker`.
    pub fn qualify(&self, worker: &W, site: &S) -> Verdict {
        self.root.qualify(worker, site, &self.frame())
    }

    /// Work the root toil. Returns `true` when the root action completes.
    ///
    /// # Errors
    ///
    /// Propagates [`JobError`] from the toil tree.
    pub fn work(&mut self, worker: &mut W, site: &mut S, dt: f32) -> Result<bool, JobError> {
        let frame = self.frame();
        self.root.work(worker, site, &frame, dt)
    }
}

impl<W, S> core::fmt::Debug for Job<W, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("position", &self.position)
            .field("worker", &self.worker)
            .field("cancelled", &self.cancelled)
            .field("root", &self.root)
            .finish()
    }
}

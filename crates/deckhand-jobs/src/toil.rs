//! Toils: one node of a job's prerequisite tree.
//!
//! Toils are built bottom-up. An executor toil is constructed first and
//! moved into the [`Prerequisite`] that uses it, so the tree is an owned
//! value with no back-references and no way to form a cycle.
//!
//! The owning job is not stored in the toil. Instead the job hands a
//! [`ToilFrame`] down the tree on every call; each toil narrows it to its
//! own position override before passing it to requirements and actions.

use deckhand_types::{JobId, TilePos};

use crate::action::Action;
use crate::error::JobError;
use crate::requirement::{Requirement, Verdict};

/// The job context a toil is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToilFrame {
    /// The job owning the tree.
    pub job: JobId,
    /// The job's own position.
    pub job_position: TilePos,
    /// The position of the toil being evaluated. Equals `job_position`
    /// unless the toil overrides it.
    pub position: TilePos,
}

impl ToilFrame {
    /// Frame for the root of a job at `position`.
    pub const fn new(job: JobId, position: TilePos) -> Self {
        Self {
            job,
            job_position: position,
            position,
        }
    }

    /// Frame for a toil with an optional position override. Toils without
    /// an override fall back to the job's position, not their parent's.
    pub fn for_toil(&self, position: Option<TilePos>) -> Self {
        Self {
            position: position.unwrap_or(self.job_position),
            ..*self
        }
    }
}

/// A requirement plus the executor toil that can satisfy it.
pub struct Prerequisite<W, S> {
    requirement: Box<dyn Requirement<W, S>>,
    executor: Option<Toil<W, S>>,
}

impl<W, S> Prerequisite<W, S> {
    /// The requirement predicate.
    pub fn requirement(&self) -> &dyn Requirement<W, S> {
        self.requirement.as_ref()
    }

    /// The executor toil, if any.
    pub const fn executor(&self) -> Option<&Toil<W, S>> {
        self.executor.as_ref()
    }
}

/// One node of the prerequisite tree: an action gated by requirements.
pub struct Toil<W, S> {
    action: Box<dyn Action<W, S>>,
    requirements: Vec<Prerequisite<W, S>>,
    position: Option<TilePos>,
}

impl<W, S> Toil<W, S> {
    /// Create a toil with no requirements that runs at the job's position.
    pub fn new(action: impl Action<W, S> + 'static) -> Self {
        Self {
            action: Box::new(action),
            requirements: Vec::new(),
            position: None,
        }
    }

    /// Override the position this toil works at.
    #[must_use]
    pub const fn at(mut self, position: TilePos) -> Self {
        self.position = Some(position);
        self
    }

    /// Add a requirement with no executor. While it is unmet the toil does
    /// not qualify.
    #[must_use]
    pub fn require(mut self, requirement: impl Requirement<W, S> + 'static) -> Self {
        self.requirements.push(Prerequisite {
            requirement: Box::new(requirement),
            executor: None,
        });
        self
    }

    /// Add a requirement that `executor` works towards while it is unmet.
    #[must_use]
    pub fn require_with(
        mut self,
        requirement: impl Requirement<W, S> + 'static,
        executor: Self,
    ) -> Self {
        self.requirements.push(Prerequisite {
            requirement: Box::new(requirement),
            executor: Some(executor),
        });
        self
    }

    /// Name of this toil's action.
    pub fn name(&self) -> &str {
        self.action.name()
    }

    /// The position override, if any.
    pub const fn position(&self) -> Option<TilePos> {
        self.position
    }

    /// Requirements in declared order.
    pub fn prerequisites(&self) -> &[Prerequisite<W, S>] {
        &self.requirements
    }

    /// Height of the tree rooted here; a toil without executors has depth 1.
    pub fn depth(&self) -> usize {
        self.requirements
            .iter()
            .filter_map(|p| p.executor.as_ref())
            .map(Self::depth)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Whether every requirement holds, directly or through an executor
    /// that itself qualifies. Stops at the first requirement that cannot be
    /// met and reports its reason.
    pub fn qualify(&self, worker: &W, site: &S, job: &ToilFrame) -> Verdict {
        let frame = job.for_toil(self.position);
        for prerequisite in &self.requirements {
            let verdict = prerequisite.requirement.check(worker, site, &frame);
            if verdict.is_met() {
                continue;
            }
            match &prerequisite.executor {
                None => return verdict,
                Some(executor) => {
                    let sub = executor.qualify(worker, site, job);
                    if !sub.is_met() {
                        return sub;
                    }
                }
            }
        }
        Verdict::Met
    }

    /// Advance the tree by one step.
    ///
    /// If some requirement does not hold, only the first such requirement's
    /// executor is worked and `false` is returned; later requirements wait
    /// for a later tick, and an executor finishing is not reported upward.
    /// If every requirement holds, the action is worked and its result is
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates [`JobError`] from any action worked.
    pub fn work(
        &mut self,
        worker: &mut W,
        site: &mut S,
        job: &ToilFrame,
        dt: f32,
    ) -> Result<bool, JobError> {
        let frame = job.for_toil(self.position);
        for prerequisite in &mut self.requirements {
            if prerequisite.requirement.check(worker, site, &frame).is_met() {
                continue;
            }
            if let Some(executor) = prerequisite.executor.as_mut() {
                executor.work(worker, site, job, dt)?;
            }
            return Ok(false);
        }
        self.action.work(worker, site, &frame, dt)
    }

    /// Notify this toil's action and every executor below it that the worker
    /// is leaving, whether or not that executor was being worked.
    pub fn quit(&mut self, worker: &mut W, site: &mut S, job: &ToilFrame) {
        let frame = job.for_toil(self.position);
        self.action.on_quit(worker, site, &frame);
        for prerequisite in &mut self.requirements {
            if let Some(executor) = prerequisite.executor.as_mut() {
                executor.quit(worker, site, job);
            }
        }
    }
}

impl<W, S> core::fmt::Debug for Prerequisite<W, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Prerequisite")
            .field("requirement", &self.requirement.name())
            .field("executor", &self.executor)
            .finish()
    }
}

impl<W, S> core::fmt::Debug for Toil<W, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Toil")
            .field("action", &self.action.name())
            .field("position", &self.position)
            .field("requirements", &self.requirements)
            .finish()
    }
}

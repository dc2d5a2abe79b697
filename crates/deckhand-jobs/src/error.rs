//! Error types for the `deckhand-jobs` crate.
//!
//! These are invariant violations. A requirement that does not hold is not
//! an error; it is a [`Verdict::Unmet`](crate::Verdict::Unmet).

use deckhand_types::{AgentId, JobId};

/// Errors raised by job assignment and toil evaluation.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// A worker was assigned to a job that already has one.
    #[error("job {job} already has worker {worker}")]
    AlreadyAssigned {
        /// The job.
        job: JobId,
        /// The worker currently holding it.
        worker: AgentId,
    },

    /// A worker quit a job that has no worker.
    #[error("job {job} has no worker")]
    NotAssigned {
        /// The job.
        job: JobId,
    },

    /// A worker quit a job held by someone else.
    #[error("agent {agent} is not the worker of job {job} (held by {worker})")]
    WrongWorker {
        /// The job.
        job: JobId,
        /// The agent that tried to quit.
        agent: AgentId,
        /// The actual worker.
        worker: AgentId,
    },

    /// The toil tree nests executors deeper than the engine allows.
    #[error("toil tree of job '{label}' is {depth} levels deep (limit {limit})")]
    TooDeep {
        /// Label of the rejected job.
        label: String,
        /// Depth of the submitted tree.
        depth: usize,
        /// Maximum permitted depth.
        limit: usize,
    },

    /// An action hit an invariant violation while working.
    #[error("action '{action}' failed: {source}")]
    Action {
        /// Name of the failing action.
        action: String,
        /// The underlying failure.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl JobError {
    /// Wrap an action failure.
    pub fn action(
        action: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Action {
            action: action.into(),
            source: source.into(),
        }
    }
}

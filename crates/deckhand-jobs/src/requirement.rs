//! Requirements gate a toil's action.

use crate::toil::ToilFrame;

/// Outcome of checking a requirement: either it holds, or it does not and
/// here is why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The requirement holds.
    Met,
    /// The requirement does not hold.
    Unmet(String),
}

impl Verdict {
    /// Build an unmet verdict.
    pub fn unmet(reason: impl Into<String>) -> Self {
        Self::Unmet(reason.into())
    }

    /// Build a verdict from a condition, with a reason used when it fails.
    pub fn check(condition: bool, reason: impl FnOnce() -> String) -> Self {
        if condition {
            Self::Met
        } else {
            Self::Unmet(reason())
        }
    }

    /// Whether the requirement holds.
    pub const fn is_met(&self) -> bool {
        matches!(self, Self::Met)
    }

    /// The failure reason, if unmet.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Met => None,
            Self::Unmet(reason) => Some(reason),
        }
    }
}

/// A predicate over the worker, the site, and the toil being evaluated.
///
/// Checks must be side-effect free: they run during qualification, which
/// may happen many times per tick.
pub trait Requirement<W, S> {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Evaluate the predicate.
    fn check(&self, worker: &W, site: &S, frame: &ToilFrame) -> Verdict;
}

/// A requirement backed by a closure.
pub struct FnRequirement<F> {
    name: String,
    predicate: F,
}

impl<F> FnRequirement<F> {
    /// Wrap `predicate` under `name`.
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<W, S, F> Requirement<W, S> for FnRequirement<F>
where
    F: Fn(&W, &S, &ToilFrame) -> Verdict,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, worker: &W, site: &S, frame: &ToilFrame) -> Verdict {
        (self.predicate)(worker, site, frame)
    }
}

impl<F> core::fmt::Debug for FnRequirement<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnRequirement")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

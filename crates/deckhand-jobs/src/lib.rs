//! Job, toil, requirement, and action engine.
//!
//! A [`Job`] wraps a tree of [`Toil`]s. Each toil pairs one [`Action`] with
//! an ordered list of [`Requirement`]s, and each requirement may name an
//! executor toil that, once worked to completion, makes the requirement
//! hold. The tree is evaluated lazily from the root every tick:
//!
//! - [`Toil::qualify`] checks whether every requirement holds, directly or
//!   through an executor that itself qualifies.
//! - [`Toil::work`] advances exactly one thing per call: the executor of the
//!   first unmet requirement, or the toil's own action once all hold.
//! - [`Toil::quit`] gives every action in the tree a chance to reset.
//!
//! The engine is generic over the worker type `W` and the site type `S` the
//! actions operate on, so the same tree shapes can drive any tile graph.
//!
//! # Modules
//!
//! - [`action`] -- The [`Action`] trait.
//! - [`error`] -- [`JobError`].
//! - [`job`] -- [`Job`], worker assignment, and the [`Worker`] trait.
//! - [`requirement`] -- The [`Requirement`] trait, [`Verdict`], and
//!   closure-backed requirements.
//! - [`toil`] -- [`Toil`], [`Prerequisite`], and [`ToilFrame`].

pub mod action;
pub mod error;
pub mod job;
pub mod requirement;
pub mod toil;

#[cfg(test)]
mod testkit;

pub use action::Action;
pub use error::JobError;
pub use job::{Job, MAX_TOIL_DEPTH, Worker};
pub use requirement::{FnRequirement, Requirement, Verdict};
pub use toil::{Prerequisite, Toil, ToilFrame};

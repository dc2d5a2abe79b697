//! Shared fixtures for engine tests: a flag board as the site and a
//! counting action that can raise a flag when it finishes.

use std::collections::BTreeSet;

use deckhand_types::AgentId;

use crate::action::Action;
use crate::error::JobError;
use crate::job::Worker;
use crate::requirement::{Requirement, Verdict};
use crate::toil::ToilFrame;

pub struct Crew {
    pub id: AgentId,
}

impl Crew {
    pub fn new() -> Self {
        Self { id: AgentId::new() }
    }
}

impl Worker for Crew {
    fn worker_id(&self) -> AgentId {
        self.id
    }
}

#[derive(Default)]
pub struct Board {
    pub flags: BTreeSet<&'static str>,
    pub log: Vec<String>,
}

pub struct Flag(pub &'static str);

impl Requirement<Crew, Board> for Flag {
    fn name(&self) -> &str {
        self.0
    }

    fn check(&self, _worker: &Crew, site: &Board, _frame: &ToilFrame) -> Verdict {
        Verdict::check(site.flags.contains(self.0), || format!("{} not set", self.0))
    }
}

pub struct Step {
    pub name: &'static str,
    pub needed: u32,
    pub done: u32,
    pub raises: Option<&'static str>,
}

impl Step {
    pub fn new(name: &'static str, needed: u32) -> Self {
        Self {
            name,
            needed,
            done: 0,
            raises: None,
        }
    }

    pub fn raising(name: &'static str, flag: &'static str) -> Self {
        Self {
            raises: Some(flag),
            ..Self::new(name, 1)
        }
    }
}

impl Action<Crew, Board> for Step {
    fn name(&self) -> &str {
        self.name
    }

    fn work(
        &mut self,
        _worker: &mut Crew,
        site: &mut Board,
        frame: &ToilFrame,
        _dt: f32,
    ) -> Result<bool, JobError> {
        site.log.push(format!("work:{}@{}", self.name, frame.position));
        self.done = self.done.saturating_add(1);
        if self.done < self.needed {
            return Ok(false);
        }
        if let Some(flag) = self.raises {
            site.flags.insert(flag);
        }
        Ok(true)
    }

    fn on_quit(&mut self, _worker: &mut Crew, site: &mut Board, _frame: &ToilFrame) {
        site.log.push(format!("quit:{}", self.name));
        self.done = 0;
    }
}

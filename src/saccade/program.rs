//! The saccade-programming state machine
//!
//! ```text
//! Idle --start--> Labile --deadline--> NonLabile --non_labile_ms--> Executing --complete--> Idle
//!                   |  ^
//!                   +--+ trigger: cancel and reschedule
//! ```
//!
//! Only a labile program can be cancelled. Once committed, the target is
//! fixed and triggers are ignored.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::Parameters;
use crate::core::types::{Millis, ProgramId};

use super::landing::sample_normal;
use super::targeting::SaccadeTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStage {
    Idle,
    Labile,
    NonLabile,
    Executing,
}

/// Events that invalidate a labile program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The fixated word was just recognized
    FixatedRecognized,
    /// The word the live program aims at was just recognized
    TargetRecognized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaccadeProgram {
    pub id: ProgramId,
    pub stage: ProgramStage,
    pub target: SaccadeTarget,
    pub scheduled_at: Millis,
    pub labile_deadline: Millis,
    /// Set once the program becomes non-labile
    pub execution_deadline: Option<Millis>,
}

#[derive(Debug, Default)]
pub struct SaccadeProgrammer {
    live: Option<SaccadeProgram>,
    next_id: u64,
    cancelled: Vec<ProgramId>,
    executed: Vec<ProgramId>,
}

impl SaccadeProgrammer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> ProgramStage {
        self.live.map(|p| p.stage).unwrap_or(ProgramStage::Idle)
    }

    pub fn live(&self) -> Option<&SaccadeProgram> {
        self.live.as_ref()
    }

    pub fn cancelled(&self) -> &[ProgramId] {
        &self.cancelled
    }

    pub fn executed(&self) -> &[ProgramId] {
        &self.executed
    }

    /// Schedule a program from `Idle`
    ///
    /// The labile deadline is `onset` plus a normal latency, shortened when
    /// the fixated word is already recognized, and clamped to
    /// `[now + 1 cycle, onset + max_labile_ms]`.
    pub fn start<R: Rng>(
        &mut self,
        now: Millis,
        onset: Millis,
        target: SaccadeTarget,
        fixated_recognized: bool,
        params: &Parameters,
        rng: &mut R,
    ) -> Option<ProgramId> {
        if self.live.is_some() {
            return None;
        }
        Some(self.schedule(now, onset, target, fixated_recognized, params, rng))
    }

    /// Cancel a labile program and schedule a replacement with a new target
    ///
    /// Returns the new program id, or `None` when nothing labile was live.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger<R: Rng>(
        &mut self,
        trigger: Trigger,
        now: Millis,
        onset: Millis,
        target: SaccadeTarget,
        fixated_recognized: bool,
        params: &Parameters,
        rng: &mut R,
    ) -> Option<ProgramId> {
        let program = self.live.filter(|p| p.stage == ProgramStage::Labile)?;
        tracing::trace!("Program {:?} cancelled by {:?}", program.id, trigger);
        self.cancelled.push(program.id);
        self.live = None;
        Some(self.schedule(now, onset, target, fixated_recognized, params, rng))
    }

    /// Move through deadlines; returns the program once it is executing
    pub fn advance(&mut self, now: Millis, params: &Parameters) -> Option<SaccadeProgram> {
        let program = self.live.as_mut()?;
        if program.stage == ProgramStage::Labile && now >= program.labile_deadline {
            program.stage = ProgramStage::NonLabile;
            program.execution_deadline = Some(now + params.non_labile_ms);
        }
        if program.stage == ProgramStage::NonLabile
            && program.execution_deadline.is_some_and(|deadline| now >= deadline)
        {
            program.stage = ProgramStage::Executing;
        }
        (program.stage == ProgramStage::Executing).then_some(*program)
    }

    /// Finish the executing program and return to `Idle`
    pub fn complete(&mut self) -> Option<ProgramId> {
        let program = self.live.filter(|p| p.stage == ProgramStage::Executing)?;
        self.executed.push(program.id);
        self.live = None;
        Some(program.id)
    }

    fn schedule<R: Rng>(
        &mut self,
        now: Millis,
        onset: Millis,
        target: SaccadeTarget,
        fixated_recognized: bool,
        params: &Parameters,
        rng: &mut R,
    ) -> ProgramId {
        let id = ProgramId(self.next_id);
        self.next_id += 1;

        let mu = if fixated_recognized {
            (params.mu_ms - params.recognition_speedup_ms).max(0.0)
        } else {
            params.mu_ms
        };
        let latency = sample_normal(rng, mu, params.sigma_ms).max(0.0).round() as Millis;
        let earliest = now + params.cycle_ms;
        let latest = (onset + params.max_labile_ms).max(earliest);
        let labile_deadline = (onset + latency).clamp(earliest, latest);

        self.live = Some(SaccadeProgram {
            id,
            stage: ProgramStage::Labile,
            target,
            scheduled_at: now,
            labile_deadline,
            execution_deadline: None,
        });
        id
    }
}

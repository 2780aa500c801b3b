//! The per-cycle reading loop of a single trial
//!
//! Each cycle:
//! 1. schedule a saccade program if none is live
//! 2. advance word activation across the perceptual span
//! 3. match above-threshold entries to word slots
//! 4. feed recognitions back to the saccade programmer
//! 5. execute a committed saccade, closing the current fixation

use rand::Rng;

use crate::activation::{
    compute_preactivation, resolve_recognitions, ActivationEngine, CycleInput, Recognition, TrialCode,
};
use crate::core::config::Parameters;
use crate::core::error::Anomaly;
use crate::core::types::Millis;
use crate::lexicon::Lexicon;
use crate::perception::{AttentionWindow, PerceptualSpan};
use crate::predictability::TrialPredictions;
use crate::saccade::{
    plan_landing, select_target, ProgramStage, SaccadeKind, SaccadeProgrammer, SaccadeTarget, Trigger,
    WordProgress,
};
use crate::stimulus::Text;

use super::output::{FixationRecord, TrialOutput};
use super::task::ReadingTask;

/// Shared, read-only inputs of one trial
pub struct TrialContext<'a> {
    pub text: &'a Text,
    pub code: &'a TrialCode,
    pub predictions: &'a TrialPredictions,
    pub lexicon: &'a Lexicon,
    pub params: &'a Parameters,
    pub task: &'a dyn ReadingTask,
}

/// Reading progress over the words of the trial
struct ReadingState {
    recognized_entry: Vec<Option<usize>>,
    recognized: Vec<bool>,
    abandoned: Vec<bool>,
    refixations: Vec<u32>,
    regressions: Vec<u32>,
    /// Time each word spent fixated while unrecognized
    effort_ms: Vec<Millis>,
}

impl ReadingState {
    fn new(n: usize) -> Self {
        Self {
            recognized_entry: vec![None; n],
            recognized: vec![false; n],
            abandoned: vec![false; n],
            refixations: vec![0; n],
            regressions: vec![0; n],
            effort_ms: vec![0; n],
        }
    }

    fn done(&self, position: usize) -> bool {
        self.recognized[position] || self.abandoned[position]
    }

    fn progress(&self) -> WordProgress<'_> {
        WordProgress {
            recognized: &self.recognized,
            abandoned: &self.abandoned,
            refixations: &self.refixations,
            regressions: &self.regressions,
        }
    }
}

/// The fixation currently in progress
struct OpenFixation {
    start_ms: Millis,
    eye: usize,
    word: usize,
    entry_kind: SaccadeKind,
    recognized_words: Vec<usize>,
}

/// Read one text; anomalies are appended to `anomalies`
pub fn run_trial<R: Rng>(ctx: &TrialContext<'_>, rng: &mut R, anomalies: &mut Vec<Anomaly>) -> TrialOutput {
    let text = ctx.text;
    let params = ctx.params;
    let n = text.len();
    if n == 0 {
        return TrialOutput { text_id: text.id, fixations: Vec::new(), recognized: Vec::new(), cycles: 0 };
    }

    let mut state = ReadingState::new(n);
    let mut engine = ActivationEngine::new(ctx.lexicon, params);
    let mut programmer = SaccadeProgrammer::new();
    let mut fixations: Vec<FixationRecord> = Vec::new();

    let eye = ctx.task.first_fixation(text, params);
    let mut fixation = OpenFixation {
        start_ms: 0,
        eye,
        word: text.word_at_offset(eye),
        entry_kind: SaccadeKind::Initial,
        recognized_words: Vec::new(),
    };
    let mut span = span_at(fixation.word, n, params);
    let mut attention = AttentionWindow::new(eye as f64, params);

    let mut now: Millis = 0;
    let mut cycles: u64 = 0;
    let mut programming_onset: Millis = 0;

    loop {
        if cycles >= params.max_cycles_per_trial {
            tracing::warn!("Text {} stopped after {} cycles", text.id.0, cycles);
            anomalies.push(Anomaly::CycleLimit { text: text.id, cycles });
            close_fixation(&mut fixations, fixation, now, ctx, &state, SaccadeKind::Exit);
            break;
        }

        let fixated = fixation.word;
        if programmer.stage() == ProgramStage::Idle && !ctx.task.holds_fixation(text, fixated, state.done(fixated)) {
            let target = select_target(text, fixation.eye, attention.position, &span, &state.progress(), params);
            // on a held fixation programming starts later than the fixation
            programming_onset = now;
            programmer.start(now, programming_onset, target, state.recognized[fixated], params, rng);
        }

        // lexical processing
        attention.shift_to(attention_centre(text, &span, &state, fixation.eye));
        let preactivation = compute_preactivation(ctx.predictions, &span, &state.recognized, params.pred_weight);
        engine.step(&CycleInput {
            code: ctx.code,
            span: &span,
            eye: fixation.eye,
            attention: &attention,
            preactivation: &preactivation,
        });

        let recognitions = resolve_recognitions(
            ctx.lexicon,
            engine.state(),
            text,
            &span,
            &state.recognized_entry,
            ctx.predictions,
            params,
        );
        for rec in &recognitions {
            state.recognized_entry[rec.position] = Some(rec.entry);
            state.recognized[rec.position] = true;
            engine.suppress(rec.entry);
            fixation.recognized_words.push(rec.position);
            tracing::trace!(
                "t={}ms recognized '{}' at position {} ({:.3})",
                now,
                ctx.lexicon.entry(rec.entry).text,
                rec.position,
                rec.activation
            );
        }

        now += params.cycle_ms;
        cycles += 1;

        if !state.done(fixated) {
            state.effort_ms[fixated] += params.cycle_ms;
            if state.effort_ms[fixated] >= params.max_recognition_ms {
                state.abandoned[fixated] = true;
                tracing::warn!(
                    "Text {} word {} not recognized after {}ms; moving on",
                    text.id.0,
                    fixated,
                    state.effort_ms[fixated]
                );
                anomalies.push(Anomaly::NonConvergence {
                    text: text.id,
                    position: fixated,
                    elapsed_ms: state.effort_ms[fixated],
                });
            }
        }

        if let Some(trigger) = pending_trigger(&programmer, fixated, &recognitions) {
            let target = select_target(text, fixation.eye, attention.position, &span, &state.progress(), params);
            programmer.trigger(trigger, now, programming_onset, target, state.recognized[fixated], params, rng);
        }

        let Some(program) = programmer.advance(now, params) else { continue };
        let target = program.target;
        programmer.complete();

        if ctx.task.is_finished(&target) {
            close_fixation(&mut fixations, fixation, now, ctx, &state, target.kind);
            break;
        }

        let landing = plan_landing(text, fixation.eye, &target, params, rng);
        if landing.was_clamped() {
            tracing::warn!("Landing at {} outside text {}; clamped", landing.requested, text.id.0);
            anomalies.push(Anomaly::OutOfBoundsLanding { requested: landing.requested, clamped: landing.offset });
        }
        count_saccade(&mut state, &target);
        close_fixation(&mut fixations, fixation, now, ctx, &state, target.kind);

        now += params.saccade_duration_ms;
        fixation = OpenFixation {
            start_ms: now,
            eye: landing.offset,
            word: text.word_at_offset(landing.offset),
            entry_kind: target.kind,
            recognized_words: Vec::new(),
        };
        tracing::debug!(
            "Text {} {} saccade to word {} (letter {}) at {}ms",
            text.id.0,
            target.kind,
            fixation.word,
            fixation.eye,
            now
        );
        span = span_at(fixation.word, n, params);
        engine.reset();
    }

    TrialOutput {
        text_id: text.id,
        fixations,
        recognized: state
            .recognized_entry
            .iter()
            .map(|e| e.map(|id| ctx.lexicon.entry(id).text.clone()))
            .collect(),
        cycles,
    }
}

fn span_at(fixated: usize, n: usize, params: &Parameters) -> PerceptualSpan {
    PerceptualSpan::new(fixated, n, params.span_left_words, params.span_right_words)
}

/// Attention rests on the eye until the fixated word is done, then moves to
/// the next unfinished word ahead
fn attention_centre(text: &Text, span: &PerceptualSpan, state: &ReadingState, eye: usize) -> f64 {
    if !state.done(span.fixated) {
        return eye as f64;
    }
    (span.fixated + 1..=span.last())
        .find(|&p| !state.done(p))
        .and_then(|p| text.word(p))
        .map(|w| w.center())
        .unwrap_or(eye as f64)
}

/// A labile program is invalidated when the fixated word or its target word
/// was recognized this cycle
fn pending_trigger(
    programmer: &SaccadeProgrammer,
    fixated: usize,
    recognitions: &[Recognition],
) -> Option<Trigger> {
    let program = programmer.live().filter(|p| p.stage == ProgramStage::Labile)?;
    if recognitions.iter().any(|r| r.position == fixated) {
        return Some(Trigger::FixatedRecognized);
    }
    let aims_at_word = matches!(
        program.target.kind,
        SaccadeKind::Forward | SaccadeKind::Skip | SaccadeKind::Regression
    );
    (aims_at_word && recognitions.iter().any(|r| r.position == program.target.word))
        .then_some(Trigger::TargetRecognized)
}

fn count_saccade(state: &mut ReadingState, target: &SaccadeTarget) {
    match target.kind {
        SaccadeKind::Refixation => state.refixations[target.word] += 1,
        SaccadeKind::Regression => state.regressions[target.word] += 1,
        _ => {}
    }
}

fn close_fixation(
    fixations: &mut Vec<FixationRecord>,
    fixation: OpenFixation,
    now: Millis,
    ctx: &TrialContext<'_>,
    state: &ReadingState,
    exit_kind: SaccadeKind,
) {
    let (text, lexicon) = (ctx.text, ctx.lexicon);
    let word = text.word(fixation.word).map(|w| w.text.clone()).unwrap_or_default();
    fixations.push(FixationRecord {
        serial: fixations.len(),
        start_ms: fixation.start_ms,
        duration_ms: now.saturating_sub(fixation.start_ms),
        landing_offset: fixation.eye,
        screen_offset: ctx.params.reading_direction.screen_offset(fixation.eye, text.letter_count()),
        fixated_word: fixation.word,
        word,
        recognized_word: state.recognized_entry[fixation.word].map(|id| lexicon.entry(id).text.clone()),
        recognized_words: fixation.recognized_words,
        entry_kind: fixation.entry_kind,
        exit_kind,
    });
}

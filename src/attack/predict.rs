//! Per-sample replay of the target's ladder under the recovered bits.

use num_bigint::BigUint;

use crate::arith::{ExponentiationShape, Montgomery};

/// Replay state for one sample after the bits fixed so far.
#[derive(Debug, Clone)]
pub(crate) struct SampleState {
    base: BigUint,
    acc: BigUint,
    known_events: u32,
}

/// What one sample's next step would look like under one guess.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    acc: BigUint,
    step_events: u32,
    square_event: bool,
    lookahead: bool,
    flag: bool,
}

/// Both guesses for one sample at one position.
#[derive(Debug, Clone)]
pub(crate) struct Prediction {
    known_events: u32,
    /// Events of this step that both guesses share.
    shared_events: u32,
    candidates: [Candidate; 2],
}

impl Prediction {
    /// Extra reductions that no longer depend on any undecided bit.
    pub(crate) fn settled_events(&self) -> f64 {
        f64::from(self.known_events + self.shared_events)
    }

    /// Extra reductions that only happen under `guess`: this step's own
    /// events and the next squaring when it is determined.
    pub(crate) fn guess_events(&self, guess: usize) -> f64 {
        let c = &self.candidates[guess];
        f64::from(c.step_events - self.shared_events + u32::from(c.lookahead))
    }

    /// Partition flag for the mean-difference statistic under `guess`.
    pub(crate) fn flag(&self, guess: usize) -> bool {
        self.candidates[guess].flag
    }
}

/// Replays the ladder shape the target is assumed to run.
#[derive(Debug, Clone)]
pub(crate) struct PredictionModel {
    ctx: Montgomery,
    shape: ExponentiationShape,
}

impl PredictionModel {
    pub(crate) fn new(ctx: Montgomery, shape: ExponentiationShape) -> Self {
        Self { ctx, shape }
    }

    /// State after the top bit, which is always 1.
    pub(crate) fn init(&self, input: &BigUint, top_position: u64) -> SampleState {
        let base = self.ctx.to_mont(input);
        let out = self.shape.step(&self.ctx, self.ctx.one(), &base, true, top_position);
        SampleState {
            known_events: out.events(),
            acc: out.acc,
            base,
        }
    }

    /// Run the step at `position` under both guesses. `position >= 1`.
    pub(crate) fn predict(&self, state: &SampleState, position: u64) -> Prediction {
        let candidate = |bit: bool| {
            let out = self.shape.step(&self.ctx, &state.acc, &state.base, bit, position);
            let (lookahead, flag) = match self.shape {
                // The next step squares whatever this step left behind.
                ExponentiationShape::SquareAndMultiply => {
                    let next = self.ctx.would_reduce(&out.acc, &out.acc);
                    (next, next)
                }
                // The trailing square already belongs to this step.
                ExponentiationShape::MultiplyAndSquare => {
                    (false, out.square_extra == Some(true))
                }
            };
            Candidate {
                step_events: out.events(),
                square_event: out.square_extra == Some(true),
                acc: out.acc,
                lookahead,
                flag,
            }
        };
        let candidates = [candidate(false), candidate(true)];
        let shared_events = match self.shape {
            // Both guesses square the same accumulator first.
            ExponentiationShape::SquareAndMultiply => u32::from(candidates[0].square_event),
            ExponentiationShape::MultiplyAndSquare => 0,
        };
        Prediction {
            known_events: state.known_events,
            shared_events,
            candidates,
        }
    }
}

impl SampleState {
    /// Commit `guess` at the position `prediction` was made for.
    pub(crate) fn commit(&mut self, prediction: Prediction, guess: usize) {
        let [zero, one] = prediction.candidates;
        let chosen = if guess == 0 { zero } else { one };
        self.acc = chosen.acc;
        self.known_events += chosen.step_events;
    }
}

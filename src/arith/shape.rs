//! Exponentiation ladders as sequences of Montgomery steps.
//!
//! A ladder walks the exponent from the most significant bit down. Both the
//! timed target and the attacker advance through the exponent with
//! [`ExponentiationShape::step`], so every intermediate accumulator and every
//! extra-reduction event agree bit for bit.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::montgomery::Montgomery;

/// Order of operations within one exponent bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExponentiationShape {
    /// Left-to-right: square the accumulator, then multiply by the base if
    /// the bit is set.
    #[default]
    SquareAndMultiply,
    /// Multiply by the base if the bit is set, then square unless this is
    /// the last bit.
    MultiplyAndSquare,
}

/// State after one ladder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Accumulator after the step, in Montgomery form.
    pub acc: BigUint,
    /// Extra reduction taken by the squaring, if one ran.
    pub square_extra: Option<bool>,
    /// Extra reduction taken by the multiplication, if one ran.
    pub multiply_extra: Option<bool>,
}

impl StepOutcome {
    /// Number of extra reductions in this step (0, 1 or 2).
    pub fn events(&self) -> u32 {
        u32::from(self.square_extra == Some(true)) + u32::from(self.multiply_extra == Some(true))
    }

    /// Number of Montgomery products performed in this step.
    pub fn operations(&self) -> u32 {
        u32::from(self.square_extra.is_some()) + u32::from(self.multiply_extra.is_some())
    }
}

impl ExponentiationShape {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            ExponentiationShape::SquareAndMultiply => "square_and_multiply",
            ExponentiationShape::MultiplyAndSquare => "multiply_and_square",
        }
    }

    /// Process the exponent bit at `position` (0 = least significant).
    ///
    /// `acc` and `base` are in Montgomery form.
    pub fn step(
        &self,
        ctx: &Montgomery,
        acc: &BigUint,
        base: &BigUint,
        bit: bool,
        position: u64,
    ) -> StepOutcome {
        match self {
            ExponentiationShape::SquareAndMultiply => {
                let sq = ctx.square(acc);
                let square_extra = Some(sq.extra_reduction);
                if bit {
                    let m = ctx.mul(&sq.value, base);
                    StepOutcome {
                        acc: m.value,
                        square_extra,
                        multiply_extra: Some(m.extra_reduction),
                    }
                } else {
                    StepOutcome {
                        acc: sq.value,
                        square_extra,
                        multiply_extra: None,
                    }
                }
            }
            ExponentiationShape::MultiplyAndSquare => {
                let (acc, multiply_extra) = if bit {
                    let m = ctx.mul(acc, base);
                    (m.value, Some(m.extra_reduction))
                } else {
                    (acc.clone(), None)
                };
                if position > 0 {
                    let sq = ctx.square(&acc);
                    StepOutcome {
                        acc: sq.value,
                        square_extra: Some(sq.extra_reduction),
                        multiply_extra,
                    }
                } else {
                    StepOutcome {
                        acc,
                        square_extra: None,
                        multiply_extra,
                    }
                }
            }
        }
    }
}

/// Full run of one exponentiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderTrace {
    /// `base^exponent mod n`, in ordinary (non-Montgomery) form.
    pub result: BigUint,
    /// Extra reductions per step, most significant bit first.
    pub step_events: Vec<u32>,
    /// Montgomery products performed.
    pub operations: u32,
}

impl LadderTrace {
    /// Extra reductions over the whole ladder.
    pub fn total_events(&self) -> u32 {
        self.step_events.iter().sum()
    }
}

/// Run `base^exponent mod n` through the ladder, recording every extra
/// reduction. `exponent_bits` is most significant bit first; `base < n` is
/// in ordinary form.
pub fn modpow_traced(
    ctx: &Montgomery,
    shape: ExponentiationShape,
    base: &BigUint,
    exponent_bits: &[bool],
) -> LadderTrace {
    let base_mont = ctx.to_mont(base);
    let mut acc = ctx.one().clone();
    let mut step_events = Vec::with_capacity(exponent_bits.len());
    let mut operations = 0;
    let len = exponent_bits.len() as u64;

    for (idx, &bit) in exponent_bits.iter().enumerate() {
        let position = len - 1 - idx as u64;
        let out = shape.step(ctx, &acc, &base_mont, bit, position);
        step_events.push(out.events());
        operations += out.operations();
        acc = out.acc;
    }

    LadderTrace {
        result: ctx.from_mont(&acc),
        step_events,
        operations,
    }
}

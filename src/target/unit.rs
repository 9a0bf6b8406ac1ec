//! Shared simulated exponentiation unit.

use num_bigint::BigUint;

use crate::arith::{modpow_traced, ExponentiationShape, LadderTrace, Montgomery};
use crate::error::{LabError, Result};
use crate::key::KeyMaterial;

/// Montgomery context plus both exponents, expanded once per key.
#[derive(Debug, Clone)]
pub(crate) struct ExponentiationUnit {
    ctx: Montgomery,
    shape: ExponentiationShape,
    private_bits: Vec<bool>,
    public_bits: Vec<bool>,
}

impl ExponentiationUnit {
    pub(crate) fn new(key: &KeyMaterial, shape: ExponentiationShape) -> Result<Self> {
        Ok(Self {
            ctx: Montgomery::new(key.n())?,
            shape,
            private_bits: key.private_bits(),
            public_bits: crate::arith::bits_msb_first(key.e()),
        })
    }

    pub(crate) fn shape(&self) -> ExponentiationShape {
        self.shape
    }

    /// Run the ladder for `input` with the public or private exponent.
    ///
    /// Returns the trace and the number of exponent bits processed.
    pub(crate) fn run(&self, input: &BigUint, use_public: bool) -> Result<(LadderTrace, usize)> {
        if input >= self.ctx.modulus() {
            return Err(LabError::domain(format!(
                "input must be below the modulus ({} bits)",
                self.ctx.radix_bits()
            )));
        }
        let bits = if use_public {
            &self.public_bits
        } else {
            &self.private_bits
        };
        Ok((modpow_traced(&self.ctx, self.shape, input, bits), bits.len()))
    }
}

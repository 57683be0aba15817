// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Global per-step error attenuation

use crate::arena::GraphArena;
use crate::fixed::Fraction;

/// How accumulated error shrinks at the end of each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDecayMode {
    /// `error = (error · beta) >> 16`
    Multiplicative { beta: Fraction },

    /// `error -= error >> shift`
    ///
    /// Approximates `beta = 1 − 2^−shift`. Truncation differs from the
    /// multiplicative form: small errors (below `2^shift`) never decay.
    ShiftApproximation { shift: u8 },
}

impl ErrorDecayMode {
    /// β = 0.995 (raw 65208)
    pub fn reference() -> Self {
        ErrorDecayMode::Multiplicative {
            beta: Fraction::from_f64(0.995),
        }
    }

    #[inline]
    pub fn apply(&self, error: u32) -> u32 {
        match *self {
            ErrorDecayMode::Multiplicative { beta } => beta.apply(error),
            ErrorDecayMode::ShiftApproximation { shift } => {
                if shift >= 32 {
                    error
                } else {
                    error - (error >> shift)
                }
            }
        }
    }

    /// Effective β as a real number (approximate for the shift form)
    pub fn effective_beta(&self) -> f64 {
        match *self {
            ErrorDecayMode::Multiplicative { beta } => beta.to_f64(),
            ErrorDecayMode::ShiftApproximation { shift } => 1.0 - 1.0 / (1u64 << shift.min(63)) as f64,
        }
    }
}

impl Default for ErrorDecayMode {
    fn default() -> Self {
        Self::reference()
    }
}

/// Decay the error of every active node.
pub fn apply_to_all<const N: usize, const E: usize, const D: usize>(
    arena: &mut GraphArena<N, E, D>,
    mode: ErrorDecayMode,
) {
    for error in arena.errors_mut() {
        *error = mode.apply(*error);
    }
}

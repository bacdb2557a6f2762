//! Bates stochastic-volatility jump-diffusion process
//! (translates `ql/processes/batesprocess.hpp`).
//!
//! Extends the Heston model with Merton-style log-normal jumps in the asset:
//!
//! ```text
//! dS/S = (r − q − λ·k) dt + √v dW₁ + J dN
//! dv   = κ(θ − v) dt + σ √v dW₂
//! ```
//!
//! where `λ` is jump intensity, `J` is the log-jump (normal with mean `ν`,
//! std dev `δ`), and `k = exp(ν + δ²/2) − 1`.

use crate::heston_process::HestonProcess;
use ql_core::{ensure, errors::Result, Real, Versioned};

/// A Bates jump-diffusion stochastic volatility process.
///
/// A Heston process plus log-normal jumps in the asset price.
///
/// Corresponds to `QuantLib::BatesProcess`.
#[derive(Debug, Clone)]
pub struct BatesProcess {
    heston: HestonProcess,
    lambda: Real,
    nu: Real,
    delta: Real,
}

impl BatesProcess {
    /// Attach jumps with intensity `lambda`, mean log-jump `nu` and log-jump
    /// volatility `delta` to `heston`.
    ///
    /// # Errors
    /// Negative intensity or jump volatility.
    pub fn new(heston: HestonProcess, lambda: Real, nu: Real, delta: Real) -> Result<Self> {
        ensure!(lambda >= 0.0, "jump intensity must be non-negative, got {lambda}");
        ensure!(delta >= 0.0, "jump volatility must be non-negative, got {delta}");
        Ok(Self {
            heston,
            lambda,
            nu,
            delta,
        })
    }

    /// The diffusive part.
    pub fn heston(&self) -> &HestonProcess {
        &self.heston
    }

    /// Jump intensity λ.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Mean of the log-jump size.
    pub fn nu(&self) -> Real {
        self.nu
    }

    /// Standard deviation of the log-jump size.
    pub fn delta(&self) -> Real {
        self.delta
    }

    /// Jump compensator `k = exp(ν + δ²/2) − 1`.
    pub fn jump_compensator(&self) -> Real {
        (self.nu + 0.5 * self.delta * self.delta).exp() - 1.0
    }
}

impl Versioned for BatesProcess {
    fn version(&self) -> u64 {
        self.heston.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_quotes::SimpleQuote;
    use ql_termstructures::FlatForward;
    use std::sync::Arc;

    fn heston() -> HestonProcess {
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(SimpleQuote::new(100.0)),
            0.04,
            2.0,
            0.04,
            0.3,
            -0.5,
        )
        .unwrap()
    }

    #[test]
    fn bates_compensator() {
        let b = BatesProcess::new(heston(), 0.5, -0.1, 0.15).unwrap();
        assert_abs_diff_eq!(
            b.jump_compensator(),
            (-0.1 + 0.5 * 0.0225_f64).exp() - 1.0,
            epsilon = 1e-15
        );
        assert_eq!(b.heston().v0(), 0.04);
    }

    #[test]
    fn bates_without_jumps_has_zero_compensator() {
        let b = BatesProcess::new(heston(), 0.0, 0.0, 0.0).unwrap();
        assert_eq!(b.jump_compensator(), 0.0);
    }

    #[test]
    fn bates_rejects_negative_intensity() {
        assert!(BatesProcess::new(heston(), -1.0, 0.0, 0.1).is_err());
    }
}

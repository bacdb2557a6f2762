//! Extended Ornstein-Uhlenbeck process plus a mean-reverting jump factor
//! (translates `ql/experimental/processes/extouwithjumpsprocess.hpp`).
//!
//! The Kluge power-price model:
//!
//! ```text
//! S = exp(X + Y)
//! dX = a(b(t) − X) dt + σ dW
//! dY = −β Y dt + J dN(λ),   J ~ Exp(η)
//! ```

use crate::extended_ornstein_uhlenbeck_process::ExtendedOrnsteinUhlenbeckProcess;
use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Versioned};
use std::sync::Arc;

/// Two-factor diffusion plus jump process.
///
/// Corresponds to `QuantLib::ExtOUWithJumpsProcess`.
#[derive(Debug, Clone)]
pub struct ExtOUWithJumpsProcess {
    ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    y0: Real,
    beta: Real,
    jump_intensity: Real,
    eta: Real,
}

impl ExtOUWithJumpsProcess {
    /// # Errors
    /// Non-positive `eta`, negative intensity or negative jump reversion.
    pub fn new(
        ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        y0: Real,
        beta: Real,
        jump_intensity: Real,
        eta: Real,
    ) -> Result<Self> {
        ensure!(eta > 0.0, "jump-size rate η must be positive, got {eta}");
        ensure!(jump_intensity >= 0.0, "jump intensity must be non-negative, got {jump_intensity}");
        ensure!(beta >= 0.0, "jump mean reversion must be non-negative, got {beta}");
        Ok(Self {
            ou,
            y0,
            beta,
            jump_intensity,
            eta,
        })
    }

    /// The diffusive factor `X`.
    pub fn ext_ou_process(&self) -> &Arc<ExtendedOrnsteinUhlenbeckProcess> {
        &self.ou
    }

    /// Initial state `(X₀, Y₀)`.
    pub fn initial_values(&self) -> [Real; 2] {
        [self.ou.x0(), self.y0]
    }

    /// Mean reversion of the jump factor.
    pub fn beta(&self) -> Real {
        self.beta
    }

    /// Jump intensity λ.
    pub fn jump_intensity(&self) -> Real {
        self.jump_intensity
    }

    /// Rate of the exponential jump-size distribution (mean jump `1/η`).
    pub fn eta(&self) -> Real {
        self.eta
    }
}

impl Versioned for ExtOUWithJumpsProcess {
    fn version(&self) -> u64 {
        self.ou.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_core::Time;

    #[test]
    fn accessors_and_validation() {
        let ou = Arc::new(
            ExtendedOrnsteinUhlenbeckProcess::new(1.0, 0.2, 3.0, Arc::new(|_: Time| 3.0)).unwrap(),
        );
        let p = ExtOUWithJumpsProcess::new(Arc::clone(&ou), 0.0, 5.0, 4.0, 2.0).unwrap();
        assert_eq!(p.initial_values(), [3.0, 0.0]);
        assert_eq!(p.beta(), 5.0);
        assert_eq!(p.jump_intensity(), 4.0);
        assert_eq!(p.eta(), 2.0);
        assert!(ExtOUWithJumpsProcess::new(ou, 0.0, 5.0, 4.0, 0.0).is_err());
    }
}

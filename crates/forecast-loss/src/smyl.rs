//! Composite Smyl loss for exponential-smoothing recurrent models.
//!
//! Combines the pinball loss at a target quantile `tau` with the level
//! variability penalty of the smoothing component:
//!
//! ```text
//! Loss = QuantileLoss(y, y_hat, mask, tau) [+ LevelVariabilityLoss(levels)]
//! ```
//!
//! The penalty term participates only when its weight is strictly
//! positive. A disabled penalty never inspects the levels tensor, so a
//! degenerate level sequence is accepted as long as the penalty is off.

use burn::{
    config::Config,
    module::Module,
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};
use thiserror::Error;

use crate::{
    level_variability::{LevelVariabilityLoss, LevelVariabilityLossConfig},
    quantile::{QuantileLoss, QuantileLossConfig},
};

/// Errors that can occur during Smyl loss computation.
#[derive(Debug, Error)]
pub enum SmylLossError {
    /// The level sequence is too short for the active variability penalty.
    #[error(
        "level sequence is too short for the variability penalty: need more than 2 time steps, got {actual}"
    )]
    LevelSequenceTooShort {
        /// Time steps present in the levels tensor.
        actual: usize,
    },
}

/// Configuration for the composite [Smyl loss](SmylLoss).
#[derive(Config, Debug)]
pub struct SmylLossConfig {
    /// Target quantile level for the pinball term, in (0, 1). Default: 0.5
    #[config(default = 0.5)]
    pub tau: f64,

    /// Strength of the level variability penalty; a non-positive value
    /// disables the term. Default: 0.0
    #[config(default = 0.0)]
    pub level_variability_penalty: f64,
}

impl SmylLossConfig {
    /// Initialize the composite [Smyl loss](SmylLoss).
    pub fn init(&self) -> SmylLoss {
        self.assertions();

        let quantile = QuantileLossConfig::new().with_q(self.tau).init();

        // The penalty component exists only when its weight is strictly
        // positive; a disabled penalty never validates the levels tensor.
        let level_penalty = (self.level_variability_penalty > 0.0)
            .then(|| LevelVariabilityLossConfig::new(self.level_variability_penalty).init());

        SmylLoss {
            quantile,
            level_penalty,
        }
    }

    fn assertions(&self) {
        assert!(
            self.tau > 0.0 && self.tau < 1.0,
            "Quantile level tau for SmylLoss must lie in (0, 1), got {}",
            self.tau
        );
    }
}

/// Composite Smyl loss.
///
/// Pinball loss at `tau` over the forecast window plus an optional
/// smoothness penalty on the exponential-smoothing levels.
#[derive(Module, Clone, Debug)]
pub struct SmylLoss {
    /// Pinball term at the configured `tau`.
    quantile: QuantileLoss,
    /// Level variability penalty, present only when enabled.
    level_penalty: Option<LevelVariabilityLoss>,
}

impl Default for SmylLoss {
    fn default() -> Self {
        SmylLossConfig::new().init()
    }
}

impl SmylLoss {
    /// Compute the composite loss.
    ///
    /// # Shapes
    ///
    /// - y: `[batch_size, horizon]`
    /// - y_hat: `[batch_size, horizon]`
    /// - levels: `[batch_size, n_time]`, inspected only when the penalty
    ///   is enabled (then `n_time > 2` and all entries positive)
    /// - mask: `[batch_size, horizon]` 0/1 entries, `None` means all-ones
    /// - output: `[1]`
    ///
    /// # Errors
    ///
    /// Returns [`SmylLossError::LevelSequenceTooShort`] when the penalty
    /// is enabled and `levels` has fewer than three time steps.
    pub fn forward<B: Backend>(
        &self,
        y: Tensor<B, 2>,
        y_hat: Tensor<B, 2>,
        levels: Tensor<B, 2>,
        mask: Option<Tensor<B, 2>>,
    ) -> Result<Tensor<B, 1>, SmylLossError> {
        let mut loss = self.quantile.forward(y, y_hat, mask, Reduction::Mean);

        if let Some(level_penalty) = &self.level_penalty {
            let [_, n_time] = levels.dims();
            if n_time <= 2 {
                return Err(SmylLossError::LevelSequenceTooShort { actual: n_time });
            }
            loss = loss + level_penalty.forward(levels);
        }

        Ok(loss)
    }
}

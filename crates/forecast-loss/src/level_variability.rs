//! Level variability penalty for exponential-smoothing levels.
//!
//! Regularizes the level sequence produced by the exponential-smoothing
//! component of a Holt-Winters-style recurrent model by penalizing
//! curvature in the log-level trajectory, which induces smooth trends.
//!
//! The loss is computed as:
//! ```text
//! d_t   = log(level_t) - log(level_{t+1})
//! Loss  = weight * mean((d_t - d_{t+1})^2)
//! ```
//!
//! A perfectly exponential level sequence (constant log-slope) has zero
//! second difference and incurs no penalty.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor},
};

/// Configuration for creating a [Level Variability penalty](LevelVariabilityLoss).
#[derive(Config, Debug)]
pub struct LevelVariabilityLossConfig {
    /// Penalty strength applied to the mean squared log-level curvature.
    pub weight: f64,
}

impl LevelVariabilityLossConfig {
    /// Initialize [Level Variability penalty](LevelVariabilityLoss).
    pub fn init(&self) -> LevelVariabilityLoss {
        self.assertions();
        LevelVariabilityLoss {
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Penalty weight for LevelVariabilityLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Level variability penalty.
///
/// Mean squared second difference of the log-level trajectory, scaled by
/// the penalty weight. A non-positive weight means the penalty is simply
/// not constructed (see [`SmylLoss`](crate::SmylLoss)), so every built
/// instance returns a non-negative value.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct LevelVariabilityLoss {
    /// Penalty strength.
    pub weight: f64,
}

impl ModuleDisplay for LevelVariabilityLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl LevelVariabilityLoss {
    /// Create a new level variability penalty with the given strength.
    pub fn new(weight: f64) -> Self {
        LevelVariabilityLossConfig::new(weight).init()
    }

    /// Compute the penalty, reduced to a scalar.
    ///
    /// The reduction (mean, then weight) is part of the definition, so
    /// there is no reduction argument.
    ///
    /// # Shapes
    ///
    /// - levels: `[batch_size, n_time]`, `n_time > 2`, strictly positive
    /// - output: `[1]`
    pub fn forward<B: Backend>(&self, levels: Tensor<B, 2>) -> Tensor<B, 1> {
        self.forward_no_reduction(levels)
            .mean()
            .mul_scalar(self.weight)
    }

    /// Compute the squared log-level curvature without reduction.
    ///
    /// # Shapes
    ///
    /// - levels: `[batch_size, n_time]`, `n_time > 2`, strictly positive
    /// - output: `[batch_size, n_time - 2]`
    pub fn forward_no_reduction<B: Backend>(&self, levels: Tensor<B, 2>) -> Tensor<B, 2> {
        self.assertions(&levels);

        let [batch_size, n_time] = levels.dims();
        let log_levels = levels.log();

        // First difference of the log levels along time
        let level_prev = log_levels.clone().slice([0..batch_size, 0..n_time - 1]);
        let level_next = log_levels.slice([0..batch_size, 1..n_time]);
        let log_diff = level_prev - level_next;

        // Second difference, squared
        let diff_prev = log_diff.clone().slice([0..batch_size, 0..n_time - 2]);
        let diff_next = log_diff.slice([0..batch_size, 1..n_time - 1]);

        (diff_prev - diff_next).powi_scalar(2.0)
    }

    fn assertions<B: Backend>(&self, levels: &Tensor<B, 2>) {
        let [_, n_time] = levels.dims();
        assert!(
            n_time > 2,
            "Level sequence length must exceed 2 for LevelVariabilityLoss, got {n_time}"
        );
    }
}

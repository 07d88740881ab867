//! Quantile (pinball) loss.
//!
//! Asymmetric loss for quantile regression: under-predictions are
//! penalized by the target quantile level `q`, over-predictions by
//! `1 - q`, so minimizing it estimates the conditional `q`-quantile.
//!
//! The unreduced loss can be described as:
//! ```text
//! delta_n = y_n - y_hat_n
//! l_n = max(q * delta_n, (q - 1) * delta_n) * mask_n
//! ```
//!
//! At `q = 0.5` this is half the absolute error, so the reduced loss
//! equals half the MAE.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

/// Configuration for creating a [Quantile loss](QuantileLoss).
#[derive(Config, Debug)]
pub struct QuantileLossConfig {
    /// Target quantile level, in (0, 1). Default: 0.5 (the median)
    #[config(default = 0.5)]
    pub q: f64,

    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl QuantileLossConfig {
    /// Initialize [Quantile loss](QuantileLoss).
    pub fn init(&self) -> QuantileLoss {
        self.assertions();
        QuantileLoss {
            q: self.q,
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.q > 0.0 && self.q < 1.0,
            "Quantile level for QuantileLoss must lie in (0, 1), got {}",
            self.q
        );
        assert!(
            self.weight > 0.0,
            "Weight for QuantileLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Quantile (pinball) loss.
///
/// Penalizes under-prediction by `q` and over-prediction by `1 - q`.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct QuantileLoss {
    /// Target quantile level.
    pub q: f64,
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl Default for QuantileLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for QuantileLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("q", &self.q)
            .add("weight", &self.weight)
            .optional()
    }
}

impl QuantileLoss {
    /// Create a new median (q = 0.5) quantile loss.
    pub fn new() -> Self {
        QuantileLossConfig::new().init()
    }

    /// Compute the criterion on the input tensor with reduction.
    ///
    /// # Shapes
    ///
    /// - y: `[...dims]` (any shape)
    /// - y_hat: `[...dims]` (same shape as y)
    /// - mask: `[...dims]` 0/1 entries, `None` means all-ones
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        y: Tensor<B, D>,
        y_hat: Tensor<B, D>,
        mask: Option<Tensor<B, D>>,
        reduction: Reduction,
    ) -> Tensor<B, 1> {
        let loss = self.forward_no_reduction(y, y_hat, mask);
        let reduced = match reduction {
            Reduction::Mean | Reduction::Auto => loss.mean(),
            Reduction::Sum => loss.sum(),
        };

        // Apply weight factor
        reduced.mul_scalar(self.weight)
    }

    /// Compute the criterion on the input tensor without reduction.
    ///
    /// # Shapes
    ///
    /// - y: `[...dims]` (any shape)
    /// - y_hat: `[...dims]` (same shape as y)
    /// - mask: `[...dims]` 0/1 entries, `None` means all-ones
    /// - output: `[...dims]` (same shape as input)
    pub fn forward_no_reduction<const D: usize, B: Backend>(
        &self,
        y: Tensor<B, D>,
        y_hat: Tensor<B, D>,
        mask: Option<Tensor<B, D>>,
    ) -> Tensor<B, D> {
        self.assertions(&y, &y_hat);

        let mask = mask.unwrap_or_else(|| y_hat.ones_like());

        // Pinball: max(q * delta, (q - 1) * delta)
        let delta_y = y - y_hat;
        let loss = delta_y
            .clone()
            .mul_scalar(self.q)
            .max_pair(delta_y.mul_scalar(self.q - 1.0));

        loss * mask
    }

    fn assertions<const D: usize, B: Backend>(&self, y: &Tensor<B, D>, y_hat: &Tensor<B, D>) {
        let y_dims = y.dims();
        let y_hat_dims = y_hat.dims();
        assert_eq!(
            y_dims, y_hat_dims,
            "Shape of actuals ({y_dims:?}) must match predictions ({y_hat_dims:?})"
        );
    }
}

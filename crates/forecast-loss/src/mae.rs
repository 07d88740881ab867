//! Mean Absolute Error (L1) loss.
//!
//! Measures the mean absolute deviation between predicted and actual
//! values, with an optional mask excluding individual time steps.
//!
//! The unreduced loss can be described as:
//! `L = {l_1, ..., l_N}` where `l_n = |y_n - y_hat_n| * mask_n`
//!
//! When reduction is applied:
//! - `'mean'`: `mean(L)`; masked-out steps contribute zero to the sum
//!   while the denominator still counts every element
//! - `'sum'`: `sum(L)`

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

/// Configuration for creating a [Mean Absolute Error loss](MaeLoss).
#[derive(Config, Debug)]
pub struct MaeLossConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl MaeLossConfig {
    /// Initialize [Mean Absolute Error loss](MaeLoss).
    pub fn init(&self) -> MaeLoss {
        self.assertions();
        MaeLoss {
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Weight for MaeLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Mean Absolute Error (L1) loss.
///
/// Calculates the mean absolute error between actual and predicted values.
/// Supports arbitrary tensor dimensions, optional step masking, and
/// reduction options.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct MaeLoss {
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl Default for MaeLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for MaeLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl MaeLoss {
    /// Create a new MAE loss with default configuration.
    pub fn new() -> Self {
        MaeLossConfig::new().init()
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

        // Absolute deviation: |y - y_hat|, masked per element
        (y - y_hat).abs() * mask
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

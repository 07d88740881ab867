//! Mean Absolute Percentage Error loss.
//!
//! Measures relative prediction accuracy by scaling each absolute error by
//! the magnitude of the actual value at that step.
//!
//! The unreduced loss can be described as:
//! ```text
//! l_n = |y_n - y_hat_n| * divide_no_nan(mask_n, |y_n|)
//! ```
//!
//! The mask is combined with the inverse actual magnitude before scaling
//! the error, so steps with a zero actual value contribute nothing instead
//! of an infinite percentage.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

use crate::util::divide_no_nan;

/// Configuration for creating a [Mean Absolute Percentage Error loss](MapeLoss).
#[derive(Config, Debug)]
pub struct MapeLossConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl MapeLossConfig {
    /// Initialize [Mean Absolute Percentage Error loss](MapeLoss).
    pub fn init(&self) -> MapeLoss {
        self.assertions();
        MapeLoss {
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Weight for MapeLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Mean Absolute Percentage Error loss.
///
/// Unbounded above for actual values near zero, unlike
/// [`SmapeLoss`](crate::SmapeLoss); zero actual values are excluded from
/// the loss entirely rather than producing NaN or infinite gradients.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct MapeLoss {
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl Default for MapeLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for MapeLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl MapeLoss {
    /// Create a new MAPE loss with default configuration.
    pub fn new() -> Self {
        MapeLossConfig::new().init()
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

        // Fold the inverse actual magnitude into the mask, zeroing steps
        // where the actual value is zero
        let scaled_mask = divide_no_nan(mask, y.clone().abs());

        (y - y_hat).abs() * scaled_mask
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

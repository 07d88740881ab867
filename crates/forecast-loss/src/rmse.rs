//! Root Mean Squared Error loss.
//!
//! The loss is computed as:
//! ```text
//! Loss = sqrt(mean(mask * (y - y_hat)^2))
//! ```
//!
//! The square root is applied to the already-reduced mean, not per element,
//! so the reduction is part of the definition and [`RmseLoss::forward`]
//! takes no reduction argument.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

use crate::mse::{MseLoss, MseLossConfig};

/// Configuration for creating a [Root Mean Squared Error loss](RmseLoss).
#[derive(Config, Debug)]
pub struct RmseLossConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl RmseLossConfig {
    /// Initialize [Root Mean Squared Error loss](RmseLoss).
    pub fn init(&self) -> RmseLoss {
        self.assertions();
        RmseLoss {
            weight: self.weight,
            mse: MseLossConfig::new().init(),
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Weight for RmseLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Root Mean Squared Error loss.
///
/// Square root of the masked mean squared error, built on top of
/// [`MseLoss`].
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct RmseLoss {
    /// Weight factor applied to the loss.
    pub weight: f64,
    /// Inner squared-error criterion.
    pub mse: MseLoss,
}

impl Default for RmseLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for RmseLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl RmseLoss {
    /// Create a new RMSE loss with default configuration.
    pub fn new() -> Self {
        RmseLossConfig::new().init()
    }

    /// Compute the criterion on the input tensor.
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
    ) -> Tensor<B, 1> {
        self.mse
            .forward(y, y_hat, mask, Reduction::Mean)
            .sqrt()
            .mul_scalar(self.weight)
    }

    /// Compute the masked squared errors before the mean-and-sqrt reduction.
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
        self.mse.forward_no_reduction(y, y_hat, mask)
    }
}

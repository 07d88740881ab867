//! Mean Absolute Scaled Error loss.
//!
//! Scales absolute forecast errors by the in-sample mean absolute error of
//! a seasonal-naive forecast, making errors comparable across series of
//! different magnitudes (Hyndman & Koehler 2006, as used in the M4
//! competition).
//!
//! The unreduced loss can be described as:
//! ```text
//! scale_b = mean_t(|y_insample[b, t] - y_insample[b, t - seasonality]|)
//! l_{b,t} = divide_no_nan(|y[b, t] - y_hat[b, t]|, scale_b) * mask[b, t]
//! ```

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

use crate::util::divide_no_nan;

/// Configuration for creating a [Mean Absolute Scaled Error loss](MaseLoss).
#[derive(Config, Debug)]
pub struct MaseLossConfig {
    /// Main frequency of the series, i.e. the seasonal-naive lag:
    /// hourly 24, daily 7, weekly 52, monthly 12, quarterly 4, yearly 1.
    pub seasonality: usize,

    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl MaseLossConfig {
    /// Initialize [Mean Absolute Scaled Error loss](MaseLoss).
    pub fn init(&self) -> MaseLoss {
        self.assertions();
        MaseLoss {
            seasonality: self.seasonality,
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.seasonality > 0,
            "Seasonality for MaseLoss must be positive, got {}",
            self.seasonality
        );
        assert!(
            self.weight > 0.0,
            "Weight for MaseLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Mean Absolute Scaled Error loss.
///
/// Divides each series' absolute errors by that series' seasonal-naive
/// scale estimated from its in-sample history. Series whose history is
/// constant at the seasonal lag get a zero scale and are excluded from the
/// loss rather than producing infinite values.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct MaseLoss {
    /// Seasonal-naive lag used for the in-sample scale.
    pub seasonality: usize,
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl ModuleDisplay for MaseLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("seasonality", &self.seasonality)
            .add("weight", &self.weight)
            .optional()
    }
}

impl MaseLoss {
    /// Create a new MASE loss for the given seasonality.
    pub fn new(seasonality: usize) -> Self {
        MaseLossConfig::new(seasonality).init()
    }

    /// Compute the criterion on the input tensor with reduction.
    ///
    /// # Shapes
    ///
    /// - y: `[batch_size, horizon]`
    /// - y_hat: `[batch_size, horizon]`
    /// - y_insample: `[batch_size, input_len]`, `input_len > seasonality`
    /// - mask: `[batch_size, horizon]` 0/1 entries, `None` means all-ones
    /// - output: `[1]`
    pub fn forward<B: Backend>(
        &self,
        y: Tensor<B, 2>,
        y_hat: Tensor<B, 2>,
        y_insample: Tensor<B, 2>,
        mask: Option<Tensor<B, 2>>,
        reduction: Reduction,
    ) -> Tensor<B, 1> {
        let loss = self.forward_no_reduction(y, y_hat, y_insample, mask);
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
    /// - y: `[batch_size, horizon]`
    /// - y_hat: `[batch_size, horizon]`
    /// - y_insample: `[batch_size, input_len]`, `input_len > seasonality`
    /// - mask: `[batch_size, horizon]` 0/1 entries, `None` means all-ones
    /// - output: `[batch_size, horizon]`
    pub fn forward_no_reduction<B: Backend>(
        &self,
        y: Tensor<B, 2>,
        y_hat: Tensor<B, 2>,
        y_insample: Tensor<B, 2>,
        mask: Option<Tensor<B, 2>>,
    ) -> Tensor<B, 2> {
        self.assertions(&y, &y_hat, &y_insample);

        let mask = mask.unwrap_or_else(|| y_hat.ones_like());

        // Seasonal-naive scale per series: mean absolute difference of the
        // in-sample history at the seasonal lag, shape [batch_size, 1]
        let [batch_size, input_len] = y_insample.dims();
        let lagged = y_insample
            .clone()
            .slice([0..batch_size, self.seasonality..input_len]);
        let base = y_insample.slice([0..batch_size, 0..input_len - self.seasonality]);
        let scale = (lagged - base).abs().mean_dim(1);

        let delta_y = (y - y_hat).abs();

        divide_no_nan(delta_y, scale) * mask
    }

    fn assertions<B: Backend>(
        &self,
        y: &Tensor<B, 2>,
        y_hat: &Tensor<B, 2>,
        y_insample: &Tensor<B, 2>,
    ) {
        let y_dims = y.dims();
        let y_hat_dims = y_hat.dims();
        assert_eq!(
            y_dims, y_hat_dims,
            "Shape of actuals ({y_dims:?}) must match predictions ({y_hat_dims:?})"
        );

        let [insample_batch, input_len] = y_insample.dims();
        assert_eq!(
            y_dims[0], insample_batch,
            "In-sample history batch ({insample_batch}) must match actuals batch ({})",
            y_dims[0]
        );
        assert!(
            input_len > self.seasonality,
            "In-sample length ({input_len}) must exceed the seasonality ({}) for MaseLoss",
            self.seasonality
        );
    }
}

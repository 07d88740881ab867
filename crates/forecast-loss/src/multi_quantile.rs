//! Multi-quantile (MQ) loss.
//!
//! Averages the pinball loss over a whole set of target quantiles, one
//! prediction channel per quantile, training all quantile heads of a
//! probabilistic forecaster at once.
//!
//! The loss is computed as:
//! ```text
//! error = y_hat - y.unsqueeze(-1)
//! under = max(-error, 0)
//! over  = max(error, 0)
//! term  = q * under + (1 - q) * over        (per quantile channel)
//! Loss  = mean(mean(term, horizon axis))
//! ```

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor, TensorData},
};

/// Configuration for creating a [Multi-Quantile loss](MultiQuantileLoss).
#[derive(Config, Debug)]
pub struct MultiQuantileLossConfig {
    /// Target quantile levels, each in (0, 1); at least two.
    pub quantiles: Vec<f64>,

    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl MultiQuantileLossConfig {
    /// Initialize [Multi-Quantile loss](MultiQuantileLoss).
    pub fn init(&self) -> MultiQuantileLoss {
        self.assertions();
        MultiQuantileLoss {
            quantiles: self.quantiles.clone(),
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.quantiles.len() > 1,
            "MultiQuantileLoss requires at least two quantiles, got {}",
            self.quantiles.len()
        );
        for &q in &self.quantiles {
            assert!(
                q > 0.0 && q < 1.0,
                "Quantiles for MultiQuantileLoss must lie in (0, 1), got {q}"
            );
        }
        assert!(
            self.weight > 0.0,
            "Weight for MultiQuantileLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Multi-quantile (MQ) loss.
///
/// Pinball loss per quantile channel, meaned over the horizon and then
/// over batch and channels.
///
/// Unlike [`WeightedMultiQuantileLoss`](crate::WeightedMultiQuantileLoss),
/// this loss accepts a mask **without applying it**: its reduction is a
/// plain mean over every element, with no masked-sum normalization the
/// mask could participate in. Callers that need masked multi-quantile
/// training should use the weighted variant.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct MultiQuantileLoss {
    /// Target quantile levels, one prediction channel each.
    pub quantiles: Vec<f64>,
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl ModuleDisplay for MultiQuantileLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("num_quantiles", &self.quantiles.len())
            .add("weight", &self.weight)
            .optional()
    }
}

impl MultiQuantileLoss {
    /// Create a new multi-quantile loss for the given quantile set.
    pub fn new(quantiles: Vec<f64>) -> Self {
        MultiQuantileLossConfig::new(quantiles).init()
    }

    /// Compute the criterion, reduced to a scalar.
    ///
    /// The two-stage reduction (horizon mean, then overall mean) is part
    /// of the definition, so there is no reduction argument.
    ///
    /// # Shapes
    ///
    /// - y: `[batch_size, horizon]`
    /// - y_hat: `[batch_size, horizon, n_quantiles]`
    /// - mask: accepted for signature parity with the weighted variant;
    ///   **not applied** (see the type-level docs)
    /// - output: `[1]`
    pub fn forward<B: Backend>(
        &self,
        y: Tensor<B, 2>,
        y_hat: Tensor<B, 3>,
        mask: Option<Tensor<B, 3>>,
    ) -> Tensor<B, 1> {
        self.assertions(&y, &y_hat);

        // Not part of this loss's reduction; see the type-level docs.
        let _ = mask;

        let device = y_hat.device();
        let quantiles = self.quantile_tensor::<B>(&device).unsqueeze::<3>();

        let error = y_hat - y.unsqueeze_dim::<3>(2);
        let under = (-error.clone()).clamp_min(0.0);
        let over = error.clamp_min(0.0);

        let complement = quantiles.ones_like() - quantiles.clone();
        let term = quantiles * under + complement * over;

        // Mean over the horizon first, then over batch and channels
        term.mean_dim(1).mean().mul_scalar(self.weight)
    }

    /// Quantile levels as a rank-1 tensor on the given device.
    fn quantile_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::from_data(
            TensorData::new(self.quantiles.clone(), [self.quantiles.len()]),
            device,
        )
    }

    fn assertions<B: Backend>(&self, y: &Tensor<B, 2>, y_hat: &Tensor<B, 3>) {
        let [batch_size, horizon] = y.dims();
        let [hat_batch, hat_horizon, hat_quantiles] = y_hat.dims();
        assert_eq!(
            [batch_size, horizon],
            [hat_batch, hat_horizon],
            "Leading dimensions of predictions ([{hat_batch}, {hat_horizon}]) must match actuals ([{batch_size}, {horizon}])"
        );
        assert_eq!(
            hat_quantiles,
            self.quantiles.len(),
            "Trailing dimension of predictions ({hat_quantiles}) must match the number of quantiles ({})",
            self.quantiles.len()
        );
    }
}

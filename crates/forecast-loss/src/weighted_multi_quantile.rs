//! Weighted multi-quantile (wMQ) loss.
//!
//! Multi-quantile pinball loss normalized, per series and quantile
//! channel, by the total masked magnitude of the actual values. This is a
//! scale-free variant that weighs every series equally regardless of its
//! level.
//!
//! The loss is computed as:
//! ```text
//! term  = q * max(-error, 0) + (1 - q) * max(error, 0)
//! Loss  = mean(divide_no_nan(sum_h(term * mask), sum_h(|y| * mask)))
//! ```

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor, TensorData},
};

use crate::util::divide_no_nan;

/// Configuration for creating a [weighted Multi-Quantile loss](WeightedMultiQuantileLoss).
#[derive(Config, Debug)]
pub struct WeightedMultiQuantileLossConfig {
    /// Target quantile levels, each in (0, 1); at least two.
    pub quantiles: Vec<f64>,

    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl WeightedMultiQuantileLossConfig {
    /// Initialize [weighted Multi-Quantile loss](WeightedMultiQuantileLoss).
    pub fn init(&self) -> WeightedMultiQuantileLoss {
        self.assertions();
        WeightedMultiQuantileLoss {
            quantiles: self.quantiles.clone(),
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.quantiles.len() > 1,
            "WeightedMultiQuantileLoss requires at least two quantiles, got {}",
            self.quantiles.len()
        );
        for &q in &self.quantiles {
            assert!(
                q > 0.0 && q < 1.0,
                "Quantiles for WeightedMultiQuantileLoss must lie in (0, 1), got {q}"
            );
        }
        assert!(
            self.weight > 0.0,
            "Weight for WeightedMultiQuantileLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Weighted multi-quantile (wMQ) loss.
///
/// The masked pinball sum of each series/channel pair is divided by that
/// pair's masked actual magnitude, with zero-magnitude series excluded
/// rather than dividing by zero. The mask participates in both sums,
/// unlike [`MultiQuantileLoss`](crate::MultiQuantileLoss) whose plain
/// mean ignores it, because this loss is defined in terms of masked sums.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct WeightedMultiQuantileLoss {
    /// Target quantile levels, one prediction channel each.
    pub quantiles: Vec<f64>,
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl ModuleDisplay for WeightedMultiQuantileLoss {
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

impl WeightedMultiQuantileLoss {
    /// Create a new weighted multi-quantile loss for the given quantile set.
    pub fn new(quantiles: Vec<f64>) -> Self {
        WeightedMultiQuantileLossConfig::new(quantiles).init()
    }

    /// Compute the criterion, reduced to a scalar.
    ///
    /// The reduction (masked horizon sums, safe ratio, overall mean) is
    /// part of the definition, so there is no reduction argument.
    ///
    /// # Shapes
    ///
    /// - y: `[batch_size, horizon]`
    /// - y_hat: `[batch_size, horizon, n_quantiles]`
    /// - mask: `[batch_size, horizon, n_quantiles]` 0/1 entries, `None`
    ///   means all-ones
    /// - output: `[1]`
    pub fn forward<B: Backend>(
        &self,
        y: Tensor<B, 2>,
        y_hat: Tensor<B, 3>,
        mask: Option<Tensor<B, 3>>,
    ) -> Tensor<B, 1> {
        self.assertions(&y, &y_hat);

        let mask = mask.unwrap_or_else(|| y_hat.ones_like());

        let device = y_hat.device();
        let quantiles = self.quantile_tensor::<B>(&device).unsqueeze::<3>();

        let y_broadcast = y.unsqueeze_dim::<3>(2);
        let error = y_hat - y_broadcast.clone();
        let under = (-error.clone()).clamp_min(0.0);
        let over = error.clamp_min(0.0);

        let complement = quantiles.ones_like() - quantiles.clone();
        let term = quantiles * under + complement * over;

        // Masked pinball sum over the horizon, normalized by the masked
        // actual magnitude of the same series and channel
        let numerator = (term * mask.clone()).sum_dim(1);
        let denominator = (y_broadcast.abs() * mask).sum_dim(1);

        divide_no_nan(numerator, denominator)
            .mean()
            .mul_scalar(self.weight)
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

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        tensor::{ops::FloatElem, TensorData, Tolerance, Transaction},
    };

    use super::*;

    type TestBackend = NdArray;
    type FT = FloatElem<TestBackend>;

    #[test]
    fn wmq_loss_forward_identical_tensors_returns_zero() {
        let device = Default::default();
        let loss = WeightedMultiQuantileLoss::new(vec![0.1, 0.9]);

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 2.0]]), &device);
        let y_hat = Tensor::<TestBackend, 3>::from_data(
            TensorData::from([[[1.0, 1.0], [2.0, 2.0]]]),
            &device,
        );

        let result = loss.forward(y, y_hat, None);

        let expected = TensorData::from([0.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    fn wmq_loss_forward_normalizes_by_masked_actual_magnitude() {
        let device = Default::default();
        let loss = WeightedMultiQuantileLoss::new(vec![0.1, 0.9]);

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 4.0]]), &device);
        let y_hat = Tensor::<TestBackend, 3>::from_data(
            TensorData::from([[[1.0, 1.0], [4.0, 4.0]]]),
            &device,
        );

        let result = loss.forward(y, y_hat, None);

        // Pinball sums per channel: (0.1, 0.9); |y| sum per channel: 6
        // Ratios (0.1/6, 0.9/6); mean = 1/12
        let expected = TensorData::from([1.0 / 12.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::relative(1e-4));
    }

    #[test]
    fn wmq_loss_forward_applies_the_mask_unlike_plain_variant() {
        let device = Default::default();
        let loss = WeightedMultiQuantileLoss::new(vec![0.1, 0.9]);

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 4.0]]), &device);
        let y_hat = Tensor::<TestBackend, 3>::from_data(
            TensorData::from([[[1.0, 1.0], [4.0, 4.0]]]),
            &device,
        );
        // Mask out the only erroneous horizon step.
        let mask = Tensor::<TestBackend, 3>::from_data(
            TensorData::from([[[0.0, 0.0], [1.0, 1.0]]]),
            &device,
        );

        let unmasked = loss.forward(y.clone(), y_hat.clone(), None);
        let masked = loss.forward(y, y_hat, Some(mask));

        let [unmasked_data, masked_data] = Transaction::default()
            .register(unmasked)
            .register(masked)
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        let expected_unmasked = TensorData::from([1.0 / 12.0]);
        unmasked_data.assert_approx_eq::<FT>(&expected_unmasked, Tolerance::relative(1e-4));

        // Only the error-free step survives: numerators are zero.
        let expected_masked = TensorData::from([0.0]);
        masked_data.assert_approx_eq::<FT>(&expected_masked, Tolerance::default());
    }

    #[test]
    fn wmq_loss_forward_is_invariant_to_series_scale() {
        let device = Default::default();
        let loss = WeightedMultiQuantileLoss::new(vec![0.1, 0.9]);

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 4.0]]), &device);
        let y_hat = Tensor::<TestBackend, 3>::from_data(
            TensorData::from([[[1.0, 1.0], [4.0, 4.0]]]),
            &device,
        );

        let base = loss.forward(y.clone(), y_hat.clone(), None);
        let scaled = loss.forward(y.mul_scalar(10.0), y_hat.mul_scalar(10.0), None);

        let [base_data, scaled_data] = Transaction::default()
            .register(base)
            .register(scaled)
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        // Both the pinball sums and the magnitude sums scale linearly, so
        // the ratio is unchanged.
        base_data.assert_approx_eq::<FT>(&scaled_data, Tolerance::relative(1e-4));
    }

    #[test]
    #[should_panic = "WeightedMultiQuantileLoss requires at least two quantiles"]
    fn wmq_loss_config_single_quantile_panics() {
        let _loss = WeightedMultiQuantileLossConfig::new(vec![0.9]).init();
    }

    #[test]
    fn wmq_loss_display_shows_channel_count_and_weight() {
        let config = WeightedMultiQuantileLossConfig::new(vec![0.1, 0.5, 0.9]).with_weight(0.5);
        let loss = config.init();

        assert_eq!(
            format!("{loss}"),
            "WeightedMultiQuantileLoss {num_quantiles: 3, weight: 0.5}"
        );
    }
}

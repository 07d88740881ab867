//! Mean Squared Error (L2) loss.
//!
//! Measures the mean squared deviation between predicted and actual
//! values, with an optional mask excluding individual time steps.
//!
//! The unreduced loss can be described as:
//! `L = {l_1, ..., l_N}` where `l_n = (y_n - y_hat_n)^2 * mask_n`
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

/// Configuration for creating a [Mean Squared Error loss](MseLoss).
#[derive(Config, Debug)]
pub struct MseLossConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl MseLossConfig {
    /// Initialize [Mean Squared Error loss](MseLoss).
    pub fn init(&self) -> MseLoss {
        self.assertions();
        MseLoss {
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Weight for MseLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Mean Squared Error (L2) loss.
///
/// Calculates the mean squared error between actual and predicted values.
/// Supports arbitrary tensor dimensions, optional step masking, and
/// reduction options.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct MseLoss {
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl Default for MseLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for MseLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl MseLoss {
    /// Create a new MSE loss with default configuration.
    pub fn new() -> Self {
        MseLossConfig::new().init()
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

        // Squared deviation: (y - y_hat)^2, masked per element
        (y - y_hat).powi_scalar(2.0) * mask
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
    fn mse_loss_forward_identical_tensors_returns_zero() {
        let device = Default::default();
        let loss = MseLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 2.0], [3.0, 4.0]]),
            &device,
        );
        let y_hat = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 2.0], [3.0, 4.0]]),
            &device,
        );

        let result = loss.forward(y, y_hat, None, Reduction::Mean);

        let expected = TensorData::from([0.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    fn mse_loss_forward_computes_correct_mean_and_sum() {
        let device = Default::default();
        let loss = MseLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[3.0, -1.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[3.0, 1.0]]), &device);

        let result_mean = loss.forward(y.clone(), y_hat.clone(), None, Reduction::Mean);
        let result_sum = loss.forward(y, y_hat, None, Reduction::Sum);

        let [result_mean_data, result_sum_data] = Transaction::default()
            .register(result_mean)
            .register(result_sum)
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        // (3-3)^2 = 0, (-1-1)^2 = 4; mean = 2.0, sum = 4.0
        let expected_mean = TensorData::from([2.0]);
        result_mean_data.assert_approx_eq::<FT>(&expected_mean, Tolerance::default());

        let expected_sum = TensorData::from([4.0]);
        result_sum_data.assert_approx_eq::<FT>(&expected_sum, Tolerance::default());
    }

    #[test]
    fn mse_loss_forward_masked_steps_only_lower_the_result() {
        let device = Default::default();
        let loss = MseLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 2.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 4.0]]), &device);
        let mask = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 0.0]]), &device);

        let unmasked = loss.forward(y.clone(), y_hat.clone(), None, Reduction::Mean);
        let masked = loss.forward(y, y_hat, Some(mask), Reduction::Mean);

        let [unmasked_data, masked_data] = Transaction::default()
            .register(unmasked)
            .register(masked)
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        // Unmasked: mean(1, 4) = 2.5; masked: mean(1, 0) = 0.5
        let expected_unmasked = TensorData::from([2.5]);
        unmasked_data.assert_approx_eq::<FT>(&expected_unmasked, Tolerance::default());

        let expected_masked = TensorData::from([0.5]);
        masked_data.assert_approx_eq::<FT>(&expected_masked, Tolerance::default());
    }

    #[test]
    fn mse_loss_with_custom_weight_multiplies_result() {
        let device = Default::default();
        let config = MseLossConfig::new().with_weight(3.0);
        let loss = config.init();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 2.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[3.0, 2.0]]), &device);

        let result = loss.forward(y, y_hat, None, Reduction::Mean);

        // (1-3)^2 = 4, (2-2)^2 = 0; mean = 2.0, weight = 3.0 -> 6.0
        let expected = TensorData::from([6.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    #[should_panic = "Weight for MseLoss must be positive"]
    fn mse_loss_config_zero_weight_panics() {
        let _loss = MseLossConfig::new().with_weight(0.0).init();
    }

    #[test]
    fn mse_loss_display_shows_weight_parameter() {
        let config = MseLossConfig::new().with_weight(0.5);
        let loss = config.init();

        assert_eq!(format!("{loss}"), "MseLoss {weight: 0.5}");
    }
}

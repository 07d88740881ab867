//! Symmetric Mean Absolute Percentage Error loss.
//!
//! Scales each absolute error by the sum of the absolute actual and
//! predicted values, which bounds the per-step loss to [0, 2] regardless
//! of the scale of the series (Makridakis 1993).
//!
//! The unreduced loss can be described as:
//! ```text
//! l_n = 2 * divide_no_nan(|y_n - y_hat_n|, |y_n| + |y_hat_n|) * mask_n
//! ```

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

use crate::util::divide_no_nan;

/// Configuration for creating a [Symmetric MAPE loss](SmapeLoss).
#[derive(Config, Debug)]
pub struct SmapeLossConfig {
    /// Weight factor for the loss. Default: 1.0
    #[config(default = 1.0)]
    pub weight: f64,
}

impl SmapeLossConfig {
    /// Initialize [Symmetric MAPE loss](SmapeLoss).
    pub fn init(&self) -> SmapeLoss {
        self.assertions();
        SmapeLoss {
            weight: self.weight,
        }
    }

    fn assertions(&self) {
        assert!(
            self.weight > 0.0,
            "Weight for SmapeLoss must be positive, got {}",
            self.weight
        );
    }
}

/// Symmetric Mean Absolute Percentage Error loss.
///
/// Bounded in [0, 2], which keeps it defined where plain MAPE blows up;
/// steps where both the actual and predicted values are zero contribute
/// nothing.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct SmapeLoss {
    /// Weight factor applied to the loss.
    pub weight: f64,
}

impl Default for SmapeLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for SmapeLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("weight", &self.weight).optional()
    }
}

impl SmapeLoss {
    /// Create a new SMAPE loss with default configuration.
    pub fn new() -> Self {
        SmapeLossConfig::new().init()
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
    /// The factor 2 is applied per element, so the output already lies in
    /// [0, 2].
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

        let delta_y = (y.clone() - y_hat.clone()).abs();
        let scale = y.abs() + y_hat.abs();

        divide_no_nan(delta_y, scale).mul_scalar(2.0) * mask
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
        tensor::{ops::FloatElem, TensorData, Tolerance},
    };

    use super::*;

    type TestBackend = NdArray;
    type FT = FloatElem<TestBackend>;

    #[test]
    fn smape_loss_forward_identical_tensors_returns_zero() {
        let device = Default::default();
        let loss = SmapeLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, -2.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, -2.0]]), &device);

        let result = loss.forward(y, y_hat, None, Reduction::Mean);

        let expected = TensorData::from([0.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    fn smape_loss_forward_zero_pairs_contribute_nothing() {
        let device = Default::default();
        let loss = SmapeLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 0.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 0.0]]), &device);

        let result = loss.forward(y, y_hat, None, Reduction::Mean);

        // First step: 2 * 1/3; second step: 0/0 -> 0; mean = 1/3
        let expected = TensorData::from([1.0 / 3.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::relative(1e-4));
    }

    #[test]
    fn smape_loss_forward_opposite_signs_hit_the_upper_bound() {
        let device = Default::default();
        let loss = SmapeLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[-1.0]]), &device);

        let result = loss.forward(y, y_hat, None, Reduction::Mean);

        // 2 * |1 - (-1)| / (|1| + |-1|) = 2, the upper bound of the range
        let expected = TensorData::from([2.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    fn smape_loss_forward_masked_steps_only_lower_the_result() {
        let device = Default::default();
        let loss = SmapeLoss::new();

        let y = Tensor::<TestBackend, 2>::from_data(TensorData::from([[2.0, 4.0]]), &device);
        let y_hat = Tensor::<TestBackend, 2>::from_data(TensorData::from([[1.0, 4.0]]), &device);
        let mask = Tensor::<TestBackend, 2>::from_data(TensorData::from([[0.0, 1.0]]), &device);

        let result = loss.forward(y, y_hat, Some(mask), Reduction::Mean);

        // The only erroneous step is masked out: mean(0, 0) = 0
        let expected = TensorData::from([0.0]);
        result
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::default());
    }

    #[test]
    #[should_panic = "Weight for SmapeLoss must be positive"]
    fn smape_loss_config_negative_weight_panics() {
        let _loss = SmapeLossConfig::new().with_weight(-1.0).init();
    }

    #[test]
    fn smape_loss_display_shows_weight_parameter() {
        let config = SmapeLossConfig::new().with_weight(0.5);
        let loss = config.init();

        assert_eq!(format!("{loss}"), "SmapeLoss {weight: 0.5}");
    }
}

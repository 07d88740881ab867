//! Shared numeric helpers for the loss functions.

use burn::tensor::{backend::Backend, Tensor};

/// Elementwise division that never produces NaN or infinite values.
///
/// Computes `numerator / denominator` and rewrites every NaN (0/0) and
/// every infinite entry (x/0, either sign) to zero. Percentage-style and
/// scale-normalized losses route their denominators through this helper so
/// that a zero-valued series contributes nothing to the loss instead of
/// poisoning the whole batch's gradient with NaN/Inf.
///
/// The inputs follow burn's broadcasting rules; the output has the shape
/// of the broadcast quotient.
pub fn divide_no_nan<B: Backend, const D: usize>(
    numerator: Tensor<B, D>,
    denominator: Tensor<B, D>,
) -> Tensor<B, D> {
    let div = numerator / denominator;
    let nan_mask = div.clone().is_nan();
    let div = div.mask_fill(nan_mask, 0.0);
    let inf_mask = div.clone().is_inf();
    div.mask_fill(inf_mask, 0.0)
}

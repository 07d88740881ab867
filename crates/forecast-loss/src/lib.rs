//! Loss functions for time-series forecasting model training.
//!
//! This crate provides the training criteria used by neural forecasting
//! models built on the Burn deep learning framework: point-forecast
//! errors, quantile-regression losses, and a smoothness regularizer for
//! exponential-smoothing recurrent models. All losses are pure,
//! backend-agnostic tensor computations.
//!
//! ## Point-Forecast Losses
//! - **[`MaeLoss`]**: Mean Absolute Error, robust scale-dependent baseline
//! - **[`MseLoss`]**: Mean Squared Error for variance-sensitive training
//! - **[`RmseLoss`]**: Root Mean Squared Error on the original scale
//! - **[`MapeLoss`]**: Mean Absolute Percentage Error, scale-free
//! - **[`SmapeLoss`]**: Symmetric MAPE, bounded in [0, 2]
//! - **[`MaseLoss`]**: Mean Absolute Scaled Error against a seasonal-naive
//!   in-sample scale
//!
//! ### Quantile Losses
//! - **[`QuantileLoss`]**: pinball loss for a single target quantile
//! - **[`MultiQuantileLoss`]**: averaged pinball loss over a quantile set
//! - **[`WeightedMultiQuantileLoss`]**: multi-quantile loss normalized by
//!   the masked magnitude of each series
//!
//! ### Regularization and Composites
//! - **[`LevelVariabilityLoss`]**: curvature penalty on exponential-smoothing
//!   levels
//! - **[`SmylLoss`]**: pinball loss plus the optional level penalty
//!
//! ## Key Features
//!
//! - **Backend Agnostic**: Works with any Burn backend (CPU, GPU, etc.)
//! - **Masking**: every criterion takes an optional 0/1 step mask;
//!   masked-out steps contribute zero instead of distorting the average
//! - **Safe Division**: zero-valued series are excluded from
//!   percentage-style losses via [`divide_no_nan`] rather than producing
//!   NaN or infinite gradients
//! - **Configurable**: per-loss options via the `Config` trait
//! - **Type Safe**: compile-time dimension checking and tensor type safety
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_loss::{MaeLoss, MaeLossConfig, QuantileLoss, QuantileLossConfig};
//!
//! fn point_and_quantile_criteria() -> (MaeLoss, QuantileLoss) {
//!     let mae = MaeLossConfig::new().init();
//!     let p90 = QuantileLossConfig::new().with_q(0.9).init();
//!     (mae, p90)
//! }
//! ```
//!
//! Each elementwise loss follows Burn's standard criterion pattern with a
//! `forward` (reduced) and `forward_no_reduction` method; losses whose
//! reduction is part of their definition (RMSE, the multi-quantile
//! variants, the level penalty) expose `forward` only in reduced form.
//!
//! One asymmetry is preserved deliberately: [`MultiQuantileLoss`] accepts
//! a mask without applying it, while [`WeightedMultiQuantileLoss`] is
//! defined in terms of masked sums and honors it. See the respective type
//! docs before relying on masked multi-quantile training.

mod level_variability;
mod mae;
mod mape;
mod mase;
mod mse;
mod multi_quantile;
mod quantile;
mod rmse;
mod smape;
mod smyl;
mod util;
mod weighted_multi_quantile;

// Re-export core loss functions and configurations
pub use level_variability::{LevelVariabilityLoss, LevelVariabilityLossConfig};
pub use mae::{MaeLoss, MaeLossConfig};
pub use mape::{MapeLoss, MapeLossConfig};
pub use mase::{MaseLoss, MaseLossConfig};
pub use mse::{MseLoss, MseLossConfig};
pub use multi_quantile::{MultiQuantileLoss, MultiQuantileLossConfig};
pub use quantile::{QuantileLoss, QuantileLossConfig};
pub use rmse::{RmseLoss, RmseLossConfig};
pub use smape::{SmapeLoss, SmapeLossConfig};
pub use smyl::{SmylLoss, SmylLossConfig, SmylLossError};
pub use util::divide_no_nan;
pub use weighted_multi_quantile::{WeightedMultiQuantileLoss, WeightedMultiQuantileLossConfig};

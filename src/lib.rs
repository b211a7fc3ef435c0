//! Speech signal processing kernels: pitch extraction, LPC/LSP/PARCOR and
//! mel-cepstral conversions, MLSA stability checks, Gaussian mixture
//! modeling and the raw double stream codec that links them.
pub mod consts;
pub mod conversion;
pub mod error;
pub mod gmm;
pub mod io;
pub mod math;
pub mod pitch;
pub mod stability;
pub mod statistics;
pub mod utils;
pub use error::{Result, SptkError};

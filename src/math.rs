pub mod durand_kerner;
pub mod fft;
pub mod levinson;
pub mod polyfit;
pub mod solvers;
pub mod symmetric_matrix;

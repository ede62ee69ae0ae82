//! Pure computational kernels: spherical geometry and exposure estimation.

pub mod exposure;
pub mod geometry;

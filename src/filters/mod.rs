//! Multi-target tracking filters
//!
//! - [`phd::GmPhdFilter`]: Gaussian Mixture PHD filter

pub mod phd;

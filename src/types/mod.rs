//! Core types: Gaussian components, mixtures and linear-Gaussian kernels

pub mod gaussian;
pub mod transforms;

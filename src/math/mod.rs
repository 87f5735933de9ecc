pub mod kolmogorov;
pub mod stats;

//! Technical indicators built on `common::math`.

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;

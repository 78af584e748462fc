//! Market structure: support/resistance, retracement levels, candle shapes

pub mod candle_pattern;
pub mod fibonacci;
pub mod support_resistance;

pub use candle_pattern::*;
pub use fibonacci::*;
pub use support_resistance::*;

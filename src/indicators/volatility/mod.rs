//! Volatility indicators: Bollinger Bands, ATR, Keltner channel

pub mod atr;
pub mod bollinger;
pub mod keltner;

pub use atr::*;
pub use bollinger::*;
pub use keltner::*;

//! Volume indicators: VWAP, volume profile

pub mod volume_profile;
pub mod vwap;

pub use volume_profile::*;
pub use vwap::*;

//! The three independent tier analyzers.

pub mod macro_direction;
pub mod scalping;
pub mod trend;

pub use macro_direction::MacroAnalyzer;
pub use scalping::ScalpingAnalyzer;
pub use trend::TrendAnalyzer;

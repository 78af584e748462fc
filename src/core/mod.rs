//! Operational surface: HTTP endpoints and the cycle scheduler

pub mod http;
pub mod scheduler;

pub use http::*;
pub use scheduler::*;

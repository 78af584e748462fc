//! Persistence adapters

pub mod questdb;

pub use questdb::QuestExecutionTracker;

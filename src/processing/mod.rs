//! Conversion Pipeline

pub mod batch;
pub mod engine;
pub mod planner;

pub use batch::{BatchReport, BatchWalker};
pub use engine::{ConversionEngine, ConversionOutcome};
pub use planner::{FileTask, PathPlanner};

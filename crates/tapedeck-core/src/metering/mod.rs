//! Block timing.

mod deadline;

pub use deadline::{DeadlineMeter, DeadlineMetrics};

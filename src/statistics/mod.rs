//! Statistics which are gathered by the constraint engine and the plan database.
mod statistic_logging;

pub use statistic_logging::*;

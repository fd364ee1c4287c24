//! Configuration module for plotter-motion.
//!
//! Provides types for loading and validating the machine description from
//! TOML files (with `std` feature) or pre-parsed data, and for deriving the
//! runtime constraints the planner and engine consume.

mod constraints;
mod machine;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use constraints::{MachineConstraints, PEN_DWELL_FEED};
pub use machine::{
    DriveConfig, HomingConfig, MachineConfig, PenConfig, PlannerConfig, SpoolConfig, TimerConfig,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microsteps, Millimeters, Steps, StepsPerSec};

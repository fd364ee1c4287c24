//! # plotter-motion
//!
//! Segment-buffered Bresenham motion control for stepper-driven pen
//! plotters, with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Segment queue**: bounded lock-free SPSC ring between the foreground
//!   planner and the timer-interrupt step engine
//! - **Bresenham stepping**: integer-only multi-axis pulse generation, one
//!   dominant-axis step per timer tick
//! - **Arc decomposition**: bounded-chord splitting with exact endpoint snap
//! - **embedded-hal 1.0**: `OutputPin`/`InputPin` for step, dir, enable and
//!   limit pins, `DelayNs` for the pulse width
//! - **Persisted calibration**: versioned spool-diameter record with
//!   defaults fallback
//! - **no_std compatible**: the core runs without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plotter_motion::{
//!     MachineConfig, MachineConstraints, Millimeters, Planner, SegmentQueue,
//!     StepEngine, StepsPerSec, TickScheduler,
//! };
//!
//! // Load the machine description from TOML
//! let config = plotter_motion::load_config("machine.toml")?;
//! let constraints = MachineConstraints::<3>::from_config(&config, spool_diameters);
//!
//! // Split the queue between foreground and interrupt contexts
//! let mut queue = SegmentQueue::<3, 32>::new();
//! let (producer, mut consumer) = queue.split();
//!
//! let mut planner = Planner::new(producer, constraints);
//! let mut engine = StepEngine::<3>::new(
//!     TickScheduler::new(config.timer.clock_hz, config.timer.max_reload),
//!     config.homing.limit_switches,
//! );
//!
//! // Foreground: queue work
//! planner.move_line(target, StepsPerSec(800))?;
//!
//! // Timer interrupt: one tick per dominant-axis step
//! engine.tick(&mut consumer, &mut backend, &mut pen, &mut timer);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing, and the simulation
//!   backend
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod motion;
pub mod planner;
pub mod storage;

// Re-exports for ergonomic API
pub use config::{validate_config, MachineConfig, MachineConstraints};
pub use error::{Error, Result};
pub use motion::{
    ArcChords, ArcDirection, Direction, Fault, Segment, SegmentQueue, Status, StepEngine, Tick,
    TickScheduler,
};
pub use planner::{PenState, Planner};
pub use storage::{CalibrationRecord, CalibrationSource, CalibrationStore, NvStorage};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Microsteps, Millimeters, Steps, StepsPerSec};

/// Number of axes on the reference machine (two spool motors plus one
/// auxiliary axis).
pub const NUM_AXES: usize = 3;

/// Default segment queue depth for the reference machine. A queue of this
/// depth holds `MAX_SEGMENTS - 1` pending segments.
pub const MAX_SEGMENTS: usize = 32;

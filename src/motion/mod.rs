//! Motion module for plotter-motion.
//!
//! Provides the segment queue, the Bresenham step engine, the tick period
//! scheduler, and arc decomposition.

mod arc;
mod axis;
mod buffer;
mod engine;
mod segment;
mod timer;

pub use arc::{ArcChords, ArcDirection};
pub use axis::{AxisMove, Direction};
pub use buffer::{SegmentConsumer, SegmentProducer, SegmentQueue};
pub use engine::{EngineStats, Fault, Status, StepEngine, Tick};
pub use segment::{PenAction, Segment};
pub use timer::{Reload, TickScheduler};

//! Dialogue Event Log
//!
//! Sinks that receive every structured event the simulator emits. The host
//! owns the sink; the simulator only records into it.

pub mod logger;

pub use logger::*;

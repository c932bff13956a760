//! Core traits and types for cycle-accurate emulation.
//!
//! Every component counts time in master clock cycles. Processors are driven
//! by a scheduler through a run-until contract; everything else is inspected
//! through [`Observable`].

mod cpu;
mod observable;

pub use cpu::Processor;
pub use observable::{Observable, Value, parse_address};

//! Processor run-until contract.

/// A processor driven by a line-based scheduler.
///
/// The scheduler never steps a processor instruction by instruction. It asks
/// it to run until a master-cycle target and the processor performs all of
/// its bus accesses (port reads and writes on `B`) along the way. Stalls are
/// modelled by the device pushing the processor's cycle counter forward, so
/// a processor must re-read [`Processor::cycles`] after every access that can
/// stall it.
///
/// Cycle counters are frame-relative: the scheduler subtracts the frame
/// length at each frame boundary with [`Processor::rebase`].
pub trait Processor<B: ?Sized> {
    /// Current master-cycle counter.
    fn cycles(&self) -> u32;

    /// Overwrite the master-cycle counter.
    ///
    /// Used for DMA freezes and frame rebasing.
    fn set_cycles(&mut self, cycles: u32);

    /// Execute until the cycle counter reaches at least `to_cycle`.
    ///
    /// Returns the cycle actually reached, which may overshoot the target by
    /// part of an instruction.
    fn run(&mut self, to_cycle: u32, bus: &mut B) -> u32;

    /// Whether the processor is currently allowed to execute.
    ///
    /// A processor held in reset or with its bus taken away still has its
    /// counter advanced by the scheduler.
    fn is_running(&self) -> bool {
        true
    }

    /// Subtract a frame's worth of cycles from the counter.
    ///
    /// Wrapping keeps an overshoot past the frame end intact.
    fn rebase(&mut self, frame_cycles: u32) {
        let cycles = self.cycles().wrapping_sub(frame_cycles);
        self.set_cycles(cycles);
    }
}

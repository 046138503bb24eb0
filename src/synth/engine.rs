use fixed::types::U24F8;

use super::buffers::WaveformBuffers;

/// The streaming hardware the controller drives: one PIO state machine feeding two RF
/// pins, and a data/control DMA channel pair that keeps it supplied.
///
/// The controller only rewrites buffer contents between a confirmed halt and the next
/// [`arm`](StreamEngine::arm).
pub trait StreamEngine {
    /// True from `arm` until `release`.
    fn is_streaming(&self) -> bool;

    /// Clears the enable bits of both channels so a chained restart cannot re-trigger.
    fn disable_triggers(&mut self);

    /// Requests an abort of both channels.
    fn abort(&mut self);

    /// True while either channel still reports busy.
    fn is_busy(&self) -> bool;

    /// Gives up the channels after a confirmed halt.
    fn release(&mut self);

    /// Stops the state machine and frees its program, if one is loaded.
    fn unload_program(&mut self);

    /// Loads the square-wave program at the given PIO clock divider.
    fn load_clock_divider(&mut self, divider: U24F8);

    /// Loads the 2-bits-per-clock serializer program.
    fn load_serializer(&mut self);

    /// Starts streaming `buffers`, beginning with the silent buffer.
    fn arm<const CAP: usize>(&mut self, buffers: &WaveformBuffers<CAP>);

    /// Switches the RF pins between driven and high-Z. Used for keying in CLKDIV mode.
    fn set_pins_driven(&mut self, driven: bool);

    /// Hands the RF pins back to the PIO after something else drove them directly.
    fn restore_out_pins(&mut self);
}

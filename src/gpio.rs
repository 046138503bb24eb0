use embassy_rp::gpio::Output;

use crate::synth::Indicator;

/// The key-down LED / PA-enable line. High while transmitting.
impl Indicator for Output<'static> {
    fn set_active(&mut self, active: bool) {
        if active {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

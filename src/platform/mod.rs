/**
 * Platform I/O
 *
 * The narrow surface the control loop needs from the board:
 * one analog input, one PWM output, a byte-oriented serial link,
 * a status indicator, a monotonic millisecond clock and a bounded sleep.
 *
 * Adapters:
 * - SimPlatform: virtual clock + simulated steering rack, used in tests
 * - SerialPlatform: real serial link, wall clock, simulated rack
 */

pub mod rack;
pub mod serial;
pub mod sim;

pub use rack::RackModel;
pub use serial::SerialPlatform;
pub use sim::SimPlatform;

pub trait Platform{
    /// Analog input as a fraction of the reference voltage, in [0, 1].
    fn read_analog(&mut self) -> f32;

    /// Sets the PWM pulse width in microseconds.
    fn write_pwm(&mut self, pulse_width_us: u32);

    fn set_pwm_period_ms(&mut self, period_ms: u32);

    /// Next received byte, `None` when nothing is waiting. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    fn write_text(&mut self, text: &str);

    fn toggle_indicator(&mut self);

    /// Monotonic milliseconds since the platform was created.
    fn now_ms(&mut self) -> u64;

    fn sleep_ms(&mut self, ms: u64);
}

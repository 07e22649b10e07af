/**
 * Actuator Driver
 *
 * Converts a normalized steering drive in [-1, 1] to a servo-style
 * pulse width. The drive is first held inside a safety envelope narrower
 * than full range, then mapped linearly onto [pulse_min, pulse_max].
 * Zero drive is the midpoint pulse (neutral).
 */

use tracing::warn;

use crate::config::ControllerConfig;
use crate::math::{clamp, linear_remap};
use crate::platform::Platform;

#[derive(Debug, Clone, Copy)]
pub struct ActuatorDriver{
    pub pulse_min_us: u32,
    pub pulse_max_us: u32,
    /// Symmetric bound on the drive before mapping.
    pub drive_limit: f32,
    pub period_ms: u32,
}

impl Default for ActuatorDriver{
    fn default() -> Self{
        Self{
            pulse_min_us: 1250,
            pulse_max_us: 1750,
            drive_limit: 0.83,
            period_ms: 16,
        }
    }
}

impl ActuatorDriver{
    pub fn from_config(config: &ControllerConfig) -> Self{
        Self{
            pulse_min_us: config.pwm_pulse_min_us,
            pulse_max_us: config.pwm_pulse_max_us,
            drive_limit: config.drive_limit,
            period_ms: config.pwm_period_ms,
        }
    }

    //an inverted range maps everything to pulse_min
    pub fn pulse_range_us(&self) -> u32{
        self.pulse_max_us.saturating_sub(self.pulse_min_us)
    }

    /// Pulse width for a drive value. NaN is treated as 0,
    /// infinities saturate at the envelope.
    pub fn pulse_width_for(&self, drive: f32) -> u32{
        let drive = if drive.is_nan(){
            warn!("nan drive, using neutral");
            0.0
        }else{
            drive
        };
        let x = clamp(drive, -self.drive_limit, self.drive_limit);
        let x = linear_remap(x, -1.0, 1.0, 0.0, 1.0);
        (self.pulse_min_us as f32 + self.pulse_range_us() as f32 * x) as u32
    }

    pub fn neutral_pulse_us(&self) -> u32{
        self.pulse_width_for(0.0)
    }

    /// Lowest and highest pulse the envelope allows.
    pub fn reachable_range_us(&self) -> (u32, u32){
        (self.pulse_width_for(-1.0), self.pulse_width_for(1.0))
    }

    /// Sets the PWM period, call once before the first drive.
    pub fn init<P: Platform>(&self, platform: &mut P){
        platform.set_pwm_period_ms(self.period_ms);
    }

    /// Writes the pulse for `drive` and returns it.
    pub fn drive<P: Platform>(&self, platform: &mut P, drive: f32) -> u32{
        let width = self.pulse_width_for(drive);
        platform.write_pwm(width);
        width
    }

    pub fn neutral<P: Platform>(&self, platform: &mut P) -> u32{
        self.drive(platform, 0.0)
    }
}

/**
 * Steering Rack Model
 *
 * First-order stand-in for the actuator + potentiometer pair.
 * The pulse width sets the rack velocity (neutral pulse = no motion),
 * the rack position is reported as a pot voltage fraction.
 */

use crate::math::{clamp, linear_remap};

#[derive(Debug, Clone)]
pub struct RackModel{
    /// Rack position, -1 full left, 1 full right.
    pub position: f32,
    /// Position change per second at full drive.
    pub slew_per_s: f32,
    pub pot_min: f32,
    pub pot_max: f32,
    pub neutral_us: f32,
    pub half_range_us: f32,
    pulse_us: u32,
}

impl Default for RackModel{
    fn default() -> Self{
        Self{
            position: 0.0,
            slew_per_s: 4.0,
            pot_min: 0.18,
            pot_max: 0.91,
            neutral_us: 1500.0,
            half_range_us: 250.0,
            pulse_us: 1500,
        }
    }
}

impl RackModel{
    pub fn with_position(mut self, position: f32) -> Self{
        self.position = clamp(position, -1.0, 1.0);
        self
    }

    pub fn with_pot_range(mut self, pot_min: f32, pot_max: f32) -> Self{
        self.pot_min = pot_min;
        self.pot_max = pot_max;
        self
    }

    pub fn with_slew(mut self, slew_per_s: f32) -> Self{
        self.slew_per_s = slew_per_s;
        self
    }

    pub fn set_pulse(&mut self, pulse_us: u32){
        self.pulse_us = pulse_us;
    }

    pub fn pulse(&self) -> u32{
        self.pulse_us
    }

    //normalized drive implied by the current pulse
    pub fn drive(&self) -> f32{
        clamp((self.pulse_us as f32 - self.neutral_us) / self.half_range_us, -1.0, 1.0)
    }

    pub fn advance(&mut self, dt_ms: u64){
        let dt = dt_ms as f32 / 1000.0;
        self.position = clamp(self.position + self.drive() * self.slew_per_s * dt, -1.0, 1.0);
    }

    //pot voltage fraction for the current position
    pub fn pot_reading(&self) -> f32{
        clamp(linear_remap(self.position, -1.0, 1.0, self.pot_min, self.pot_max), 0.0, 1.0)
    }
}

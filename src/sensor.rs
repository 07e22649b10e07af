use crate::math::{clamp, linear_remap};
use crate::platform::Platform;

/// Maps the steering pot onto a heading in [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct HeadingSensor{
    pot_min: f32,
    pot_max: f32,
}

/// One pot sample and the heading derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingReading{
    pub pot: f32,
    pub heading: f32,
}

impl Default for HeadingSensor{
    fn default() -> Self{
        Self::new(0.18, 0.91)
    }
}

impl HeadingSensor{
    pub fn new(pot_min: f32, pot_max: f32) -> Self{
        HeadingSensor{ pot_min, pot_max }
    }

    //readings outside the calibrated range saturate
    pub fn heading_from_pot(&self, pot: f32) -> f32{
        clamp(linear_remap(pot, self.pot_min, self.pot_max, -1.0, 1.0), -1.0, 1.0)
    }

    pub fn read<P: Platform>(&self, platform: &mut P) -> HeadingReading{
        let pot = platform.read_analog();
        HeadingReading{ pot, heading: self.heading_from_pot(pot) }
    }

    pub fn current_heading<P: Platform>(&self, platform: &mut P) -> f32{
        self.read(platform).heading
    }
}

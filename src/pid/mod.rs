//! Steering PID with a fixed-window integral.
//!
//! The integral term is the plain sum of the last `history_len` errors,
//! one sample per control cycle, not scaled by time. The derivative is
//! the error change divided by the elapsed milliseconds.

use serde::Deserialize;
use tracing::{trace, warn};

use crate::math::clamp;
use crate::ring_buffer::RingBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidGains{
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

impl Default for PidGains{
    fn default() -> Self{
        Self{ p: 0.7, i: 0.0, d: 2.0 }
    }
}

impl PidGains{
    pub fn is_finite(&self) -> bool{
        self.p.is_finite() && self.i.is_finite() && self.d.is_finite()
    }
}

pub struct PidController{
    history: RingBuffer<f32>,
    last_error: f32,
    last_update_ms: u64,
}

impl PidController{
    /// `start_ms` is the reference time for the first derivative step.
    pub fn new(history_len: usize, start_ms: u64) -> Self{
        Self{
            history: RingBuffer::new(history_len),
            last_error: 0.0,
            last_update_ms: start_ms,
        }
    }

    /// Clamped correction in [-1, 1] for one control cycle.
    ///
    /// When no time has passed since the previous update the derivative
    /// contribution is skipped for this cycle. A NaN result collapses to 0,
    /// an infinite one saturates like any other out-of-range value.
    pub fn correction(&mut self, gains: &PidGains, desired: f32, measured: f32, now_ms: u64) -> f32{
        let error = desired - measured;

        self.history.push(error);
        let integral = self.history.sum();

        let d_error = error - self.last_error;
        self.last_error = error;

        let dt = now_ms.saturating_sub(self.last_update_ms) as f32;
        self.last_update_ms = now_ms;

        let derivative = if dt > 0.0{
            gains.d * d_error / dt
        }else{
            0.0
        };

        let output = gains.p * error + gains.i * integral + derivative;
        trace!(error, integral, d_error, dt, output, "pid update");

        if output.is_nan(){
            warn!(error, integral, d_error, dt, "nan pid output, holding neutral");
            return 0.0;
        }
        clamp(output, -1.0, 1.0)
    }

    /// Clears the error history and last error. The timestamp is kept.
    pub fn reset(&mut self){
        self.history.clear();
        self.last_error = 0.0;
    }

    pub fn integral(&self) -> f32{
        self.history.sum()
    }

    pub fn last_error(&self) -> f32{
        self.last_error
    }

    pub fn last_update_ms(&self) -> u64{
        self.last_update_ms
    }

    pub fn history_len(&self) -> usize{
        self.history.capacity()
    }

    /// Updates since construction or the last reset.
    pub fn samples(&self) -> u64{
        self.history.latest_epoch()
    }
}

//! Controller tuning and timing constants.
//!
//! Every value has a built-in default matching the steering rig, so a
//! config file is optional. The file format is TOML with the field names
//! below; missing fields keep their defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pid::PidGains;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig{
    /// Fixed control period in milliseconds.
    pub main_loop_ms: u64,
    /// Time without a heading frame before the actuator is centered.
    pub timeout_ms: u64,
    /// Added to `timeout_ms` for the one-time startup grace sleep.
    pub startup_margin_ms: u64,

    pub pwm_period_ms: u32,
    pub pwm_pulse_min_us: u32,
    pub pwm_pulse_max_us: u32,
    /// Symmetric limit applied to the normalized drive before PWM mapping.
    pub drive_limit: f32,

    /// Pot reading at full left.
    pub pot_min: f32,
    /// Pot reading at full right.
    pub pot_max: f32,

    pub history_len: usize,
    pub gains: PidGains,
    /// Clear the PID error history when the link times out.
    pub reset_history_on_timeout: bool,
}

impl Default for ControllerConfig{
    fn default() -> Self{
        Self{
            main_loop_ms: 25,
            timeout_ms: 500,
            startup_margin_ms: 50,
            pwm_period_ms: 16,
            pwm_pulse_min_us: 1250,
            pwm_pulse_max_us: 1750,
            drive_limit: 0.83,
            pot_min: 0.18,
            pot_max: 0.91,
            history_len: 20,
            gains: PidGains::default(),
            reset_history_on_timeout: false,
        }
    }
}

impl ControllerConfig{
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self>{
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self>{
        let config: ControllerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()>{
        if self.main_loop_ms == 0{
            return Err(Error::InvalidConfig("main_loop_ms must be positive".to_string()));
        }
        if self.timeout_ms == 0{
            return Err(Error::InvalidConfig("timeout_ms must be positive".to_string()));
        }
        if self.pwm_period_ms == 0{
            return Err(Error::InvalidConfig("pwm_period_ms must be positive".to_string()));
        }
        if self.pwm_pulse_min_us >= self.pwm_pulse_max_us{
            return Err(Error::InvalidConfig(format!(
                "pwm_pulse_min_us {} must be below pwm_pulse_max_us {}",
                self.pwm_pulse_min_us, self.pwm_pulse_max_us
            )));
        }
        if self.pwm_pulse_max_us > self.pwm_period_ms * 1000{
            return Err(Error::InvalidConfig(format!(
                "pwm_pulse_max_us {} does not fit in a {} ms period",
                self.pwm_pulse_max_us, self.pwm_period_ms
            )));
        }
        if !(self.drive_limit > 0.0 && self.drive_limit <= 1.0){
            return Err(Error::InvalidConfig(format!(
                "drive_limit {} must be in (0, 1]",
                self.drive_limit
            )));
        }
        if !(self.pot_min.is_finite() && self.pot_max.is_finite() && self.pot_min < self.pot_max){
            return Err(Error::InvalidConfig(format!(
                "pot_min {} must be below pot_max {}",
                self.pot_min, self.pot_max
            )));
        }
        if self.history_len == 0{
            return Err(Error::InvalidConfig("history_len must be positive".to_string()));
        }
        if !self.gains.is_finite(){
            return Err(Error::InvalidConfig(format!("gains {:?} must be finite", self.gains)));
        }
        Ok(())
    }

    pub fn startup_grace_ms(&self) -> u64{
        self.timeout_ms + self.startup_margin_ms
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_defaults_are_valid(){
        let cfg = ControllerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.startup_grace_ms(), 550);
        assert_eq!(cfg.gains, PidGains{ p: 0.7, i: 0.0, d: 2.0 });
    }

    #[test]
    fn test_partial_toml_keeps_defaults(){
        let cfg = ControllerConfig::from_toml("timeout_ms = 300\n[gains]\np = 1.5\n").unwrap();
        assert_eq!(cfg.timeout_ms, 300);
        assert_eq!(cfg.main_loop_ms, 25);
        assert_eq!(cfg.gains.p, 1.5);
        assert_eq!(cfg.gains.d, 2.0);
    }

    #[test]
    fn test_rejects_inverted_pot_range(){
        let err = ControllerConfig::from_toml("pot_min = 0.9\npot_max = 0.1\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_history(){
        let cfg = ControllerConfig{ history_len: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_drive_limit(){
        let cfg = ControllerConfig{ drive_limit: 1.2, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_parse_error(){
        let err = ControllerConfig::from_toml("timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}

use crate::config::ControllerConfig;
use crate::pid::{PidController, PidGains};

/// Targets and tuning received over the link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState{
    /// Target heading. Not clamped on input.
    pub desired_heading: f32,
    pub gains: PidGains,
    /// Set by the parser when a gains frame landed in the current poll.
    pub gains_updated_this_poll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState{
    StartupGrace,
    Active,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogState{
    /// Time of the last heading frame (or of startup).
    pub last_message_ms: u64,
    pub link: LinkState,
}

impl WatchdogState{
    pub fn new(start_ms: u64) -> Self{
        WatchdogState{ last_message_ms: start_ms, link: LinkState::StartupGrace }
    }

    pub fn message_received(&mut self, now_ms: u64){
        self.last_message_ms = now_ms;
    }

    //active only inside the window after the last heading frame
    //and never before timeout_ms of uptime
    pub fn evaluate(&self, now_ms: u64, timeout_ms: u64) -> LinkState{
        if now_ms < self.last_message_ms + timeout_ms && now_ms > timeout_ms{
            LinkState::Active
        }else{
            LinkState::TimedOut
        }
    }
}

/// All mutable controller state, owned by the main loop.
pub struct ControllerContext{
    pub control: ControlState,
    pub pid: PidController,
    pub watchdog: WatchdogState,
}

impl ControllerContext{
    pub fn new(config: &ControllerConfig, start_ms: u64) -> Self{
        ControllerContext{
            control: ControlState{
                desired_heading: 0.0,
                gains: config.gains,
                gains_updated_this_poll: false,
            },
            pid: PidController::new(config.history_len, start_ms),
            watchdog: WatchdogState::new(start_ms),
        }
    }
}

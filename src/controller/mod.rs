/**
 * Steering Controller
 *
 * Fixed-period loop that ties everything together:
 * 1. Poll the link for heading / gain frames
 * 2. Refresh the watchdog on heading frames
 * 3. Active: read the pot, run the PID, drive the actuator
 *    Timed out: drive neutral
 * 4. Report status on cycles that carried a heading frame
 * 5. Sleep whatever is left of the period
 *
 * A one-time startup grace sleep precedes the first cycle.
 */

pub mod context;
pub mod status;

pub use context::{ControlState, ControllerContext, LinkState, WatchdogState};

use tracing::{debug, info, trace};

use crate::actuator::ActuatorDriver;
use crate::command::{CommandParser, PollResult};
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::platform::Platform;
use crate::sensor::{HeadingReading, HeadingSensor};

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport{
    pub now_ms: u64,
    pub link: LinkState,
    pub poll: PollResult,
    /// PID output, 0 when timed out.
    pub drive: f32,
    pub pulse_us: u32,
    /// Pot sample taken this cycle, if any.
    pub reading: Option<HeadingReading>,
}

pub struct SteeringController<P: Platform>{
    platform: P,
    config: ControllerConfig,
    ctx: ControllerContext,
    parser: CommandParser,
    sensor: HeadingSensor,
    actuator: ActuatorDriver,
}

impl<P: Platform> SteeringController<P>{
    pub fn new(mut platform: P, config: ControllerConfig) -> Result<Self>{
        config.validate()?;

        let start_ms = platform.now_ms();
        Ok(Self{
            ctx: ControllerContext::new(&config, start_ms),
            parser: CommandParser::new(),
            sensor: HeadingSensor::new(config.pot_min, config.pot_max),
            actuator: ActuatorDriver::from_config(&config),
            platform,
            config,
        })
    }

    pub fn platform(&self) -> &P{
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P{
        &mut self.platform
    }

    pub fn into_platform(self) -> P{
        self.platform
    }

    pub fn context(&self) -> &ControllerContext{
        &self.ctx
    }

    pub fn config(&self) -> &ControllerConfig{
        &self.config
    }

    pub fn link_state(&self) -> LinkState{
        self.ctx.watchdog.link
    }

    /// Configures the PWM and sleeps out the startup grace period.
    pub fn startup(&mut self){
        self.actuator.init(&mut self.platform);

        let grace = self.config.startup_grace_ms();
        info!(grace_ms = grace, "startup grace");
        self.platform.sleep_ms(grace);
    }

    /// One control cycle without the trailing sleep.
    pub fn step(&mut self) -> CycleReport{
        let now_ms = self.platform.now_ms();

        let poll = self.parser.poll(&mut self.platform, &mut self.ctx.control);
        if poll.heading_received{
            self.platform.toggle_indicator();
            self.ctx.watchdog.message_received(now_ms);
        }

        let link = self.ctx.watchdog.evaluate(now_ms, self.config.timeout_ms);
        self.transition(link, now_ms);

        let gains_updated = self.ctx.control.gains_updated_this_poll;
        let report = match link{
            LinkState::Active =>{
                let reading = self.sensor.read(&mut self.platform);
                let pid_now = self.platform.now_ms();
                let drive = self.ctx.pid.correction(
                    &self.ctx.control.gains,
                    self.ctx.control.desired_heading,
                    reading.heading,
                    pid_now,
                );
                let pulse_us = self.actuator.drive(&mut self.platform, drive);

                if poll.heading_received{
                    let line = status::active_line(
                        reading.pot,
                        reading.heading,
                        self.ctx.control.desired_heading,
                        drive,
                        gains_updated,
                    );
                    self.platform.write_text(&line);
                }
                CycleReport{ now_ms, link, poll, drive, pulse_us, reading: Some(reading) }
            }
            _ =>{
                let pulse_us = self.actuator.neutral(&mut self.platform);

                let mut reading = None;
                if poll.heading_received{
                    let sample = self.sensor.read(&mut self.platform);
                    self.platform.write_text(&status::timeout_line(sample.pot, gains_updated));
                    reading = Some(sample);
                }
                CycleReport{ now_ms, link, poll, drive: 0.0, pulse_us, reading }
            }
        };

        trace!(?report, "cycle");
        report
    }

    /// Sleeps the rest of the period that began at `cycle_start_ms`.
    pub fn sleep_remainder(&mut self, cycle_start_ms: u64){
        let elapsed = self.platform.now_ms().saturating_sub(cycle_start_ms);
        if elapsed < self.config.main_loop_ms{
            self.platform.sleep_ms(self.config.main_loop_ms - elapsed);
        }else{
            debug!(elapsed_ms = elapsed, "cycle overran its period");
        }
    }

    /// One full period: step then sleep.
    pub fn tick(&mut self) -> CycleReport{
        let report = self.step();
        self.sleep_remainder(report.now_ms);
        report
    }

    /// Startup followed by `cycles` periods.
    pub fn run_cycles(&mut self, cycles: usize) -> Vec<CycleReport>{
        self.startup();
        (0..cycles).map(|_| self.tick()).collect()
    }

    /// Startup then one period after another until `keep_going` rejects
    /// a cycle. The actuator is left at neutral on return.
    pub fn run_until<F>(&mut self, mut keep_going: F)
    where
        F: FnMut(&CycleReport) -> bool,
    {
        self.startup();

        while keep_going(&self.tick()){}

        self.actuator.neutral(&mut self.platform);
        info!("controller stopped, actuator neutral");
    }

    /// Runs until power-off.
    pub fn run(&mut self){
        self.run_until(|_| true);
    }

    fn transition(&mut self, link: LinkState, now_ms: u64){
        let previous = self.ctx.watchdog.link;
        if previous == link{
            return;
        }
        self.ctx.watchdog.link = link;

        match link{
            LinkState::Active => info!(now_ms, "link active"),
            LinkState::TimedOut =>{
                info!(now_ms, last_message_ms = self.ctx.watchdog.last_message_ms, "link timed out, centering");
                if self.config.reset_history_on_timeout && previous == LinkState::Active{
                    self.ctx.pid.reset();
                    debug!("pid history cleared");
                }
            }
            LinkState::StartupGrace => {}
        }
    }
}

/**
 * Steering Controller Binary
 *
 * Runs the closed steering loop:
 * 1. Takes heading / gain frames over the serial link
 * 2. Reads the (simulated) steering pot
 * 3. Drives the (simulated) steering actuator
 * 4. Centers the actuator when the link goes quiet
 *
 * Usage: steering_controller [--port PATH] [--baud N] [--config FILE] [--sim] [--cycles N]
 */

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use steerloop::{ControllerConfig, RackModel, SerialPlatform, SimPlatform, SteeringController};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli{
    /// Serial device carrying the command link.
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: String,

    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// TOML file overriding the built-in tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without a serial port, feeding a scripted heading sweep.
    #[arg(long)]
    sim: bool,

    /// Stop after this many control cycles.
    #[arg(long)]
    cycles: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>>{
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steerloop=info,steering_controller=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config{
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };
    let rack = RackModel::default().with_pot_range(config.pot_min, config.pot_max);

    if cli.sim{
        run_sim(config, rack, cli.cycles.unwrap_or(400))
    }else{
        info!(port = %cli.port, baud = cli.baud, "opening serial link");
        let platform = SerialPlatform::new(&cli.port, cli.baud, rack)?;
        let mut controller = SteeringController::new(platform, config)?;

        match cli.cycles{
            Some(n) =>{
                controller.run_cycles(n);
            }
            None => controller.run(),
        }
        Ok(())
    }
}

//sweep the target left and right every second, then go quiet
fn run_sim(config: ControllerConfig, rack: RackModel, cycles: usize) -> Result<(), Box<dyn std::error::Error>>{
    let mut platform = SimPlatform::new(rack);
    let grace = config.startup_grace_ms();
    let period = config.main_loop_ms;
    let sweep_cycles = cycles / 2;

    for n in 0..sweep_cycles as u64{
        let target = if (n * period / 1000) % 2 == 0 { 0.5 } else { -0.5 };
        platform.schedule_bytes(grace + n * period, format!("${}", target).as_bytes());
    }

    let mut controller = SteeringController::new(platform, config)?;
    for report in controller.run_cycles(cycles).iter().step_by(20){
        info!(
            t_ms = report.now_ms,
            link = ?report.link,
            drive = report.drive,
            pulse_us = report.pulse_us,
            "sim"
        );
    }

    print!("{}", controller.platform().output());
    Ok(())
}

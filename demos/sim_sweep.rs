/**
 * Step Response on the Simulated Rack
 *
 * Sends one heading frame, lets the loop settle, then goes silent and
 * shows the watchdog centering the actuator.
 *
 * Run: cargo run --example sim_sweep -- [target] [P I D]
 */

use steerloop::{ControllerConfig, LinkState, PidGains, SimPlatform, SteeringController};

fn main(){
    let args: Vec<String> = std::env::args().collect();
    let target: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0.6);
    let gains = match (args.get(2), args.get(3), args.get(4)){
        (Some(p), Some(i), Some(d)) => PidGains{
            p: p.parse().unwrap_or(0.7),
            i: i.parse().unwrap_or(0.0),
            d: d.parse().unwrap_or(2.0),
        },
        _ => PidGains::default(),
    };

    let config = ControllerConfig{ gains, ..ControllerConfig::default() };
    let mut platform = SimPlatform::default();
    platform.schedule_bytes(config.startup_grace_ms(), format!("${}", target).as_bytes());

    let mut controller = SteeringController::new(platform, config).expect("default config is valid");
    let reports = controller.run_cycles(40);

    println!("==============================================");
    println!("  Step to {:.2} with P={} I={} D={}", target, gains.p, gains.i, gains.d);
    println!("==============================================");
    println!("{:>6}  {:>8}  {:>8}  {:>7}  {:>5}", "t_ms", "heading", "drive", "pulse", "link");

    for r in &reports{
        let heading = r.reading.map(|h| format!("{:8.3}", h.heading)).unwrap_or_else(|| "       -".to_string());
        let link = match r.link{
            LinkState::Active => "on",
            LinkState::TimedOut => "TO",
            LinkState::StartupGrace => "--",
        };
        println!("{:>6}  {}  {:8.3}  {:>7}  {:>5}", r.now_ms, heading, r.drive, r.pulse_us, link);
    }

    println!("\nfinal rack position: {:.3}", controller.platform().rack().position);
    print!("{}", controller.platform().output());
}

use steerloop::{
    ControllerConfig, CycleReport, LinkState, RackModel, SimPlatform, SteeringController,
};

const GRACE_MS: u64 = 550;
const PERIOD_MS: u64 = 25;
const TIMEOUT_MS: u64 = 500;

fn controller_with_rack(rack: RackModel) -> SteeringController<SimPlatform>{
    SteeringController::new(SimPlatform::new(rack), ControllerConfig::default()).unwrap()
}

#[test]
fn test_single_center_command_then_silence(){
    let mut ctl = controller_with_rack(RackModel::default().with_position(0.6));
    ctl.platform_mut().schedule_bytes(GRACE_MS, b"$0.0");

    let reports = ctl.run_cycles(60);
    let last_message = GRACE_MS;

    let (active, rest): (Vec<&CycleReport>, Vec<&CycleReport>) = reports
        .iter()
        .partition(|r| r.now_ms < last_message + TIMEOUT_MS);

    //inside the window the loop steers back toward center
    assert_eq!(active.len(), 20);
    assert!(active.iter().all(|r| r.link == LinkState::Active));
    assert!(active.iter().all(|r| r.pulse_us < 1500));
    let headings: Vec<f32> = active.iter().map(|r| r.reading.unwrap().heading).collect();
    for pair in headings.windows(2){
        assert!(pair[1] < pair[0], "heading should shrink: {:?}", pair);
    }
    assert!(headings[headings.len() - 1] < 0.3);

    //after the window the actuator is neutral and stays there
    assert!(!rest.is_empty());
    assert!(rest.iter().all(|r| r.link == LinkState::TimedOut && r.pulse_us == 1500));

    let parked = ctl.platform().rack().position;
    let later = ctl.tick();
    assert_eq!(later.pulse_us, 1500);
    assert_eq!(ctl.platform().rack().position, parked);
}

#[test]
fn test_timeout_overrides_saturated_pid(){
    let mut ctl = controller_with_rack(RackModel::default().with_position(-1.0).with_slew(0.0));
    ctl.platform_mut().schedule_bytes(GRACE_MS, b"$1.0");

    let reports = ctl.run_cycles(40);

    let first = &reports[0];
    assert_eq!(first.link, LinkState::Active);
    assert_eq!(first.drive, 1.0);
    assert_eq!(first.pulse_us, ctl.platform().pwm_writes()[0].1);
    assert!(first.pulse_us > 1700 && first.pulse_us <= 1750);

    for r in reports.iter().filter(|r| r.now_ms >= GRACE_MS + TIMEOUT_MS){
        assert_eq!(r.link, LinkState::TimedOut);
        assert_eq!(r.pulse_us, 1500);
    }
}

#[test]
fn test_refreshed_link_stays_active(){
    let mut ctl = controller_with_rack(RackModel::default());
    let last_frame = GRACE_MS + 2000;
    let mut t = GRACE_MS;
    while t <= last_frame{
        ctl.platform_mut().schedule_bytes(t, b"$0.3");
        t += 200;
    }

    let reports = ctl.run_cycles(140);

    for r in &reports{
        let expected = if r.now_ms < last_frame + TIMEOUT_MS{
            LinkState::Active
        }else{
            LinkState::TimedOut
        };
        assert_eq!(r.link, expected, "at {} ms", r.now_ms);
    }

    let heading_cycles = reports.iter().filter(|r| r.poll.heading_received).count();
    assert_eq!(heading_cycles, 11);
    assert_eq!(ctl.platform().output().matches("\r\n").count(), 11);
    assert!(ctl.platform().output().lines().all(|l| l.starts_with("$pot = ")));
}

#[test]
fn test_tracks_target_under_steady_commands(){
    let mut ctl = controller_with_rack(RackModel::default());
    for n in 0..30u64{
        ctl.platform_mut().schedule_bytes(GRACE_MS + n * 100, b"$0.5");
    }

    let reports = ctl.run_cycles(120);
    let last = reports[reports.len() - 1];

    assert_eq!(last.link, LinkState::Active);
    let heading = last.reading.unwrap().heading;
    assert!((heading - 0.5).abs() < 0.05, "heading {}", heading);
}

#[test]
fn test_zero_gains_over_link_hold_neutral(){
    let mut ctl = controller_with_rack(RackModel::default());
    ctl.platform_mut().schedule_bytes(GRACE_MS, b"#0,0,0$0.8");

    let reports = ctl.run_cycles(10);

    assert!(reports.iter().all(|r| r.link == LinkState::Active));
    assert!(reports.iter().all(|r| r.pulse_us == 1500));
    assert!(ctl.platform().output().ends_with(", PID values updated\r\n"));
}

#[test]
fn test_garbage_on_link_is_harmless(){
    let mut ctl = controller_with_rack(RackModel::default());
    ctl.platform_mut().schedule_bytes(GRACE_MS, b"zz$x#1,,2\xff\x00");

    let reports = ctl.run_cycles(5);

    assert!(reports.iter().all(|r| r.link == LinkState::TimedOut && r.pulse_us == 1500));
    assert_eq!(ctl.context().control.gains.p, 0.7);
    assert_eq!(ctl.context().control.desired_heading, 0.0);
    assert!(ctl.platform().output().is_empty());
}

#[test]
fn test_fixed_period_schedule(){
    let mut ctl = controller_with_rack(RackModel::default());
    let reports = ctl.run_cycles(8);

    for (n, r) in reports.iter().enumerate(){
        assert_eq!(r.now_ms, GRACE_MS + n as u64 * PERIOD_MS);
    }
}

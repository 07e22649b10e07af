//status lines written back on the link, one per cycle that carried a heading frame

const GAINS_SUFFIX: &str = ", PID values updated";
const LINE_END: &str = "\r\n";

pub fn active_line(pot: f32, heading: f32, target: f32, drive: f32, gains_updated: bool) -> String{
    format!(
        "$pot = {:.2}, heading = {:.2}, target = {:.2}, drive = {:.2}{}{}",
        pot,
        heading,
        target,
        drive,
        if gains_updated { GAINS_SUFFIX } else { "" },
        LINE_END
    )
}

pub fn timeout_line(pot: f32, gains_updated: bool) -> String{
    format!(
        "$[timeout] pot={:.2}{}{}",
        pot,
        if gains_updated { GAINS_SUFFIX } else { "" },
        LINE_END
    )
}

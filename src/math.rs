//clamp x into [lo, hi]
//NaN collapses to lo, callers that care about NaN must check before
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32{
    x.max(lo).min(hi)
}

//affine map of x from [x1, x2] onto [y1, y2], no saturation
pub fn linear_remap(x: f32, x1: f32, x2: f32, y1: f32, y2: f32) -> f32{
    let proportion = (x - x1) / (x2 - x1);
    y1 + proportion * (y2 - y1)
}

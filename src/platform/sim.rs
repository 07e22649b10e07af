use std::collections::VecDeque;

use super::{Platform, RackModel};

/// Deterministic platform: time only moves when the loop sleeps
/// (or when a test calls `advance`), inbound bytes are scripted.
pub struct SimPlatform{
    now_ms: u64,
    rx: VecDeque<u8>,
    scheduled: Vec<(u64, Vec<u8>)>,  //(release time, bytes), sorted by time
    tx: String,
    rack: RackModel,
    analog_override: Option<f32>,
    pwm_period_ms: Option<u32>,
    pwm_writes: Vec<(u64, u32)>,
    indicator: bool,
}

impl Default for SimPlatform{
    fn default() -> Self{
        Self::new(RackModel::default())
    }
}

impl SimPlatform{
    pub fn new(rack: RackModel) -> Self{
        SimPlatform{
            now_ms: 0,
            rx: VecDeque::new(),
            scheduled: Vec::new(),
            tx: String::new(),
            rack,
            analog_override: None,
            pwm_period_ms: None,
            pwm_writes: Vec::new(),
            indicator: false,
        }
    }

    /// Bytes available to the next read.
    pub fn queue_bytes(&mut self, bytes: &[u8]){
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes that arrive once the clock reaches `at_ms`, in one burst.
    pub fn schedule_bytes(&mut self, at_ms: u64, bytes: &[u8]){
        let pos = self.scheduled.partition_point(|(t, _)| *t <= at_ms);
        self.scheduled.insert(pos, (at_ms, bytes.to_vec()));
    }

    /// Pins the analog reading, bypassing the rack.
    pub fn set_analog(&mut self, reading: Option<f32>){
        self.analog_override = reading;
    }

    pub fn advance(&mut self, ms: u64){
        self.rack.advance(ms);
        self.now_ms += ms;
    }

    pub fn rack(&self) -> &RackModel{
        &self.rack
    }

    pub fn pwm_writes(&self) -> &[(u64, u32)]{
        &self.pwm_writes
    }

    pub fn last_pulse(&self) -> Option<u32>{
        self.pwm_writes.last().map(|&(_, us)| us)
    }

    pub fn pwm_period_ms(&self) -> Option<u32>{
        self.pwm_period_ms
    }

    pub fn indicator(&self) -> bool{
        self.indicator
    }

    /// Everything written to the link so far.
    pub fn output(&self) -> &str{
        &self.tx
    }

    pub fn take_output(&mut self) -> String{
        std::mem::take(&mut self.tx)
    }

    pub fn pending_rx(&self) -> usize{
        self.rx.len()
    }

    fn release_due(&mut self){
        let due = self.scheduled.partition_point(|(t, _)| *t <= self.now_ms);
        for (_, bytes) in self.scheduled.drain(..due){
            self.rx.extend(bytes);
        }
    }
}

impl Platform for SimPlatform{
    fn read_analog(&mut self) -> f32{
        self.analog_override.unwrap_or_else(|| self.rack.pot_reading())
    }

    fn write_pwm(&mut self, pulse_width_us: u32){
        self.rack.set_pulse(pulse_width_us);
        self.pwm_writes.push((self.now_ms, pulse_width_us));
    }

    fn set_pwm_period_ms(&mut self, period_ms: u32){
        self.pwm_period_ms = Some(period_ms);
    }

    fn read_byte(&mut self) -> Option<u8>{
        self.release_due();
        self.rx.pop_front()
    }

    fn write_text(&mut self, text: &str){
        self.tx.push_str(text);
    }

    fn toggle_indicator(&mut self){
        self.indicator = !self.indicator;
    }

    fn now_ms(&mut self) -> u64{
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u64){
        self.advance(ms);
    }
}

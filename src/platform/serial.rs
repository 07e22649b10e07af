use std::collections::VecDeque;
use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use serialport::SerialPort;
use tracing::{debug, warn};

use super::{Platform, RackModel};
use crate::error::Result;

/// Host adapter: command/status link on a real serial port, wall-clock
/// timing, and the rack model in place of the pot and actuator pins.
pub struct SerialPlatform{
    port: Box<dyn SerialPort>,
    rx_buffer: VecDeque<u8>,
    epoch: Instant,
    rack: RackModel,
    rack_updated: Instant,
    pwm_period_ms: u32,
    indicator: bool,
}

impl SerialPlatform{
    pub fn new(port_name: &str, baud_rate: u32, rack: RackModel) -> Result<Self>{
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;

        debug!(port = port_name, baud = baud_rate, "serial link open");

        let now = Instant::now();
        Ok(SerialPlatform{
            port,
            rx_buffer: VecDeque::with_capacity(256),
            epoch: now,
            rack,
            rack_updated: now,
            pwm_period_ms: 0,
            indicator: false,
        })
    }

    pub fn rack(&self) -> &RackModel{
        &self.rack
    }

    pub fn indicator(&self) -> bool{
        self.indicator
    }

    fn step_rack(&mut self){
        let now = Instant::now();
        let elapsed = now.duration_since(self.rack_updated).as_millis() as u64;
        if elapsed > 0{
            self.rack.advance(elapsed);
            self.rack_updated = now;
        }
    }

    //pull whatever the driver has buffered, without waiting
    fn fill_rx(&mut self){
        let waiting = match self.port.bytes_to_read(){
            Ok(n) => n as usize,
            Err(e) =>{
                warn!("serial bytes_to_read failed: {}", e);
                return;
            }
        };
        if waiting == 0{
            return;
        }

        let mut read_buf = vec![0u8; waiting];
        match self.port.read(&mut read_buf){
            Ok(n) => self.rx_buffer.extend(&read_buf[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => warn!("serial read error: {}", e),
        }
    }
}

impl Platform for SerialPlatform{
    fn read_analog(&mut self) -> f32{
        self.step_rack();
        self.rack.pot_reading()
    }

    fn write_pwm(&mut self, pulse_width_us: u32){
        self.step_rack();
        self.rack.set_pulse(pulse_width_us);
    }

    fn set_pwm_period_ms(&mut self, period_ms: u32){
        self.pwm_period_ms = period_ms;
    }

    fn read_byte(&mut self) -> Option<u8>{
        if self.rx_buffer.is_empty(){
            self.fill_rx();
        }
        self.rx_buffer.pop_front()
    }

    fn write_text(&mut self, text: &str){
        let result = self.port.write_all(text.as_bytes());
        if let Err(e) = result.and_then(|_| self.port.flush()){
            warn!("serial write error: {}", e);
        }
    }

    fn toggle_indicator(&mut self){
        self.indicator = !self.indicator;
    }

    fn now_ms(&mut self) -> u64{
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64){
        thread::sleep(Duration::from_millis(ms));
    }
}

/**
 * Command Parser
 *
 * Text frames on the serial link, one marker byte then the payload:
 *   $<float>                  set target heading
 *   #<float>,<float>,<float>  set P, I, D gains
 *
 * No terminator; a number ends at the first byte that cannot extend it.
 * Bytes outside a frame that are not markers are skipped.
 * A frame whose payload does not parse is dropped whole.
 */

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::controller::ControlState;
use crate::pid::PidGains;
use crate::platform::Platform;

pub const HEADING_MARKER: u8 = b'$';
pub const GAINS_MARKER: u8 = b'#';
pub const FIELD_SEPARATOR: u8 = b',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind{
    Heading,
    Gains,
}

impl FrameKind{
    pub fn from_marker(byte: u8) -> Option<Self>{
        match byte{
            HEADING_MARKER => Some(FrameKind::Heading),
            GAINS_MARKER => Some(FrameKind::Gains),
            _ => None,
        }
    }

    pub fn field_count(&self) -> usize{
        match self{
            FrameKind::Heading => 1,
            FrameKind::Gains => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command{
    SetHeading(f32),
    SetGains(PidGains),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError{
    #[error("{kind:?} frame: field {field} is not a number")]
    MissingNumber{ kind: FrameKind, field: usize },

    #[error("{kind:?} frame: expected ',' after field {field}")]
    MissingSeparator{ kind: FrameKind, field: usize },

    #[error("{kind:?} frame: field {field} is not finite")]
    NotFinite{ kind: FrameKind, field: usize },
}

/// What arrived during one poll.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollResult{
    pub heading_received: bool,
    pub gains_received: bool,
}

impl PollResult{
    pub fn any(&self) -> bool{
        self.heading_received || self.gains_received
    }
}

/// Walks a byte slice and yields one item per marker byte found.
pub struct FrameScanner<'a>{
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FrameScanner<'a>{
    pub fn new(bytes: &'a [u8]) -> Self{
        FrameScanner{ bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8>{
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self){
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()){
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize{
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()){
            self.pos += 1;
        }
        self.pos - start
    }

    //longest prefix of [+-]digits[.digits][e[+-]digits] with at least one mantissa digit
    //on failure pos is left at the first non-whitespace byte
    fn scan_number(&mut self) -> Option<f32>{
        self.skip_whitespace();
        let start = self.pos;

        if matches!(self.peek(), Some(b'+') | Some(b'-')){
            self.pos += 1;
        }
        let mut digits = self.skip_digits();
        if self.peek() == Some(b'.'){
            self.pos += 1;
            digits += self.skip_digits();
        }
        if digits == 0{
            self.pos = start;
            return None;
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')){
            let mantissa_end = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')){
                self.pos += 1;
            }
            if self.skip_digits() == 0{
                self.pos = mantissa_end;
            }
        }

        //only ascii was accepted above
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        text.parse::<f32>().ok()
    }

    fn parse_payload(&mut self, kind: FrameKind) -> Result<Command, FrameError>{
        let mut fields = [0.0f32; 3];
        for field in 0..kind.field_count(){
            if field > 0{
                if self.peek() != Some(FIELD_SEPARATOR){
                    return Err(FrameError::MissingSeparator{ kind, field: field - 1 });
                }
                self.pos += 1;
            }
            let value = self.scan_number().ok_or(FrameError::MissingNumber{ kind, field })?;
            if !value.is_finite(){
                return Err(FrameError::NotFinite{ kind, field });
            }
            fields[field] = value;
        }

        Ok(match kind{
            FrameKind::Heading => Command::SetHeading(fields[0]),
            FrameKind::Gains => Command::SetGains(PidGains{ p: fields[0], i: fields[1], d: fields[2] }),
        })
    }
}

impl<'a> Iterator for FrameScanner<'a>{
    type Item = Result<Command, FrameError>;

    fn next(&mut self) -> Option<Self::Item>{
        while let Some(byte) = self.peek(){
            self.pos += 1;
            if let Some(kind) = FrameKind::from_marker(byte){
                return Some(self.parse_payload(kind));
            }
            trace!(byte, "skipping byte outside frame");
        }
        None
    }
}

/// Drains the link each poll and applies every complete frame to the
/// control state. Frames never span polls.
#[derive(Default)]
pub struct CommandParser{
    rx_buffer: Vec<u8>,
}

impl CommandParser{
    pub fn new() -> Self{
        CommandParser{ rx_buffer: Vec::with_capacity(64) }
    }

    pub fn poll<P: Platform>(&mut self, platform: &mut P, state: &mut ControlState) -> PollResult{
        state.gains_updated_this_poll = false;

        self.rx_buffer.clear();
        while let Some(byte) = platform.read_byte(){
            self.rx_buffer.push(byte);
        }

        let mut result = PollResult::default();
        for frame in FrameScanner::new(&self.rx_buffer){
            match frame{
                Ok(cmd) =>{
                    debug!(?cmd, "command received");
                    apply(cmd, state, &mut result);
                }
                Err(e) => warn!("dropped frame: {}", e),
            }
        }
        result
    }
}

fn apply(cmd: Command, state: &mut ControlState, result: &mut PollResult){
    match cmd{
        Command::SetHeading(target) =>{
            state.desired_heading = target;
            result.heading_received = true;
        }
        Command::SetGains(gains) =>{
            state.gains = gains;
            state.gains_updated_this_poll = true;
            result.gains_received = true;
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::platform::SimPlatform;

    fn scan(bytes: &[u8]) -> Vec<Result<Command, FrameError>>{
        FrameScanner::new(bytes).collect()
    }

    fn poll_bytes(bytes: &[u8], state: &mut ControlState) -> PollResult{
        let mut sim = SimPlatform::default();
        sim.queue_bytes(bytes);
        CommandParser::new().poll(&mut sim, state)
    }

    #[test]
    fn test_marker_conversion(){
        assert_eq!(FrameKind::from_marker(b'$'), Some(FrameKind::Heading));
        assert_eq!(FrameKind::from_marker(b'#'), Some(FrameKind::Gains));
        assert_eq!(FrameKind::from_marker(b'z'), None);
    }

    #[test]
    fn test_heading_frame(){
        let mut state = ControlState::default();
        let result = poll_bytes(b"$0.5", &mut state);

        assert!(result.heading_received);
        assert!(!result.gains_received);
        assert_eq!(state.desired_heading, 0.5);
    }

    #[test]
    fn test_gains_frame(){
        let mut state = ControlState::default();
        let result = poll_bytes(b"#1,2,3", &mut state);

        assert!(result.gains_received);
        assert!(!result.heading_received);
        assert!(state.gains_updated_this_poll);
        assert_eq!(state.gains, PidGains{ p: 1.0, i: 2.0, d: 3.0 });
    }

    #[test]
    fn test_unknown_byte_is_ignored(){
        let mut state = ControlState::default();
        let before = state.clone();
        let result = poll_bytes(b"z", &mut state);

        assert_eq!(result, PollResult::default());
        assert_eq!(state, before);
    }

    #[test]
    fn test_number_forms(){
        assert_eq!(scan(b"$-0.35"), vec![Ok(Command::SetHeading(-0.35))]);
        assert_eq!(scan(b"$+.5"), vec![Ok(Command::SetHeading(0.5))]);
        assert_eq!(scan(b"$ 1."), vec![Ok(Command::SetHeading(1.0))]);
        assert_eq!(scan(b"$2e-1"), vec![Ok(Command::SetHeading(0.2))]);
    }

    #[test]
    fn test_dangling_exponent_ends_number(){
        //"1e" -> 1, then the 'e' is a stray byte
        assert_eq!(scan(b"$1e"), vec![Ok(Command::SetHeading(1.0))]);
    }

    #[test]
    fn test_back_to_back_frames(){
        let frames = scan(b"$0.1#0.7,0,2$0.2\r\n");
        assert_eq!(frames, vec![
            Ok(Command::SetHeading(0.1)),
            Ok(Command::SetGains(PidGains{ p: 0.7, i: 0.0, d: 2.0 })),
            Ok(Command::SetHeading(0.2)),
        ]);
    }

    #[test]
    fn test_last_heading_wins(){
        let mut state = ControlState::default();
        poll_bytes(b"$0.1$-0.4", &mut state);
        assert_eq!(state.desired_heading, -0.4);
    }

    #[test]
    fn test_malformed_heading_keeps_prior_value(){
        let mut state = ControlState::default();
        state.desired_heading = 0.25;
        let result = poll_bytes(b"$abc", &mut state);

        assert!(!result.heading_received);
        assert_eq!(state.desired_heading, 0.25);
    }

    #[test]
    fn test_partial_gains_frame_is_dropped_whole(){
        let mut state = ControlState::default();
        let before = state.gains;
        let result = poll_bytes(b"#5,6", &mut state);

        assert!(!result.gains_received);
        assert!(!state.gains_updated_this_poll);
        assert_eq!(state.gains, before);
        assert_eq!(scan(b"#5,6"), vec![Err(FrameError::MissingSeparator{ kind: FrameKind::Gains, field: 1 })]);
    }

    #[test]
    fn test_bad_gain_field(){
        assert_eq!(
            scan(b"#1,x,3"),
            vec![Err(FrameError::MissingNumber{ kind: FrameKind::Gains, field: 1 })]
        );
    }

    #[test]
    fn test_marker_after_malformed_frame_is_parsed(){
        let frames = scan(b"$$0.5");
        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_err());
        assert_eq!(frames[1], Ok(Command::SetHeading(0.5)));
    }

    #[test]
    fn test_overflow_is_not_finite(){
        assert_eq!(
            scan(b"$1e60"),
            vec![Err(FrameError::NotFinite{ kind: FrameKind::Heading, field: 0 })]
        );
    }

    #[test]
    fn test_gains_flag_resets_each_poll(){
        let mut state = ControlState::default();
        let mut sim = SimPlatform::default();
        let mut parser = CommandParser::new();

        sim.queue_bytes(b"#1,0,0");
        assert!(parser.poll(&mut sim, &mut state).gains_received);
        assert!(state.gains_updated_this_poll);

        let result = parser.poll(&mut sim, &mut state);
        assert!(!result.any());
        assert!(!state.gains_updated_this_poll);
        assert_eq!(state.gains.p, 1.0);
    }

    #[test]
    fn test_poll_drains_link(){
        let mut state = ControlState::default();
        let mut sim = SimPlatform::default();
        sim.queue_bytes(b"noise$0.3 more noise");
        CommandParser::new().poll(&mut sim, &mut state);
        assert_eq!(sim.pending_rx(), 0);
        assert_eq!(state.desired_heading, 0.3);
    }
}

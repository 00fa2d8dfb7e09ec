//! Pin-level trace capture and serial frame decoding.

use serde::Serialize;

/// Serial link levels on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinSample {
    pub tick: u64,
    pub cs_n: bool,
    pub sck: bool,
    pub mosi: bool,
    /// Data-in level the core sampled on this tick.
    pub miso: bool,
}

/// One chip-select-low window, decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Tick on which chip-select fell.
    pub start_tick: u64,
    /// Tick on which chip-select rose, if it did within the trace.
    pub end_tick: Option<u64>,
    /// Serial clock cycles seen.
    pub bits: usize,
    pub command: Option<u8>,
    pub address: Option<u16>,
    /// Whole data bytes clocked in after the header.
    pub data: Vec<u8>,
}

impl Frame {
    /// A full header, at least one data byte, and a closing chip-select.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end_tick.is_some() && self.address.is_some() && !self.data.is_empty()
    }
}

struct Open {
    start_tick: u64,
    mosi: Vec<bool>,
    miso: Vec<bool>,
}

impl Open {
    fn close(self, end_tick: Option<u64>) -> Frame {
        let field = |bits: &[bool]| bits.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b));
        let command = (self.mosi.len() >= 8).then(|| field(&self.mosi[..8]) as u8);
        let address = (self.mosi.len() >= 24).then(|| field(&self.mosi[8..24]) as u16);
        let data = if self.miso.len() > 24 {
            self.miso[24..]
                .chunks_exact(8)
                .map(|byte| field(byte) as u8)
                .collect()
        } else {
            Vec::new()
        };
        Frame {
            start_tick: self.start_tick,
            end_tick,
            bits: self.mosi.len(),
            command,
            address,
            data,
        }
    }
}

/// Split a trace into chip-select-low windows.
///
/// Bits are taken on rising serial-clock edges while chip-select is low:
/// the first 8 are the command, the next 16 the address (both from the
/// data-out line) and the rest data (from the data-in line). A window
/// still open at the end of the trace is returned with no `end_tick`.
#[must_use]
pub fn decode_frames(samples: &[PinSample]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut open: Option<Open> = None;
    let mut prev_cs_n = true;
    let mut prev_sck = false;

    for s in samples {
        if !s.cs_n && prev_cs_n {
            open = Some(Open {
                start_tick: s.tick,
                mosi: Vec::new(),
                miso: Vec::new(),
            });
        }
        if let Some(frame) = open.as_mut() {
            if !s.cs_n && s.sck && !prev_sck {
                frame.mosi.push(s.mosi);
                frame.miso.push(s.miso);
            }
        }
        if s.cs_n {
            if let Some(frame) = open.take() {
                frames.push(frame.close(Some(s.tick)));
            }
        }
        prev_cs_n = s.cs_n;
        prev_sck = s.sck;
    }
    if let Some(frame) = open {
        frames.push(frame.close(None));
    }
    frames
}

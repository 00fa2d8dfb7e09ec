//! Serial link behaviour seen from the pins, with a real memory model on
//! the far side.

use spi_sram::SerialSram;
use spicpu::{Core, CoreInputs};
use spicpu_core::{SerialDevice, SpiLines};

/// One decoded chip-select-low window.
#[derive(Debug)]
struct Frame {
    mosi: Vec<bool>,
    miso: Vec<bool>,
}

impl Frame {
    fn field(bits: &[bool]) -> u32 {
        bits.iter().fold(0, |acc, &b| (acc << 1) | u32::from(b))
    }

    fn command(&self) -> u32 {
        Self::field(&self.mosi[0..8])
    }

    fn address(&self) -> u32 {
        Self::field(&self.mosi[8..24])
    }

    fn data(&self) -> u32 {
        Self::field(&self.miso[24..])
    }
}

struct Bench {
    core: Core,
    sram: SerialSram,
    miso: bool,
    prev: SpiLines,
    open: Option<Frame>,
    frames: Vec<Frame>,
}

impl Bench {
    fn new(image: &[u8]) -> Self {
        let mut sram = SerialSram::new(256);
        sram.load(0, image);
        Self {
            core: Core::new(),
            sram,
            miso: false,
            prev: SpiLines::IDLE,
            open: None,
            frames: Vec::new(),
        }
    }

    fn tick(&mut self, inputs: CoreInputs) {
        let sampled = self.miso;
        let out = self.core.tick(CoreInputs {
            miso: sampled,
            ..inputs
        });
        let lines = out.spi;
        self.miso = self.sram.clock(lines);

        if lines.selected() && !self.prev.selected() {
            assert!(self.open.is_none(), "overlapping transactions");
            self.open = Some(Frame {
                mosi: Vec::new(),
                miso: Vec::new(),
            });
        }
        if let Some(frame) = self.open.as_mut() {
            if lines.selected() && lines.sck && !self.prev.sck {
                frame.mosi.push(lines.mosi);
                frame.miso.push(sampled);
            }
        }
        if !lines.selected() {
            if let Some(frame) = self.open.take() {
                self.frames.push(frame);
            }
        }
        self.prev = lines;
    }

    fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick(CoreInputs::default());
        }
    }
}

#[test]
fn first_transaction_after_reset_reads_address_zero() {
    let mut bench = Bench::new(&[0x70]);
    for _ in 0..5 {
        bench.tick(CoreInputs {
            rst_n: false,
            ..CoreInputs::default()
        });
    }
    assert!(bench.frames.is_empty());

    bench.run(200);
    let first = &bench.frames[0];
    assert_eq!(first.mosi.len(), 32);
    assert_eq!(first.command(), 0x03);
    assert_eq!(first.address(), 0x0000);
    assert_eq!(first.data(), 0x70);
}

#[test]
fn fetch_addresses_follow_program_counter() {
    // LDA #0x11; CLR; LDB hi; SNZA +0 (never taken, A is 0)
    let image = [0x00, 0x11, 0x70, 0x11, 0x80, 0x00, 0x70];
    let mut bench = Bench::new(&image);
    bench.run(1_000);

    let addresses: Vec<u32> = bench.frames.iter().map(Frame::address).collect();
    assert!(addresses.len() >= 7);
    assert_eq!(&addresses[..7], &[0, 1, 2, 3, 4, 5, 6]);
    for (frame, &byte) in bench.frames.iter().zip(image.iter()) {
        assert_eq!(frame.command(), 0x03);
        assert_eq!(frame.data(), u32::from(byte));
    }
}

#[test]
fn reset_during_fetch_restarts_at_zero() {
    let image = [0x00, 0x42, 0x20, 0x70];
    let mut bench = Bench::new(&image);
    bench.run(150);
    assert!(bench.core.registers().pc > 0);

    // Assert reset partway into a transaction.
    while !bench.core.outputs().spi.selected() {
        bench.run(1);
    }
    bench.run(20);
    bench.tick(CoreInputs {
        rst_n: false,
        ..CoreInputs::default()
    });
    assert_eq!(bench.core.outputs().spi, SpiLines::IDLE);
    let aborted = bench.frames.len();

    bench.run(100);
    let restart = &bench.frames[aborted];
    assert_eq!(restart.command(), 0x03);
    assert_eq!(restart.address(), 0x0000);
}

#[test]
fn output_latch_follows_ldo_only() {
    // LDA #0x5A; LDO a; LDA #0x00
    let image = [0x00, 0x5A, 0x23, 0x00, 0x00];
    let mut bench = Bench::new(&image);
    let mut seen = Vec::new();
    for _ in 0..600 {
        bench.run(1);
        let out = bench.core.outputs().result;
        if seen.last() != Some(&out) {
            seen.push(out);
        }
    }
    assert_eq!(seen, vec![0x00, 0x5A]);
}

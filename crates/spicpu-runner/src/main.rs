//! Headless runner for the serial-fetch CPU board.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for reset and
//! operand changes, `RUST_LOG=trace` for one line per executed
//! instruction.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use machine_spicpu::microprogram::listing;
use machine_spicpu::trace::decode_frames;
use machine_spicpu::{Machine, MachineConfig, SETTLE_TICKS};
use spicpu_core::{Observable, Tickable, Ticks};

#[derive(Parser, Debug)]
#[command(name = "spicpu", version, about = "Serial-fetch microcoded CPU board", long_about = None)]
struct Cli {
    #[command(flatten)]
    board: BoardArgs,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// JSON board config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raw program image, loaded at address 0. Overrides the config.
    #[arg(long, global = true)]
    program: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run for a number of ticks and report the result bus.
    Run {
        #[arg(long, default_value_t = SETTLE_TICKS)]
        ticks: u64,
        /// Operand bus byte (A in bits 7:4, B in 3:0); decimal or 0x-hex.
        #[arg(long, value_parser = parse_byte)]
        operands: Option<u8>,
        /// Print every observable path as JSON when done.
        #[arg(long)]
        snapshot: bool,
    },
    /// Multiply two 4-bit operands.
    Multiply {
        #[arg(value_parser = clap::value_parser!(u8).range(0..16))]
        a: u8,
        #[arg(value_parser = clap::value_parser!(u8).range(0..16))]
        b: u8,
    },
    /// Decode the serial link into one JSON line per transaction.
    Trace {
        #[arg(long, default_value_t = 2_000)]
        ticks: u64,
        #[arg(long, value_parser = parse_byte)]
        operands: Option<u8>,
    },
    /// Disassemble the program image.
    Dump,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn load_config(args: &BoardArgs) -> Result<MachineConfig> {
    let mut config = match &args.config {
        Some(path) => MachineConfig::from_path(path)?,
        None => MachineConfig::default(),
    };
    if let Some(path) = &args.program {
        let image = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        config.program = Some(image);
        config.validate()?;
    }
    Ok(config)
}

fn report_time(machine: &Machine) {
    let ticks = machine.ticks();
    let elapsed = machine.clock().duration_of(ticks);
    eprintln!("{ticks} ({elapsed:?} at {} Hz)", machine.clock().frequency_hz);
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli.board)?;
    debug!("runner: {:?}", cli.cmd);

    match cli.cmd {
        Cmd::Run {
            ticks,
            operands,
            snapshot,
        } => {
            let mut machine = Machine::new(&config)?;
            if let Some(operands) = operands {
                machine.set_operand_bus(operands);
            }
            machine.reset_cycle(1);
            machine.tick_n(Ticks::new(ticks));
            report_time(&machine);
            if snapshot {
                println!("{}", serde_json::to_string_pretty(&machine.snapshot())?);
            } else {
                println!("{}", machine.result());
            }
        }
        Cmd::Multiply { a, b } => {
            if config.program.is_some() {
                bail!("multiply needs the stock program image");
            }
            let mut machine = Machine::new(&config)?;
            machine.reset_cycle(1);
            let product = machine.multiply(a, b);
            report_time(&machine);
            println!("{a} x {b} = {product}");
        }
        Cmd::Trace { ticks, operands } => {
            let mut machine = Machine::new(&config)?;
            if let Some(operands) = operands {
                machine.set_operand_bus(operands);
            }
            machine.reset_cycle(1);
            machine.start_trace();
            machine.tick_n(Ticks::new(ticks));
            for frame in decode_frames(&machine.take_trace()) {
                println!("{}", serde_json::to_string(&frame)?);
            }
            report_time(&machine);
        }
        Cmd::Dump => {
            for line in listing(config.image()) {
                let bytes: Vec<String> = line.bytes.iter().map(|b| format!("{b:02X}")).collect();
                println!("{:04X}  {:<6} {}", line.address, bytes.join(" "), line.text);
            }
        }
    }
    Ok(())
}

//! End-to-end runs of the stock multiply microprogram.

use machine_spicpu::trace::decode_frames;
use machine_spicpu::{Machine, UIO_CS_N, UIO_OE};
use proptest::prelude::*;
use spicpu_core::{Observable, Tickable, Ticks, Value};

#[test]
fn seven_times_nine() {
    let mut machine = Machine::multiplier();
    machine.reset_cycle(4);
    assert_eq!(machine.multiply(7, 9), 63);
}

#[test]
fn small_products() {
    let mut machine = Machine::multiplier();
    machine.reset_cycle(4);
    assert_eq!(machine.multiply(3, 4), 12);
    assert_eq!(machine.multiply(0, 11), 0);
    assert_eq!(machine.multiply(11, 0), 0);
    assert_eq!(machine.multiply(15, 15), 225);
    assert_eq!(machine.multiply(1, 1), 1);
}

#[test]
fn operands_above_four_bits_are_masked() {
    let mut machine = Machine::multiplier();
    assert_eq!(machine.multiply(0x12, 0x23), 2 * 3);
}

#[test]
fn result_bus_is_stable_between_updates() {
    let mut machine = Machine::multiplier();
    assert_eq!(machine.multiply(5, 5), 25);
    for _ in 0..10_000 {
        machine.tick();
        assert_eq!(machine.result(), 25);
    }
}

#[test]
fn reset_mid_run_recovers() {
    let mut machine = Machine::multiplier();
    machine.reset_cycle(4);
    assert_eq!(machine.multiply(7, 9), 63);

    machine.set_operands(5, 6);
    machine.tick_n(Ticks::new(2_000));
    machine.set_reset(true);
    for _ in 0..3 {
        machine.tick();
        assert_eq!(machine.pins().uio_out, UIO_CS_N, "bus idle during reset");
        assert_eq!(machine.result(), 0, "output cleared by reset");
    }
    machine.set_reset(false);

    assert_eq!(machine.multiply(3, 4), 12);
}

#[test]
fn output_enable_never_changes() {
    let mut machine = Machine::multiplier();
    machine.set_operands(9, 13);
    for i in 0..12_000u32 {
        if i == 5_000 {
            machine.set_reset(true);
        }
        if i == 5_010 {
            machine.set_reset(false);
        }
        machine.tick();
        assert_eq!(machine.pins().uio_oe, UIO_OE);
    }
}

fn settled_state(machine: &Machine) -> Vec<(&'static str, Value)> {
    machine
        .snapshot()
        .into_iter()
        .filter(|(path, _)| {
            (path.starts_with("core.") || path.starts_with("uo_") || path.starts_with("uio_"))
                && !matches!(*path, "core.ticks" | "core.bus.transactions")
        })
        .collect()
}

#[test]
fn reset_is_idempotent() {
    let mut once = Machine::multiplier();
    once.set_operands(7, 9);
    once.tick_n(Ticks::new(3_333));
    once.reset_cycle(1);

    let mut many = Machine::multiplier();
    many.set_operands(7, 9);
    many.tick_n(Ticks::new(9_001));
    many.reset_cycle(1);
    many.tick_n(Ticks::new(123));
    many.reset_cycle(10);

    assert_eq!(settled_state(&once), settled_state(&many));
    assert_eq!(once.registers(), spicpu::Registers::default());
}

#[test]
fn first_transaction_after_reset_reads_address_zero() {
    let mut machine = Machine::multiplier();
    machine.tick_n(Ticks::new(500));
    machine.reset_cycle(2);
    machine.start_trace();
    machine.tick_n(Ticks::new(1_000));

    let frames = decode_frames(&machine.take_trace());
    let first = &frames[0];
    assert!(first.is_complete());
    assert_eq!(first.command, Some(0x03));
    assert_eq!(first.address, Some(0x0000));
    assert_eq!(first.data, vec![0x31]);
}

#[test]
fn fetch_order_for_the_first_instructions() {
    let mut machine = Machine::multiplier();
    machine.start_trace();
    machine.tick_n(Ticks::new(1_000));
    let frames = decode_frames(&machine.take_trace());

    let fetched: Vec<(u16, u8)> = frames
        .iter()
        .filter(|f| f.is_complete())
        .take(6)
        .map(|f| (f.address.unwrap_or(0xFFFF), f.data[0]))
        .collect();
    assert_eq!(
        fetched,
        vec![(0, 0x31), (1, 0x42), (2, 0x17), (3, 0x06), (4, 0xC0), (5, 0x01)]
    );
    for f in frames.iter().filter(|f| f.is_complete()) {
        assert_eq!(f.bits, 32, "one byte per transaction");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn product_matches_for_any_nibbles(a in 0u8..16, b in 0u8..16) {
        let mut machine = Machine::multiplier();
        machine.reset_cycle(2);
        prop_assert_eq!(machine.multiply(a, b), a * b);
    }

    #[test]
    fn new_operands_replace_old_product(a in 0u8..16, b in 0u8..16, c in 0u8..16, d in 0u8..16) {
        let mut machine = Machine::multiplier();
        prop_assert_eq!(machine.multiply(a, b), a * b);
        prop_assert_eq!(machine.multiply(c, d), c * d);
    }
}

//! Trait for components that advance on the shared clock.

use crate::Ticks;

/// A free-running component driven by the shared clock.
///
/// Components with latched inputs (reset, enable, operand bus) implement
/// this once those inputs are held inside the component. Anything that
/// needs per-tick inputs takes them as arguments to its own `tick`
/// instead.
pub trait Tickable {
    /// Advance by one clock edge.
    fn tick(&mut self);

    /// Advance by `count` clock edges.
    ///
    /// Must produce the same state as calling `tick()` `count` times.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}

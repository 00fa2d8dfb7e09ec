//! System clock configuration.

use std::time::Duration;

use crate::Ticks;

/// Frequency of the single shared clock.
///
/// The core has one clock domain. The serial clock it drives to the
/// memory device is derived from it (two system ticks per serial bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g. `50_000_000` for a 50 MHz board clock).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Wall-clock time that `ticks` would take on real hardware.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(ticks.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Ticks elapsed in `duration` (integer division).
    #[must_use]
    pub fn ticks_in(&self, duration: Duration) -> Ticks {
        let ticks = duration.as_nanos() * u128::from(self.frequency_hz) / 1_000_000_000;
        Ticks::new(u64::try_from(ticks).unwrap_or(u64::MAX))
    }
}

impl Default for MasterClock {
    fn default() -> Self {
        Self::new(50_000_000)
    }
}

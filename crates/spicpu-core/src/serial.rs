//! Serial memory link signals.

/// Levels driven by the bus master onto the serial link.
///
/// Plain `bool`s: every line is always a definite 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiLines {
    /// Chip-select, active low.
    pub cs_n: bool,
    /// Serial clock out.
    pub sck: bool,
    /// Data out (master to device).
    pub mosi: bool,
}

impl SpiLines {
    /// Levels held between transactions: deselected, clock low, data low.
    pub const IDLE: Self = Self {
        cs_n: true,
        sck: false,
        mosi: false,
    };

    /// True while a transaction is open.
    #[must_use]
    pub const fn selected(self) -> bool {
        !self.cs_n
    }
}

impl Default for SpiLines {
    fn default() -> Self {
        Self::IDLE
    }
}

/// A device on the far side of the serial link.
///
/// The device sees the master's lines once per system tick, after the
/// master has updated them, and returns the level it drives on data-in.
/// The master samples that level on its next rising clock edge.
pub trait SerialDevice {
    /// Observe the link for one tick and return the data-in level.
    fn clock(&mut self, lines: SpiLines) -> bool;
}

//! Pin-level view of the board.

use spicpu_core::SpiLines;

/// Chip-select bit in `uio`.
pub const UIO_CS_N: u8 = 1 << 0;
/// Data-out bit in `uio`.
pub const UIO_MOSI: u8 = 1 << 1;
/// Data-in bit in `uio`.
pub const UIO_MISO: u8 = 1 << 2;
/// Clock-out bit in `uio`.
pub const UIO_SCK: u8 = 1 << 3;

/// Output-enable mask for `uio`: chip-select, data-out and clock-out are
/// driven, data-in and the unused pins are inputs. Never changes.
pub const UIO_OE: u8 = UIO_CS_N | UIO_MOSI | UIO_SCK;

/// Every pin level after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Pins {
    pub ui_in: u8,
    pub uo_out: u8,
    pub uio_in: u8,
    pub uio_out: u8,
    pub uio_oe: u8,
}

impl Pins {
    #[must_use]
    pub fn new(ui_in: u8, result: u8, spi: SpiLines, miso: bool) -> Self {
        Self {
            ui_in,
            uo_out: result,
            uio_in: if miso { UIO_MISO } else { 0 },
            uio_out: pack_uio(spi),
            uio_oe: UIO_OE,
        }
    }

    /// Serial lines as seen on `uio_out`.
    #[must_use]
    pub fn spi(&self) -> SpiLines {
        SpiLines {
            cs_n: self.uio_out & UIO_CS_N != 0,
            sck: self.uio_out & UIO_SCK != 0,
            mosi: self.uio_out & UIO_MOSI != 0,
        }
    }
}

fn pack_uio(spi: SpiLines) -> u8 {
    let mut uio = 0;
    if spi.cs_n {
        uio |= UIO_CS_N;
    }
    if spi.mosi {
        uio |= UIO_MOSI;
    }
    if spi.sck {
        uio |= UIO_SCK;
    }
    uio
}

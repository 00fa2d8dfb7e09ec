//! Board configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config
//! and gives the stock multiplier board:
//!
//! ```json
//! {
//!   "clock": { "frequency_hz": 50000000 },
//!   "memory_size": 65536,
//!   "operands": 121
//! }
//! ```
//!
//! `program` is optional; when absent the memory holds
//! [`MULTIPLY`](crate::microprogram::MULTIPLY).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use spi_sram::DEFAULT_SIZE;
use spicpu_core::MasterClock;

use crate::error::MachineError;
use crate::microprogram::MULTIPLY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Board clock. Only used to convert ticks to wall-clock time.
    pub clock: MasterClock,
    /// Size of the external memory in bytes.
    pub memory_size: usize,
    /// Program image loaded at address 0.
    pub program: Option<Vec<u8>>,
    /// Initial operand bus: A in bits 7:4, B in bits 3:0.
    pub operands: u8,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            clock: MasterClock::default(),
            memory_size: DEFAULT_SIZE,
            program: None,
            operands: 0,
        }
    }
}

impl MachineConfig {
    /// Parse a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Config`] on malformed JSON or unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self, MachineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: &Path) -> Result<Self, MachineError> {
        let json = fs::read_to_string(path).map_err(|source| MachineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The image that will be loaded at address 0.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        self.program.as_deref().unwrap_or(&MULTIPLY)
    }

    /// Check that the image fits the memory.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.memory_size == 0 || self.memory_size > DEFAULT_SIZE {
            return Err(MachineError::InvalidMemorySize(self.memory_size));
        }
        let image = self.image();
        if image.is_empty() {
            return Err(MachineError::EmptyProgram);
        }
        if image.len() > self.memory_size {
            return Err(MachineError::ProgramTooLarge {
                len: image.len(),
                size: self.memory_size,
            });
        }
        Ok(())
    }
}

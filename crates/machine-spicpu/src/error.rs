//! Host-side errors.
//!
//! The simulated hardware itself has no failure paths; these cover
//! building a machine from bad configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("program image is empty")]
    EmptyProgram,
    #[error("program is {len} bytes but memory holds {size}")]
    ProgramTooLarge { len: usize, size: usize },
    #[error("memory size {0} is outside 1..=65536")]
    InvalidMemorySize(usize),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

//! Saving and loading the best genome of a training run.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::brain::NetGenome;

const MAGIC: &[u8; 4] = b"FLPY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub version: u32,
    /// Generation the genome was evaluated in.
    pub generation: u32,
    pub genome: NetGenome,
}

impl Winner {
    pub const VERSION: u32 = 1;

    pub fn new(generation: u32, genome: NetGenome) -> Self {
        Self {
            version: Self::VERSION,
            generation,
            genome,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WinnerError> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(MAGIC)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WinnerError> {
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(WinnerError::InvalidFormat("missing FLPY header".to_string()));
        }

        let winner: Winner = bincode::deserialize_from(reader)?;
        if winner.version != Self::VERSION {
            return Err(WinnerError::VersionMismatch {
                expected: Self::VERSION,
                found: winner.version,
            });
        }
        Ok(winner)
    }
}

#[derive(Debug)]
pub enum WinnerError {
    Io(io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl fmt::Display for WinnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for WinnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WinnerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for WinnerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

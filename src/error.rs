//! Error and diagnostic types

use std::io;
use thiserror::Error;

/// Problems with a single record or command. None of these stop the interpreter:
/// they are logged, reported back in the `WriteReport` and processing continues
/// with the next record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The record did not yield a command character and an integer
    #[error("malformed record {record:?}")]
    MalformedRecord { record: String },

    /// A non-empty write carried no newline at all; it was dropped in full
    #[error("no complete record in {len} byte write, input dropped")]
    TruncatedInput { len: usize },

    /// Well-formed record with a command character outside the protocol
    #[error("unknown command {command:?} with arg {value}")]
    UnknownCommand { command: char, value: i32 },

    /// `s` with an index outside of `0..max`
    #[error("slot index {index} out of range (0..{max})")]
    SlotIndexOutOfRange { index: i32, max: usize },
}

/// Errors raised by the plumbing around the interpreter.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error, e.g. while creating or writing to the uinput device
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The device already has an open session
    #[error("device is busy")]
    Busy,

    /// Device profile could not be parsed
    #[error("invalid device profile: {0}")]
    Config(#[from] toml::de::Error),

    /// No built-in profile with this name
    #[error("unknown device profile {0:?}")]
    UnknownProfile(String),
}

pub type Result<T> = std::result::Result<T, Error>;

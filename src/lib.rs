//! Rollover hardware-in-the-loop test harness.
//!
//! Sends synthetic key press/release sequences to a keyboard's key emulator
//! over a serial port and verifies that the key events reported by the host
//! match the batching produced by the firmware's N-key rollover reports.

pub mod config;
pub mod expect;
pub mod gen;
pub mod harness;
pub mod host;
pub mod key;
pub mod proto;
pub mod verify;

/// Error type returned by the harness.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] key::LookupError),
    #[error(transparent)]
    Parse(#[from] key::ParseError),
    #[error(transparent)]
    Sequence(#[from] key::SequenceError),
    #[error(transparent)]
    Protocol(#[from] proto::ProtocolError),
    #[error(transparent)]
    Verify(#[from] verify::Error),
    #[error(transparent)]
    Host(#[from] host::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
}

/// Common harness result type.
pub type Result<T> = std::result::Result<T, Error>;

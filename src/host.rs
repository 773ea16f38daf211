//! Host-side collaborators: the stimulus transport and the observation
//! capture queue.

use std::fmt::Debug;
use std::io;

pub use {capture::*, serial::*};

mod capture;
mod serial;

/// Local host errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("transport error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("capture queue is full")]
    CaptureFull,
    #[error("capture queue is closed")]
    CaptureClosed,
}

/// Common host result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reliable, ordered byte stream to the device.
pub trait Transport: Debug + Send + Sync {
    /// Writes all of `b` to the device.
    fn write(&self, b: &[u8]) -> Result<()>;
}

//! Stimulus wire protocol.
//!
//! The device accepts a frame consisting of a 3-byte marker, a 1-byte event
//! count, and a 2-byte record per event:
//!
//! ```text
//! [5B 7D 0F] [count] [slot flag]...
//! ```
//!
//! where `flag` is 1 for a press and 0 for a release. The device replays the
//! events through its matrix scanner as if the keys were physically pressed.

use std::fmt::{Debug, Formatter};

use structbuf::{Pack, StructBuf, Unpack};

use crate::key::{Dir, KeyEvent, KeyId, LookupError};

/// Frame marker that starts the device's key emulator (`"[}\x0f"`).
pub const MARKER: [u8; 3] = *b"[}\x0f";

/// Frame header length.
pub const HDR: usize = MARKER.len() + 1;

/// Maximum number of events in one frame.
pub const MAX_EVENTS: usize = u8::MAX as usize;

/// Error type returned by the protocol layer.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("too many events for one frame: {0} (max {MAX_EVENTS})")]
    TooManyEvents(usize),
    #[error("invalid frame marker: {0:02X?}")]
    BadMarker([u8; 3]),
    #[error("truncated frame: {0} bytes")]
    Truncated(usize),
    #[error("frame declares {count} events but carries {payload} payload bytes")]
    LengthMismatch { count: usize, payload: usize },
    #[error("invalid direction flag {flag:#04X} for event {index}")]
    BadDirection { index: usize, flag: u8 },
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Common protocol result type.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Encoded stimulus frame.
#[derive(Clone)]
pub struct Frame(StructBuf);

impl Frame {
    /// Returns the number of events in the frame.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        usize::from(self.0.as_ref()[HDR - 1])
    }

    /// Returns the frame length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    /// Returns whether the frame is empty, which is never the case for a frame
    /// returned by [`encode`].
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({:02X?})", self.as_ref())
    }
}

/// Encodes `events` into a single frame. No bytes are produced if the events
/// do not fit.
pub fn encode(events: &[KeyEvent]) -> Result<Frame> {
    let n = u8::try_from(events.len()).map_err(|_| ProtocolError::TooManyEvents(events.len()))?;
    let mut b = StructBuf::new(HDR + 2 * MAX_EVENTS);
    let mut p = b.append();
    p.put(MARKER).u8(n);
    for e in events {
        p.u8(e.key.slot()).u8(e.dir.flag());
    }
    Ok(Frame(b))
}

/// Decodes a frame produced by [`encode`].
pub fn decode(b: &[u8]) -> Result<Vec<KeyEvent>> {
    let mut p = b.unpack();
    let marker = [p.u8(), p.u8(), p.u8()];
    let count = usize::from(p.u8());
    if !p.is_ok() {
        return Err(ProtocolError::Truncated(b.len()));
    }
    if marker != MARKER {
        return Err(ProtocolError::BadMarker(marker));
    }
    let payload = b.len() - HDR;
    if payload != 2 * count {
        return Err(ProtocolError::LengthMismatch { count, payload });
    }
    (0..count)
        .map(|index| {
            let (slot, flag) = (p.u8(), p.u8());
            let dir = Dir::from_flag(flag).ok_or(ProtocolError::BadDirection { index, flag })?;
            Ok(KeyEvent::new(KeyId::from_slot(slot)?, dir))
        })
        .collect()
}

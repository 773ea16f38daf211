use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::*;

/// Transport over any byte sink, such as the character device of a USB CDC
/// ACM serial port. Line settings do not apply to CDC ACM, so the device node
/// is written directly.
#[derive(Debug)]
pub struct IoTransport<W> {
    w: Mutex<W>,
}

impl<W: Write> IoTransport<W> {
    /// Creates a transport that writes to `w`.
    #[inline]
    #[must_use]
    pub const fn new(w: W) -> Self {
        Self { w: Mutex::new(w) }
    }

    /// Returns the underlying writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.w.into_inner()
    }
}

impl IoTransport<File> {
    /// Opens the device node at `path` for writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening {}", path.display());
        Ok(Self::new(OpenOptions::new().write(true).open(path)?))
    }
}

impl<W: Write + Debug + Send> Transport for IoTransport<W> {
    fn write(&self, b: &[u8]) -> Result<()> {
        trace!("Write: {b:02X?}");
        let mut w = self.w.lock();
        w.write_all(b)?;
        Ok(w.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use super::*;

    #[test]
    fn write() {
        let t = IoTransport::new(Vec::new());
        t.write(&[1, 2]).unwrap();
        t.write(&[3]).unwrap();
        assert_eq!(t.into_inner(), [1, 2, 3]);
    }

    #[test]
    fn open_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let e = IoTransport::open(tmp.path().join("ttyACM9")).unwrap_err();
        assert_matches!(e, Error::Io { .. });
    }
}

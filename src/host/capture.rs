use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::key::Dir;

use super::*;

/// Key event reported by the host input subsystem.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    /// Host key name.
    pub name: String,
    /// Event direction.
    pub dir: Dir,
    /// Arrival order, starting at 0 for each capture queue.
    pub seq: u64,
    /// Arrival time relative to queue creation. This is informational only;
    /// events are ordered by `seq`.
    pub at: Option<Duration>,
}

/// Creates a bounded observation queue with room for `capacity` events. The
/// sender is given to the key capture mechanism, and the receiver is drained
/// by the harness after each stimulus.
#[must_use]
pub fn capture(capacity: usize) -> (CaptureTx, CaptureRx) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let tx = CaptureTx {
        tx,
        seq: 0,
        start: Instant::now(),
    };
    (tx, CaptureRx { rx })
}

/// Producer side of the observation queue.
#[derive(Debug)]
pub struct CaptureTx {
    tx: mpsc::Sender<Observation>,
    seq: u64,
    start: Instant,
}

impl CaptureTx {
    /// Adds an observation, blocking the current thread while the queue is
    /// full. This must be called from outside of the async runtime, such as
    /// from a key hook thread.
    pub fn push(&mut self, name: impl Into<String>, dir: Dir) -> Result<()> {
        let o = self.next(name.into(), dir);
        self.tx.blocking_send(o).map_err(|_| Error::CaptureClosed)
    }

    /// Adds an observation without blocking.
    pub fn try_push(&mut self, name: impl Into<String>, dir: Dir) -> Result<()> {
        use mpsc::error::TrySendError;
        let o = self.next(name.into(), dir);
        self.tx.try_send(o).map_err(|e| match e {
            TrySendError::Full(_) => Error::CaptureFull,
            TrySendError::Closed(_) => Error::CaptureClosed,
        })
    }

    fn next(&mut self, name: String, dir: Dir) -> Observation {
        let o = Observation {
            name,
            dir,
            seq: self.seq,
            at: Some(self.start.elapsed()),
        };
        trace!("Captured {} {} (seq={})", o.name, o.dir, o.seq);
        self.seq += 1;
        o
    }
}

/// Consumer side of the observation queue.
#[derive(Debug)]
pub struct CaptureRx {
    rx: mpsc::Receiver<Observation>,
}

impl CaptureRx {
    /// Removes and returns all observations that are currently queued, in
    /// arrival order.
    pub fn drain(&mut self) -> Vec<Observation> {
        let mut v = Vec::new();
        while let Ok(o) = self.rx.try_recv() {
            v.push(o);
        }
        v
    }

    /// Discards all queued observations, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.drain().len();
        if n > 0 {
            warn!("Discarded {n} stale observations");
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use super::*;

    #[test]
    fn drain() {
        let (mut tx, mut rx) = capture(4);
        assert!(rx.drain().is_empty());
        tx.try_push("a", Dir::Press).unwrap();
        tx.try_push("left shift", Dir::Press).unwrap();
        tx.try_push("a", Dir::Release).unwrap();
        let v = rx.drain();
        assert_eq!(v.len(), 3);
        assert_eq!(
            (v.iter().map(|o| (o.name.as_str(), o.dir, o.seq))).collect::<Vec<_>>(),
            [
                ("a", Dir::Press, 0),
                ("left shift", Dir::Press, 1),
                ("a", Dir::Release, 2)
            ]
        );
        assert!(v.iter().all(|o| o.at.is_some()));
        assert!(rx.drain().is_empty());

        tx.try_push("b", Dir::Press).unwrap();
        assert_eq!(rx.drain()[0].seq, 3);
    }

    #[test]
    fn full() {
        let (mut tx, mut rx) = capture(2);
        tx.try_push("a", Dir::Press).unwrap();
        tx.try_push("a", Dir::Release).unwrap();
        assert_matches!(
            tx.try_push("b", Dir::Press),
            Err(Error::CaptureFull)
        );
        assert_eq!(rx.clear(), 2);
        tx.try_push("b", Dir::Press).unwrap();
        assert_eq!(rx.drain().len(), 1);
    }

    #[test]
    fn closed() {
        let (mut tx, rx) = capture(1);
        drop(rx);
        assert_matches!(
            tx.try_push("a", Dir::Press),
            Err(Error::CaptureClosed)
        );
    }

    #[test]
    fn blocking_push() {
        let (mut tx, mut rx) = capture(8);
        let t = std::thread::spawn(move || {
            for name in ["x", "y", "z"] {
                tx.push(name, Dir::Press).unwrap();
            }
        });
        t.join().unwrap();
        let names: Vec<String> = rx.drain().into_iter().map(|o| o.name).collect();
        assert_eq!(names, ["x", "y", "z"]);
    }
}

//! Online verification of observed key events.

use tracing::{debug, trace};

use crate::expect::{EventGroup, ExpectationQueue};
use crate::host::Observation;
use crate::key::{KeyEvent, KeyId, LookupError};

/// Error type returned by the verifier.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("unexpected {event} at observation {index}: nothing left to observe")]
    Unexpected { event: KeyEvent, index: usize },
    #[error("{event} at observation {index} is not in the current group {remaining}")]
    Mismatch {
        event: KeyEvent,
        index: usize,
        remaining: EventGroup,
    },
    #[error("{} expected events were never observed: {remaining}", remaining.event_count())]
    Incomplete { remaining: ExpectationQueue },
}

/// Common verifier result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks observed events against an expectation queue. Events within a group
/// may arrive in any order, but every event of a group must arrive before any
/// event of the next group.
#[derive(Debug)]
pub struct Verifier {
    queue: ExpectationQueue,
    consumed: usize,
}

impl Verifier {
    /// Creates a verifier that consumes `queue`.
    #[inline]
    #[must_use]
    pub const fn new(queue: ExpectationQueue) -> Self {
        Self { queue, consumed: 0 }
    }

    /// Consumes an observation reported by the host.
    pub fn consume(&mut self, o: &Observation) -> Result<()> {
        let key = KeyId::from_host_name(&o.name)?;
        self.consume_event(KeyEvent::new(key, o.dir))
    }

    /// Consumes one event, removing a matching occurrence from the head group.
    pub fn consume_event(&mut self, event: KeyEvent) -> Result<()> {
        let index = self.consumed;
        match self.queue.front() {
            None => return Err(Error::Unexpected { event, index }),
            Some(head) if !head.contains(event) => {
                return Err(Error::Mismatch {
                    event,
                    index,
                    remaining: head.clone(),
                })
            }
            Some(_) => {}
        }
        let taken = self.queue.take(event);
        debug_assert!(taken);
        trace!("Observed {event} ({} groups left)", self.queue.len());
        self.consumed += 1;
        Ok(())
    }

    /// Ends verification, failing if any expected events were not observed.
    pub fn finalize(self) -> Result<()> {
        if !self.queue.is_empty() {
            return Err(Error::Incomplete {
                remaining: self.queue,
            });
        }
        debug!("Verified {} events", self.consumed);
        Ok(())
    }

    /// Returns the expectations that have not been met yet.
    #[inline(always)]
    #[must_use]
    pub const fn remaining(&self) -> &ExpectationQueue {
        &self.queue
    }

    /// Returns the number of events consumed so far.
    #[inline(always)]
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

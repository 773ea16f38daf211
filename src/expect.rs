//! Expected report batching.
//!
//! The firmware flushes a USB report when a new key is pressed or when the
//! "hot" key (the most recently pressed key that has not been released yet)
//! is released. Releases of other keys ride along in whatever report is
//! currently open. Each report becomes an [`EventGroup`] in which the host may
//! deliver events in any order, while the groups themselves arrive in order.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use smallvec::SmallVec;

use crate::key::{Dir, KeyEvent, KeyId};

/// Unordered multiset of events that the firmware delivers in one report.
#[derive(Clone, Debug)]
pub struct EventGroup(SmallVec<[KeyEvent; 4]>);

impl EventGroup {
    /// Creates a group containing a single event.
    #[inline]
    #[must_use]
    fn new(e: KeyEvent) -> Self {
        let mut v = SmallVec::new();
        v.push(e);
        Self(v)
    }

    /// Adds an event to the group.
    #[inline(always)]
    fn push(&mut self, e: KeyEvent) {
        self.0.push(e);
    }

    /// Removes one occurrence of `e`, returning whether it was present.
    pub(crate) fn take(&mut self, e: KeyEvent) -> bool {
        match self.0.iter().position(|&v| v == e) {
            Some(i) => {
                self.0.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Returns the number of events in the group.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether all events of the group have been taken.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the group contains `e`.
    #[inline]
    #[must_use]
    pub fn contains(&self, e: KeyEvent) -> bool {
        self.0.contains(&e)
    }

    /// Returns an iterator over the events in the group.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.0.iter().copied()
    }

    /// Returns the events in a canonical order.
    #[must_use]
    pub fn sorted(&self) -> Vec<KeyEvent> {
        let mut v = self.0.to_vec();
        v.sort_unstable();
        v
    }
}

/// Groups compare as multisets.
impl PartialEq for EventGroup {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl Eq for EventGroup {}

impl Display for EventGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(e, f)?;
        }
        f.write_str("]")
    }
}

/// Ordered sequence of expected event groups.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExpectationQueue {
    groups: VecDeque<EventGroup>,
    events: usize,
}

impl ExpectationQueue {
    /// Returns the number of remaining groups.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns whether all groups have been consumed.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the number of remaining events across all groups.
    #[inline(always)]
    #[must_use]
    pub const fn event_count(&self) -> usize {
        self.events
    }

    /// Returns the head group.
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<&EventGroup> {
        self.groups.front()
    }

    /// Returns an iterator over the remaining groups in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &EventGroup> + '_ {
        self.groups.iter()
    }

    /// Removes one occurrence of `e` from the head group, popping the group
    /// once it is empty. Returns `false` without modifying the queue if the
    /// head group does not contain `e`.
    pub(crate) fn take(&mut self, e: KeyEvent) -> bool {
        let Some(head) = self.groups.front_mut() else {
            return false;
        };
        if !head.take(e) {
            return false;
        }
        if head.is_empty() {
            self.groups.pop_front();
        }
        self.events -= 1;
        true
    }

    fn open(&mut self, e: KeyEvent) {
        self.groups.push_back(EventGroup::new(e));
        self.events += 1;
    }

    fn append(&mut self, e: KeyEvent) {
        match self.groups.back_mut() {
            Some(g) => {
                g.push(e);
                self.events += 1;
            }
            None => self.open(e),
        }
    }
}

impl Display for ExpectationQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, g) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(g, f)?;
        }
        f.write_str("]")
    }
}

/// Builds the expected grouping of `events`.
///
/// A press always opens a new group and becomes the hot key. Releasing the hot
/// key flushes the open report, so the release opens a new group and clears
/// the hot key. Any other release joins the group that is open when it
/// arrives.
#[must_use]
pub fn build(events: &[KeyEvent]) -> ExpectationQueue {
    let mut q = ExpectationQueue::default();
    let mut hot: Option<KeyId> = None;
    for &e in events {
        match e.dir {
            Dir::Press => {
                q.open(e);
                hot = Some(e.key);
            }
            Dir::Release if hot == Some(e.key) => {
                q.open(e);
                hot = None;
            }
            Dir::Release => q.append(e),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use crate::gen::generate;
    use crate::key::{parse_key_set, parse_seq};

    use super::*;

    fn groups(q: &ExpectationQueue) -> Vec<Vec<KeyEvent>> {
        q.iter().map(EventGroup::sorted).collect()
    }

    fn want(groups: &[&str]) -> Vec<Vec<KeyEvent>> {
        (groups.iter())
            .map(|g| {
                let mut v = parse_seq(g).unwrap();
                v.sort_unstable();
                v
            })
            .collect()
    }

    #[test]
    fn abc() {
        let q = build(&parse_seq("a down, b down, a up, c down, c up, b up").unwrap());
        assert_eq!(
            groups(&q),
            want(&["a down", "b down, a up", "c down", "c up, b up"])
        );
        assert_eq!(q.event_count(), 6);
        assert_eq!(
            q.to_string(),
            "[[a down], [b down, a up], [c down], [c up, b up]]"
        );
    }

    #[test]
    fn nine_f() {
        let q = build(&parse_seq("9 down, f down, 9 up, f up").unwrap());
        assert_eq!(groups(&q), want(&["9 down", "f down, 9 up", "f up"]));
    }

    #[test]
    fn aaa() {
        let q = build(&parse_seq("a down, a up, a down, a up, a down, a up").unwrap());
        assert_eq!(q.len(), 6);
        assert!(q.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn chord() {
        // Releasing the keys of a chord in press order: only the last key
        // pressed is hot, so its release opens a group that collects the
        // remaining releases.
        let q = build(&parse_seq("a down, b down, c down, a up, b up, c up").unwrap());
        assert_eq!(
            groups(&q),
            want(&["a down", "b down", "c down, a up, b up", "c up"])
        );
        let q = build(&parse_seq("a down, b down, c down, c up, b up, a up").unwrap());
        assert_eq!(
            groups(&q),
            want(&["a down", "b down", "c down", "c up, b up, a up"])
        );
    }

    #[test]
    fn release_without_press() {
        let q = build(&parse_seq("a up, b down, b up").unwrap());
        assert_eq!(groups(&q), want(&["a up", "b down", "b up"]));
        assert_eq!(q.event_count(), 3);
    }

    #[test]
    fn event_count() {
        for set in ["1234567890", "aaaaabbbbb", "qwerty,./;"] {
            let keys = parse_key_set(set).unwrap();
            for seed in 0..50 {
                let v = generate(&keys, seed);
                let q = build(&v);
                assert_eq!(q.event_count(), v.len());
                assert_eq!(q.iter().map(EventGroup::len).sum::<usize>(), v.len());
                assert!(q.iter().all(|g| !g.is_empty()));
                let presses = v.iter().filter(|e| e.is_press()).count();
                assert!(q.len() >= presses);
                assert!(q.len() <= v.len());
            }
        }
    }

    #[test]
    fn group_eq() {
        let mut a = EventGroup::new(KeyEvent::press(KeyId::A));
        a.push(KeyEvent::release(KeyId::B));
        let mut b = EventGroup::new(KeyEvent::release(KeyId::B));
        b.push(KeyEvent::press(KeyId::A));
        assert_eq!(a, b);
        assert!(b.take(KeyEvent::press(KeyId::A)));
        assert!(!b.take(KeyEvent::press(KeyId::A)));
        assert_ne!(a, b);
    }
}

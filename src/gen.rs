//! Randomized stimulus generator.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::key::{Dir, KeyEvent, KeyId};

/// Generator of physically valid press/release interleavings. The output for
/// a given seed and sequence of calls is always the same, so a failing case
/// can be reproduced from its seed.
#[derive(Clone, Debug)]
pub struct Generator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl Generator {
    /// Creates a generator from a fixed seed.
    #[inline]
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator from a random seed.
    #[inline]
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Returns the seed that the generator was created with.
    #[inline(always)]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a random sequence in which every occurrence of a key in `keys`
    /// is pressed and released exactly once, and no key is pressed while it
    /// is already held. Each step picks uniformly among all pending events
    /// that are legal at that point: presses of keys that are not held and
    /// releases of keys that are.
    pub fn generate(&mut self, keys: &[KeyId]) -> Vec<KeyEvent> {
        let mut pending: Vec<KeyEvent> = keys.iter().map(|&k| KeyEvent::press(k)).collect();
        let mut held = HashSet::with_capacity(keys.len());
        let mut legal = Vec::with_capacity(keys.len());
        let mut out = Vec::with_capacity(2 * keys.len());
        while !pending.is_empty() {
            legal.clear();
            legal.extend(
                (pending.iter().enumerate())
                    .filter(|(_, e)| !e.is_press() || !held.contains(&e.key))
                    .map(|(i, _)| i),
            );
            // Every held key has a pending release, and if nothing is held,
            // every pending press is legal, so this is never empty.
            let e = pending.swap_remove(legal[self.rng.gen_range(0..legal.len())]);
            match e.dir {
                Dir::Press => {
                    held.insert(e.key);
                    pending.push(KeyEvent::release(e.key));
                }
                Dir::Release => {
                    held.remove(&e.key);
                }
            }
            out.push(e);
        }
        trace!("Generated {} events for {} keys", out.len(), keys.len());
        out
    }
}

/// Returns a random sequence for `keys` generated from `seed`.
#[inline]
#[must_use]
pub fn generate(keys: &[KeyId], seed: u64) -> Vec<KeyEvent> {
    Generator::new(seed).generate(keys)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::key::{parse_key_set, validate};

    use super::*;

    const KEY_SETS: &[&str] = &[
        "1234567890",
        "aaaaaaaaaa,bbbbbbbbbb,1111111111",
        "abcdefghij,klmnopqrst,uvwxyz;'[]",
        "a",
        "aaa",
    ];

    #[test]
    fn properties() {
        for set in KEY_SETS {
            let keys = parse_key_set(set).unwrap();
            for seed in 0..100 {
                let v = generate(&keys, seed);
                assert_eq!(v.len(), 2 * keys.len(), "{set:?} seed={seed}");
                validate(&v).unwrap_or_else(|e| panic!("{set:?} seed={seed}: {e}"));

                let mut n: HashMap<KeyEvent, usize> = HashMap::new();
                for &e in &v {
                    *n.entry(e).or_default() += 1;
                }
                for &k in &keys {
                    let want = keys.iter().filter(|&&v| v == k).count();
                    assert_eq!(n[&KeyEvent::press(k)], want);
                    assert_eq!(n[&KeyEvent::release(k)], want);
                }
            }
        }
    }

    #[test]
    fn deterministic() {
        let keys = parse_key_set("abcdefghij").unwrap();
        assert_eq!(generate(&keys, 42), generate(&keys, 42));

        let mut a = Generator::new(7);
        let mut b = Generator::new(7);
        for _ in 0..3 {
            assert_eq!(a.generate(&keys), b.generate(&keys));
        }
        assert_eq!(a.seed(), 7);

        let distinct: HashSet<Vec<KeyEvent>> = (0..10).map(|s| generate(&keys, s)).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn entropy() {
        let keys = parse_key_set("asdfjkl;").unwrap();
        let mut g = Generator::from_entropy();
        assert_eq!(g.generate(&keys), generate(&keys, g.seed()));
    }

    #[test]
    fn empty() {
        assert!(generate(&[], 0).is_empty());
    }

    #[test]
    fn repeated_key() {
        // A single key repeated can only alternate.
        let v = generate(&[KeyId::A; 4], 3);
        for (i, e) in v.iter().enumerate() {
            assert_eq!(e.key, KeyId::A);
            assert_eq!(e.is_press(), i % 2 == 0);
        }
    }
}

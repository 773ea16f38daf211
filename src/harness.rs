//! Test case runner.
//!
//! A [`Scenario`] is a named list of stimulus batches. [`Harness::run`] sends
//! each batch to the device as one frame, waits for the host to settle, and
//! verifies the observed key events against the batching that the firmware is
//! expected to produce for the whole sequence.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::expect::build;
use crate::gen::Generator;
use crate::host::{CaptureRx, Transport};
use crate::key::{self, parse_seq, validate, KeyEvent, KeyId, ParseError};
use crate::proto;
use crate::verify::Verifier;

/// Key sets of the NKRO stress cases. Every character is a key name, and
/// repeated characters press the same key multiple times.
pub const NKRO_KEY_SETS: &[&str] = &[
    "1234567890",
    "aaaaaaaaaa,bbbbbbbbbb,1111111111",
    "abcdefghij,klmnopqrst,uvwxyz;'[]",
];

/// Named list of stimulus batches.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scenario {
    name: String,
    seed: Option<u64>,
    batches: Vec<Vec<KeyEvent>>,
}

impl Scenario {
    /// Creates a scenario from explicit batches.
    #[must_use]
    pub fn new(name: impl Into<String>, batches: Vec<Vec<KeyEvent>>) -> Self {
        Self {
            name: name.into(),
            seed: None,
            batches,
        }
    }

    /// Creates a scenario from batches in the textual event notation.
    pub fn parse(name: impl Into<String>, batches: &[&str]) -> Result<Self, ParseError> {
        let batches = batches.iter().map(|b| parse_seq(b)).collect::<Result<_, _>>()?;
        Ok(Self::new(name, batches))
    }

    /// Three taps of the same key.
    #[must_use]
    pub fn aaa() -> Self {
        use KeyEvent as E;
        let tap = [E::press(KeyId::A), E::release(KeyId::A)];
        Self::new("aaa", vec![tap.repeat(3)])
    }

    /// Overlapping presses of three keys.
    #[must_use]
    pub fn abc() -> Self {
        use KeyId::{A, B, C};
        use KeyEvent as E;
        let v = vec![
            E::press(A),
            E::press(B),
            E::release(A),
            E::press(C),
            E::release(C),
            E::release(B),
        ];
        Self::new("abc", vec![v])
    }

    /// Two overlapping keys released in press order. The release of `9` is
    /// reported together with the press of `f`, so the host must never see
    /// `f up` before `9 up`.
    #[must_use]
    pub fn nine_f() -> Self {
        use KeyId::{Num9, F};
        use KeyEvent as E;
        let v = vec![E::press(Num9), E::press(F), E::release(Num9), E::release(F)];
        Self::new("9f", vec![v])
    }

    /// Random interleaving of `keys` generated from `seed`.
    #[must_use]
    pub fn random(name: impl Into<String>, keys: &[KeyId], seed: u64) -> Self {
        let mut g = Generator::new(seed);
        Self {
            name: name.into(),
            seed: Some(seed),
            batches: vec![g.generate(keys)],
        }
    }

    /// Returns a built-in scenario by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            "aaa" => Self::aaa(),
            "abc" => Self::abc(),
            "9f" => Self::nine_f(),
            _ => return None,
        })
    }

    /// Returns the scenario name.
    #[inline(always)]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the generator seed of a random scenario.
    #[inline(always)]
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the stimulus batches.
    #[inline(always)]
    #[must_use]
    pub fn batches(&self) -> &[Vec<KeyEvent>] {
        &self.batches
    }

    /// Returns all events in the order they are sent.
    #[must_use]
    pub fn events(&self) -> Vec<KeyEvent> {
        self.batches.concat()
    }
}

/// Summary of a passed test case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    pub name: String,
    pub seed: Option<u64>,
    /// Number of events sent and observed.
    pub events: usize,
    /// Number of expected reports.
    pub groups: usize,
    /// Number of frames written.
    pub frames: usize,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} events in {} groups",
            self.name, self.events, self.groups
        )?;
        if let Some(seed) = self.seed {
            write!(f, " (seed {seed})")?;
        }
        Ok(())
    }
}

/// Failed test case with enough context to reproduce it.
#[derive(Debug, thiserror::Error)]
#[error("{name} failed{}: {source}", .seed.map_or_else(String::new, |s| format!(" (seed {s})")))]
pub struct CaseError {
    pub name: String,
    pub seed: Option<u64>,
    /// Events that were sent, or would have been sent.
    pub sent: Vec<KeyEvent>,
    #[source]
    pub source: crate::Error,
}

/// Test case runner that owns the stimulus transport and the observation
/// queue.
#[derive(Debug)]
pub struct Harness {
    cfg: Config,
    transport: Arc<dyn Transport>,
    capture: CaptureRx,
}

impl Harness {
    /// Creates a harness after verifying the key tables.
    pub fn new(
        cfg: Config,
        transport: Arc<dyn Transport>,
        capture: CaptureRx,
    ) -> crate::Result<Self> {
        key::check_tables()?;
        Ok(Self {
            cfg,
            transport,
            capture,
        })
    }

    /// Returns the harness configuration.
    #[inline(always)]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs one test case. Any error is terminal for the case.
    pub async fn run(&mut self, s: &Scenario) -> Result<Report, CaseError> {
        let sent = s.events();
        match self.exec(s, &sent).await {
            Ok(r) => {
                info!("PASS {r}");
                Ok(r)
            }
            Err(source) => {
                let e = CaseError {
                    name: s.name.clone(),
                    seed: s.seed,
                    sent,
                    source,
                };
                error!("FAIL {e}");
                Err(e)
            }
        }
    }

    /// Runs `n` cases produced by `f`, stopping at the first failure.
    pub async fn repeat(
        &mut self,
        n: usize,
        mut f: impl FnMut(usize) -> Scenario,
    ) -> Result<Vec<Report>, CaseError> {
        let mut v = Vec::with_capacity(n);
        for i in 0..n {
            v.push(self.run(&f(i)).await?);
        }
        Ok(v)
    }

    async fn exec(&mut self, s: &Scenario, sent: &[KeyEvent]) -> crate::Result<Report> {
        validate(sent)?;
        let queue = build(sent);
        let groups = queue.len();
        let frames = (s.batches.iter())
            .map(|b| proto::encode(b))
            .collect::<proto::Result<Vec<_>>>()?;
        debug!(
            "Running {} ({} events, {} frames, {groups} groups)",
            s.name,
            sent.len(),
            frames.len()
        );
        self.capture.clear();
        for (i, f) in frames.iter().enumerate() {
            if i > 0 {
                sleep(self.cfg.hold()).await;
            }
            self.transport.write(f.as_ref())?;
        }
        sleep(self.cfg.settle()).await;

        let mut v = Verifier::new(queue);
        for o in self.capture.drain() {
            v.consume(&o)?;
        }
        v.finalize()?;
        Ok(Report {
            name: s.name.clone(),
            seed: s.seed,
            events: sent.len(),
            groups,
            frames: frames.len(),
        })
    }
}

#[inline]
async fn sleep(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

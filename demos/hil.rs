#![allow(unused_crate_dependencies)]
#![allow(clippy::print_stdout)]

//! Runs the rollover test cases against a keyboard.
//!
//! The device is driven through its serial port. Host key events are read
//! from stdin, one `"<host key name> down|up"` line per event, for example
//! from a key logger piped into this program.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use rollover::config::Config;
use rollover::gen::Generator;
use rollover::harness::{Harness, Scenario, NKRO_KEY_SETS};
use rollover::host::{capture, CaptureTx, IoTransport};
use rollover::key::{parse_key_set, Dir};

#[derive(Clone, Debug, clap::Parser)]
struct Args {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port of the keyboard's key emulator.
    #[arg(short, long)]
    port: Option<PathBuf>,

    /// Seed of the first random case.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of cases per random key set.
    #[arg(short, long)]
    repeat: Option<usize>,

    /// Scenarios to run ("aaa", "abc", "9f", "nkro", or a key set such as
    /// "asdf"). All built-in scenarios are run if none are given.
    scenario: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let mut cfg = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    cfg.port = args.port.unwrap_or(cfg.port);
    cfg.seed = args.seed.or(cfg.seed);
    cfg.repeat = args.repeat.unwrap_or(cfg.repeat);
    let seed = cfg.seed.unwrap_or_else(|| Generator::from_entropy().seed());
    info!("Seed: {seed}");

    let transport = Arc::new(IoTransport::open(&cfg.port).context("failed to open port")?);
    let (tx, rx) = capture(cfg.capture_capacity);
    read_input(tx);
    let mut h = Harness::new(cfg, transport, rx)?;

    let names = if args.scenario.is_empty() {
        ["aaa", "abc", "9f", "nkro"].map(String::from).to_vec()
    } else {
        args.scenario
    };
    let n = h.config().repeat;
    let mut passed = 0;
    for name in names {
        if let Some(s) = Scenario::builtin(&name) {
            h.run(&s).await?;
            passed += 1;
            continue;
        }
        let sets = if name == "nkro" {
            NKRO_KEY_SETS.to_vec()
        } else {
            vec![name.as_str()]
        };
        for set in sets {
            let keys = parse_key_set(set).with_context(|| format!("invalid scenario {name:?}"))?;
            let mut next = seed;
            let r = (h.repeat(n, |_| {
                let s = Scenario::random(set, &keys, next);
                next = next.wrapping_add(1);
                s
            }))
            .await?;
            passed += r.len();
        }
    }
    println!("{passed} cases passed");
    Ok(())
}

fn read_input(mut tx: CaptureTx) {
    std::thread::spawn(move || {
        if let Err(e) = read_lines(&mut tx) {
            warn!("Input reader stopped: {e}");
        }
    });
}

fn read_lines(tx: &mut CaptureTx) -> Result<()> {
    // https://github.com/tokio-rs/tokio/issues/2466
    for ln in std::io::BufReader::new(std::io::stdin()).lines() {
        let ln = ln?;
        let Some((name, dir)) = ln.trim().rsplit_once(char::is_whitespace) else {
            warn!("Invalid input: {ln:?}");
            continue;
        };
        let dir: Dir = match dir.parse() {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Invalid input: {e}");
                continue;
            }
        };
        tx.push(name.trim(), dir)?;
    }
    bail!("input closed")
}

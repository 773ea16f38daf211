//! Key identifiers, key events, and their textual notation.
//!
//! Every supported key is a [`KeyId`] variant whose discriminant is the slot
//! code of the key in the device's scan matrix. Each key also maps to a HID
//! usage ID, which in turn determines the key name reported by the host. The
//! textual `"KEY down"`/`"KEY up"` notation is only parsed at the boundary
//! where test cases are authored; everything else works with [`KeyEvent`].

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use enum_iterator::all;
use once_cell::sync::Lazy;
use rollover_hid::usage;
use tracing::error;

/// Error returned when a key name or code is not in the supported set.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum LookupError {
    #[error("unknown key name: {0:?}")]
    Name(String),
    #[error("unknown slot code: {0:#04X}")]
    Slot(u8),
    #[error("no key with usage {0:?}")]
    Usage(usage::Key),
    #[error("incomplete key tables: {0}")]
    Table(String),
}

/// Error returned when parsing the textual event notation.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("invalid direction {0:?} (expected \"down\" or \"up\")")]
    Dir(String),
    #[error("invalid key event {0:?} (expected \"KEY down\" or \"KEY up\")")]
    Notation(String),
}

/// Error returned by [`validate`] for sequences that no physical keyboard
/// could produce.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SequenceError {
    #[error("{key} pressed at index {index} while already held")]
    DoublePress { key: KeyId, index: usize },
    #[error("{key} released at index {index} while not held")]
    ReleaseWithoutPress { key: KeyId, index: usize },
    #[error("{key} is never released")]
    Unreleased { key: KeyId },
}

/// Supported keys. The discriminant is the device slot code.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    enum_iterator::Sequence,
    num_enum::IntoPrimitive,
    num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum KeyId {
    // Row 0
    Esc = 0x00,
    Num1 = 0x01,
    Num2 = 0x02,
    Num3 = 0x03,
    Num4 = 0x04,
    Num5 = 0x05,
    Num6 = 0x06,
    Num7 = 0x07,
    Num8 = 0x08,
    Num9 = 0x09,
    Num0 = 0x0A,
    Minus = 0x0B,
    Equals = 0x0C,
    Backspace = 0x0D,
    Delete = 0x0E,
    // Row 1
    Tab = 0x0F,
    Q = 0x10,
    W = 0x11,
    E = 0x12,
    R = 0x13,
    T = 0x14,
    Y = 0x15,
    U = 0x16,
    I = 0x17,
    O = 0x18,
    P = 0x19,
    LeftBracket = 0x1A,
    RightBracket = 0x1B,
    Backslash = 0x1C,
    Home = 0x1D,
    // Row 2
    CapsLock = 0x1E,
    A = 0x1F,
    S = 0x20,
    D = 0x21,
    F = 0x22,
    G = 0x23,
    H = 0x24,
    J = 0x25,
    K = 0x26,
    L = 0x27,
    Semicolon = 0x28,
    Quote = 0x29,
    Enter = 0x2B,
    PageUp = 0x2C,
    // Row 3
    LeftShift = 0x2D,
    Z = 0x2F,
    X = 0x30,
    C = 0x31,
    V = 0x32,
    B = 0x33,
    N = 0x34,
    M = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
    RightShift = 0x39,
    Up = 0x3A,
    PageDown = 0x3B,
    // Row 4
    LeftCtrl = 0x3C,
    LeftGui = 0x3D,
    LeftAlt = 0x3E,
    Space = 0x42,
    RightAlt = 0x46,
    Left = 0x48,
    Down = 0x49,
    Right = 0x4A,
}

impl KeyId {
    /// Returns the slot code of the key.
    #[inline(always)]
    #[must_use]
    pub const fn slot(self) -> u8 {
        self as u8
    }

    /// Returns the key at slot code `v`.
    #[inline]
    pub fn from_slot(v: u8) -> Result<Self, LookupError> {
        use num_enum::TryFromPrimitive;
        Self::try_from_primitive(v).map_err(|_| LookupError::Slot(v))
    }

    /// Returns the HID usage ID that the firmware reports for the key.
    #[must_use]
    pub const fn usage(self) -> usage::Key {
        use usage::Key as Usage;
        use KeyId::*;
        match self {
            Esc => Usage::Esc,
            Num1 => Usage::Num1,
            Num2 => Usage::Num2,
            Num3 => Usage::Num3,
            Num4 => Usage::Num4,
            Num5 => Usage::Num5,
            Num6 => Usage::Num6,
            Num7 => Usage::Num7,
            Num8 => Usage::Num8,
            Num9 => Usage::Num9,
            Num0 => Usage::Num0,
            Minus => Usage::Minus,
            Equals => Usage::Equals,
            Backspace => Usage::Backspace,
            Delete => Usage::Delete,
            Tab => Usage::Tab,
            Q => Usage::Q,
            W => Usage::W,
            E => Usage::E,
            R => Usage::R,
            T => Usage::T,
            Y => Usage::Y,
            U => Usage::U,
            I => Usage::I,
            O => Usage::O,
            P => Usage::P,
            LeftBracket => Usage::LeftBracket,
            RightBracket => Usage::RightBracket,
            Backslash => Usage::Backslash,
            Home => Usage::Home,
            CapsLock => Usage::CapsLock,
            A => Usage::A,
            S => Usage::S,
            D => Usage::D,
            F => Usage::F,
            G => Usage::G,
            H => Usage::H,
            J => Usage::J,
            K => Usage::K,
            L => Usage::L,
            Semicolon => Usage::Semicolon,
            Quote => Usage::Quote,
            Enter => Usage::Enter,
            PageUp => Usage::PageUp,
            LeftShift => Usage::LeftShift,
            Z => Usage::Z,
            X => Usage::X,
            C => Usage::C,
            V => Usage::V,
            B => Usage::B,
            N => Usage::N,
            M => Usage::M,
            Comma => Usage::Comma,
            Period => Usage::Period,
            Slash => Usage::Slash,
            RightShift => Usage::RightShift,
            Up => Usage::Up,
            PageDown => Usage::PageDown,
            LeftCtrl => Usage::LeftCtrl,
            LeftGui => Usage::LeftGui,
            LeftAlt => Usage::LeftAlt,
            Space => Usage::Space,
            RightAlt => Usage::RightAlt,
            Left => Usage::Left,
            Down => Usage::Down,
            Right => Usage::Right,
        }
    }

    /// Returns the key that reports usage `u`.
    pub fn from_usage(u: usage::Key) -> Result<Self, LookupError> {
        (TABLES.by_usage.get(&u).copied()).ok_or(LookupError::Usage(u))
    }

    /// Returns the name used in the event notation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        use KeyId::*;
        match self {
            Esc => "ESC",
            Num1 => "1",
            Num2 => "2",
            Num3 => "3",
            Num4 => "4",
            Num5 => "5",
            Num6 => "6",
            Num7 => "7",
            Num8 => "8",
            Num9 => "9",
            Num0 => "0",
            Minus => "-",
            Equals => "=",
            Backspace => "BKSP",
            Delete => "DEL",
            Tab => "TAB",
            Q => "q",
            W => "w",
            E => "e",
            R => "r",
            T => "t",
            Y => "y",
            U => "u",
            I => "i",
            O => "o",
            P => "p",
            LeftBracket => "[",
            RightBracket => "]",
            Backslash => "\\",
            Home => "HOME",
            CapsLock => "CAPSLOCK",
            A => "a",
            S => "s",
            D => "d",
            F => "f",
            G => "g",
            H => "h",
            J => "j",
            K => "k",
            L => "l",
            Semicolon => ";",
            Quote => "'",
            Enter => "ENTER",
            PageUp => "PGUP",
            LeftShift => "LSHIFT",
            Z => "z",
            X => "x",
            C => "c",
            V => "v",
            B => "b",
            N => "n",
            M => "m",
            Comma => ",",
            Period => ".",
            Slash => "/",
            RightShift => "RSHIFT",
            Up => "UP",
            PageDown => "PGDN",
            LeftCtrl => "LCTRL",
            LeftGui => "LGUI",
            LeftAlt => "LALT",
            Space => "SPACE",
            RightAlt => "RALT",
            Left => "LEFT",
            Down => "DOWN",
            Right => "RIGHT",
        }
    }

    /// Returns the key name reported by the host input subsystem.
    #[inline]
    #[must_use]
    pub fn host_name(self) -> &'static str {
        // Every usage returned by usage() has a name, see check_tables().
        self.usage().name().unwrap_or_default()
    }

    /// Returns the key for a host-reported key name. The comparison ignores
    /// ASCII case.
    pub fn from_host_name(s: &str) -> Result<Self, LookupError> {
        TABLES.lookup(&TABLES.by_host, s)
    }
}

impl Display for KeyId {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyId {
    type Err = LookupError;

    /// Parses a notation key name, ignoring ASCII case.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TABLES.lookup(&TABLES.by_name, s)
    }
}

/// Reverse lookup tables, built once from the exhaustive [`KeyId`] mappings.
#[derive(Debug)]
struct Tables {
    by_name: HashMap<String, KeyId>,
    by_host: HashMap<String, KeyId>,
    by_usage: HashMap<usage::Key, KeyId>,
    problems: Vec<String>,
}

static TABLES: Lazy<Tables> = Lazy::new(Tables::new);

impl Tables {
    fn new() -> Self {
        let n = all::<KeyId>().count();
        let mut t = Self {
            by_name: HashMap::with_capacity(n),
            by_host: HashMap::with_capacity(n),
            by_usage: HashMap::with_capacity(n),
            problems: Vec::new(),
        };
        for k in all::<KeyId>() {
            if let Some(prev) = t.by_name.insert(k.name().to_ascii_lowercase(), k) {
                t.problems
                    .push(format!("{prev:?} and {k:?} share name {:?}", k.name()));
            }
            match k.usage().name() {
                Some(host) => {
                    if let Some(prev) = t.by_host.insert(host.to_ascii_lowercase(), k) {
                        t.problems
                            .push(format!("{prev:?} and {k:?} share host name {host:?}"));
                    }
                }
                None => (t.problems).push(format!("{k:?} has no host name")),
            }
            if let Some(prev) = t.by_usage.insert(k.usage(), k) {
                t.problems
                    .push(format!("{prev:?} and {k:?} share usage {:?}", k.usage()));
            }
        }
        for p in &t.problems {
            error!("Key table problem: {p}");
        }
        t
    }

    fn lookup(&self, m: &HashMap<String, KeyId>, s: &str) -> Result<KeyId, LookupError> {
        (m.get(&s.to_ascii_lowercase()).copied()).ok_or_else(|| LookupError::Name(s.to_owned()))
    }
}

/// Verifies that the key tables are complete: every key has a unique
/// notation name, a unique HID usage, and a unique host name.
pub fn check_tables() -> Result<(), LookupError> {
    match TABLES.problems.as_slice() {
        [] => Ok(()),
        p => Err(LookupError::Table(p.join("; "))),
    }
}

/// Key event direction.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Dir {
    Release,
    Press,
}

impl Dir {
    /// Returns the wire flag for the direction.
    #[inline(always)]
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Release => 0,
            Self::Press => 1,
        }
    }

    /// Returns the direction for wire flag `v`.
    #[inline]
    #[must_use]
    pub const fn from_flag(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Release),
            1 => Some(Self::Press),
            _ => None,
        }
    }
}

impl Display for Dir {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match *self {
            Self::Release => "up",
            Self::Press => "down",
        })
    }
}

impl FromStr for Dir {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" | "press" => Ok(Self::Press),
            "up" | "release" => Ok(Self::Release),
            _ => Err(ParseError::Dir(s.to_owned())),
        }
    }
}

/// A key changing state.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyEvent {
    pub key: KeyId,
    pub dir: Dir,
}

impl KeyEvent {
    /// Creates a new key event.
    #[inline(always)]
    #[must_use]
    pub const fn new(key: KeyId, dir: Dir) -> Self {
        Self { key, dir }
    }

    /// Creates a key press event.
    #[inline(always)]
    #[must_use]
    pub const fn press(key: KeyId) -> Self {
        Self::new(key, Dir::Press)
    }

    /// Creates a key release event.
    #[inline(always)]
    #[must_use]
    pub const fn release(key: KeyId) -> Self {
        Self::new(key, Dir::Release)
    }

    /// Returns whether this is a key press.
    #[inline(always)]
    #[must_use]
    pub const fn is_press(self) -> bool {
        matches!(self.dir, Dir::Press)
    }
}

impl Display for KeyEvent {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.key, self.dir)
    }
}

impl FromStr for KeyEvent {
    type Err = ParseError;

    /// Parses `"KEY down"` or `"KEY up"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut it = s.split_whitespace();
        let (Some(key), Some(dir), None) = (it.next(), it.next(), it.next()) else {
            return Err(ParseError::Notation(s.to_owned()));
        };
        Ok(Self::new(key.parse()?, dir.parse()?))
    }
}

/// Parses a comma-separated event list, such as `"a down, b down, a up"`.
/// Whitespace around each event is ignored. The comma key is written as an
/// empty name followed by its direction (`", down"`).
pub fn parse_seq(s: &str) -> Result<Vec<KeyEvent>, ParseError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut it = s.split(',').map(str::trim);
    let mut v = Vec::new();
    while let Some(e) = it.next() {
        if !e.is_empty() {
            v.push(e.parse()?);
            continue;
        }
        let dir = (it.next())
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| ParseError::Notation(s.to_owned()))?;
        v.push(KeyEvent::new(KeyId::Comma, dir));
    }
    Ok(v)
}

/// Parses a key set where every non-whitespace character is a one-character
/// key name. Keys may repeat.
pub fn parse_key_set(s: &str) -> Result<Vec<KeyId>, LookupError> {
    let mut buf = [0; 4];
    (s.chars().filter(|c| !c.is_whitespace()))
        .map(|c| c.encode_utf8(&mut buf).parse())
        .collect()
}

/// Verifies that no key is pressed while held or released while not held,
/// and that every pressed key is eventually released.
pub fn validate(events: &[KeyEvent]) -> Result<(), SequenceError> {
    let mut held = HashSet::with_capacity(events.len() / 2);
    for (index, e) in events.iter().enumerate() {
        let key = e.key;
        match e.dir {
            Dir::Press if !held.insert(key) => {
                return Err(SequenceError::DoublePress { key, index })
            }
            Dir::Release if !held.remove(&key) => {
                return Err(SequenceError::ReleaseWithoutPress { key, index })
            }
            _ => {}
        }
    }
    match held.into_iter().min() {
        Some(key) => Err(SequenceError::Unreleased { key }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use super::*;

    #[test]
    fn tables() {
        check_tables().unwrap();
        assert_eq!(all::<KeyId>().count(), 66);
        for k in all::<KeyId>() {
            assert_eq!(KeyId::from_slot(k.slot()), Ok(k));
            assert_eq!(KeyId::from_usage(k.usage()), Ok(k));
            assert_eq!(KeyId::from_host_name(k.host_name()), Ok(k));
            assert_eq!(k.name().parse(), Ok(k));
        }
    }

    #[test]
    fn slots() {
        assert_eq!(KeyId::Esc.slot(), 0x00);
        assert_eq!(KeyId::Num9.slot(), 0x09);
        assert_eq!(KeyId::Enter.slot(), 0x2B);
        assert_eq!(KeyId::Right.slot(), 0x4A);
        assert_eq!(KeyId::from_slot(0x22), Ok(KeyId::F));
        // Gaps in the matrix and the Fn key
        for v in [0x2A, 0x2E, 0x3F, 0x47, 0x4B, 0xFF] {
            assert_eq!(KeyId::from_slot(v), Err(LookupError::Slot(v)));
        }
    }

    #[test]
    fn names() {
        assert_eq!("f".parse(), Ok(KeyId::F));
        assert_eq!("F".parse(), Ok(KeyId::F));
        assert_eq!("esc".parse(), Ok(KeyId::Esc));
        assert_eq!(",".parse(), Ok(KeyId::Comma));
        assert_eq!(
            "FN".parse::<KeyId>(),
            Err(LookupError::Name("FN".to_owned()))
        );
        assert_eq!(KeyId::LeftShift.host_name(), "left shift");
        assert_eq!(KeyId::from_host_name("Left Shift"), Ok(KeyId::LeftShift));
        assert_eq!(KeyId::from_host_name("9"), Ok(KeyId::Num9));
        assert!(KeyId::from_host_name("f13").is_err());
        assert_eq!(
            KeyId::from_usage(usage::Key::F1),
            Err(LookupError::Usage(usage::Key::F1))
        );
    }

    #[test]
    fn notation() {
        let e: KeyEvent = "9 down".parse().unwrap();
        assert_eq!(e, KeyEvent::press(KeyId::Num9));
        assert_eq!(e.to_string(), "9 down");
        assert_eq!("LSHIFT up".parse(), Ok(KeyEvent::release(KeyId::LeftShift)));
        assert_matches!(
            "a sideways".parse::<KeyEvent>(),
            Err(ParseError::Dir(_))
        );
        assert_matches!(
            "a".parse::<KeyEvent>(),
            Err(ParseError::Notation(_))
        );
        assert_matches!(
            "a down now".parse::<KeyEvent>(),
            Err(ParseError::Notation(_))
        );
        assert_matches!(
            "FN down".parse::<KeyEvent>(),
            Err(ParseError::Lookup(LookupError::Name(_)))
        );
    }

    #[test]
    fn seq() {
        use KeyId::*;
        let v = parse_seq("a down, b down, a up, c down, c up, b up").unwrap();
        assert_eq!(
            v,
            [
                KeyEvent::press(A),
                KeyEvent::press(B),
                KeyEvent::release(A),
                KeyEvent::press(C),
                KeyEvent::release(C),
                KeyEvent::release(B),
            ]
        );
        let v = parse_seq(", down, . down, , up, . up").unwrap();
        assert_eq!(
            v,
            [
                KeyEvent::press(Comma),
                KeyEvent::press(Period),
                KeyEvent::release(Comma),
                KeyEvent::release(Period),
            ]
        );
        assert_eq!(
            parse_seq(",down,, up").unwrap(),
            [KeyEvent::press(Comma), KeyEvent::release(Comma)]
        );
        assert_eq!(
            parse_seq("a down,b down,a up,b up").unwrap(),
            parse_seq("a down, b down, a up, b up").unwrap()
        );
        assert_eq!(
            parse_seq(" a down , b down ").unwrap(),
            [KeyEvent::press(A), KeyEvent::press(B)]
        );
        assert!(parse_seq("").unwrap().is_empty());
        assert!(parse_seq("  ").unwrap().is_empty());
        assert_matches!(parse_seq("a down, b"), Err(ParseError::Notation(_)));
        assert_matches!(parse_seq("a down b down"), Err(ParseError::Notation(_)));
        assert_matches!(parse_seq("a down,"), Err(ParseError::Notation(_)));
        assert_matches!(parse_seq("a down, , sideways"), Err(ParseError::Notation(_)));
    }

    #[test]
    fn key_set() {
        use KeyId::*;
        assert_eq!(parse_key_set("a1,;").unwrap(), [A, Num1, Comma, Semicolon]);
        assert_eq!(parse_key_set("aa a").unwrap(), [A, A, A]);
        assert_eq!(parse_key_set("a#"), Err(LookupError::Name("#".to_owned())));
    }

    #[test]
    fn validate_seq() {
        use KeyId::*;
        assert_eq!(validate(&parse_seq("a down, a up, a down, a up").unwrap()), Ok(()));
        assert_eq!(
            validate(&parse_seq("a down, a down").unwrap()),
            Err(SequenceError::DoublePress { key: A, index: 1 })
        );
        assert_eq!(
            validate(&parse_seq("a down, b up").unwrap()),
            Err(SequenceError::ReleaseWithoutPress { key: B, index: 1 })
        );
        assert_eq!(
            validate(&parse_seq("a down, b down, b up").unwrap()),
            Err(SequenceError::Unreleased { key: A })
        );
    }
}

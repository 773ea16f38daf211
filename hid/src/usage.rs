//! Keyboard/Keypad usage page and host key names.

/// Keyboard/Keypad usage IDs (\[HUT\] Section 10). Only the usages that a
/// boot-compatible keyboard reports are listed: the alphanumeric block,
/// navigation cluster, and the eight modifiers.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, num_enum::IntoPrimitive, num_enum::FromPrimitive,
)]
#[cfg_attr(test, derive(enum_iterator::Sequence))]
#[non_exhaustive]
#[repr(u8)]
pub enum Key {
    #[default]
    /// No key.
    None = 0x00,
    /// Keyboard ErrorRollOver.
    ErrRollOver = 0x01,
    /// Keyboard POSTFail.
    PostFail = 0x02,
    /// Keyboard ErrorUndefined.
    ErrUndefined = 0x03,
    /// Keyboard a and A.
    A = 0x04,
    /// Keyboard b and B.
    B = 0x05,
    /// Keyboard c and C.
    C = 0x06,
    /// Keyboard d and D.
    D = 0x07,
    /// Keyboard e and E.
    E = 0x08,
    /// Keyboard f and F.
    F = 0x09,
    /// Keyboard g and G.
    G = 0x0A,
    /// Keyboard h and H.
    H = 0x0B,
    /// Keyboard i and I.
    I = 0x0C,
    /// Keyboard j and J.
    J = 0x0D,
    /// Keyboard k and K.
    K = 0x0E,
    /// Keyboard l and L.
    L = 0x0F,
    /// Keyboard m and M.
    M = 0x10,
    /// Keyboard n and N.
    N = 0x11,
    /// Keyboard o and O.
    O = 0x12,
    /// Keyboard p and P.
    P = 0x13,
    /// Keyboard q and Q.
    Q = 0x14,
    /// Keyboard r and R.
    R = 0x15,
    /// Keyboard s and S.
    S = 0x16,
    /// Keyboard t and T.
    T = 0x17,
    /// Keyboard u and U.
    U = 0x18,
    /// Keyboard v and V.
    V = 0x19,
    /// Keyboard w and W.
    W = 0x1A,
    /// Keyboard x and X.
    X = 0x1B,
    /// Keyboard y and Y.
    Y = 0x1C,
    /// Keyboard z and Z.
    Z = 0x1D,
    /// Keyboard 1 and !.
    Num1 = 0x1E,
    /// Keyboard 2 and @.
    Num2 = 0x1F,
    /// Keyboard 3 and #.
    Num3 = 0x20,
    /// Keyboard 4 and $.
    Num4 = 0x21,
    /// Keyboard 5 and %.
    Num5 = 0x22,
    /// Keyboard 6 and ^.
    Num6 = 0x23,
    /// Keyboard 7 and &.
    Num7 = 0x24,
    /// Keyboard 8 and *.
    Num8 = 0x25,
    /// Keyboard 9 and (.
    Num9 = 0x26,
    /// Keyboard 0 and ).
    Num0 = 0x27,
    /// Keyboard Return (ENTER).
    Enter = 0x28,
    /// Keyboard ESCAPE.
    Esc = 0x29,
    /// Keyboard DELETE (Backspace).
    Backspace = 0x2A,
    /// Keyboard Tab.
    Tab = 0x2B,
    /// Keyboard Spacebar.
    Space = 0x2C,
    /// Keyboard - and _.
    Minus = 0x2D,
    /// Keyboard = and +.
    Equals = 0x2E,
    /// Keyboard [ and {.
    LeftBracket = 0x2F,
    /// Keyboard ] and }.
    RightBracket = 0x30,
    /// Keyboard \ and |.
    Backslash = 0x31,
    /// Keyboard Non-US # and ~.
    NonUsPound = 0x32,
    /// Keyboard ; and :.
    Semicolon = 0x33,
    /// Keyboard ' and ".
    Quote = 0x34,
    /// Keyboard ` and ~.
    Backquote = 0x35,
    /// Keyboard , and <.
    Comma = 0x36,
    /// Keyboard . and >.
    Period = 0x37,
    /// Keyboard / and ?.
    Slash = 0x38,
    /// Keyboard Caps Lock.
    CapsLock = 0x39,
    /// Keyboard F1.
    F1 = 0x3A,
    /// Keyboard F2.
    F2 = 0x3B,
    /// Keyboard F3.
    F3 = 0x3C,
    /// Keyboard F4.
    F4 = 0x3D,
    /// Keyboard F5.
    F5 = 0x3E,
    /// Keyboard F6.
    F6 = 0x3F,
    /// Keyboard F7.
    F7 = 0x40,
    /// Keyboard F8.
    F8 = 0x41,
    /// Keyboard F9.
    F9 = 0x42,
    /// Keyboard F10.
    F10 = 0x43,
    /// Keyboard F11.
    F11 = 0x44,
    /// Keyboard F12.
    F12 = 0x45,
    /// Keyboard PrintScreen.
    PrintScreen = 0x46,
    /// Keyboard Scroll Lock.
    ScrollLock = 0x47,
    /// Keyboard Pause.
    Pause = 0x48,
    /// Keyboard Insert.
    Insert = 0x49,
    /// Keyboard Home.
    Home = 0x4A,
    /// Keyboard PageUp.
    PageUp = 0x4B,
    /// Keyboard Delete Forward.
    Delete = 0x4C,
    /// Keyboard End.
    End = 0x4D,
    /// Keyboard PageDown.
    PageDown = 0x4E,
    /// Keyboard RightArrow.
    Right = 0x4F,
    /// Keyboard LeftArrow.
    Left = 0x50,
    /// Keyboard DownArrow.
    Down = 0x51,
    /// Keyboard UpArrow.
    Up = 0x52,
    /// Keypad Num Lock and Clear.
    PadNumLock = 0x53,
    /// Keyboard LeftControl.
    LeftCtrl = 0xE0,
    /// Keyboard LeftShift.
    LeftShift = 0xE1,
    /// Keyboard LeftAlt.
    LeftAlt = 0xE2,
    /// Keyboard Left GUI.
    LeftGui = 0xE3,
    /// Keyboard RightControl.
    RightCtrl = 0xE4,
    /// Keyboard RightShift.
    RightShift = 0xE5,
    /// Keyboard RightAlt.
    RightAlt = 0xE6,
    /// Keyboard Right GUI.
    RightGui = 0xE7,
}

impl Key {
    /// Returns the key name reported by the host input subsystem when a key
    /// with this usage changes state, or [`None`] for error and reserved
    /// usages that never produce a key event.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        use Key::*;
        Some(match self {
            A => "a",
            B => "b",
            C => "c",
            D => "d",
            E => "e",
            F => "f",
            G => "g",
            H => "h",
            I => "i",
            J => "j",
            K => "k",
            L => "l",
            M => "m",
            N => "n",
            O => "o",
            P => "p",
            Q => "q",
            R => "r",
            S => "s",
            T => "t",
            U => "u",
            V => "v",
            W => "w",
            X => "x",
            Y => "y",
            Z => "z",
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
            Enter => "enter",
            Esc => "esc",
            Backspace => "backspace",
            Tab => "tab",
            Space => "space",
            Minus => "-",
            Equals => "=",
            LeftBracket => "[",
            RightBracket => "]",
            Backslash => "\\",
            NonUsPound => "nonus hash",
            Semicolon => ";",
            Quote => "'",
            Backquote => "`",
            Comma => ",",
            Period => ".",
            Slash => "/",
            CapsLock => "caps lock",
            F1 => "f1",
            F2 => "f2",
            F3 => "f3",
            F4 => "f4",
            F5 => "f5",
            F6 => "f6",
            F7 => "f7",
            F8 => "f8",
            F9 => "f9",
            F10 => "f10",
            F11 => "f11",
            F12 => "f12",
            PrintScreen => "print screen",
            ScrollLock => "scroll lock",
            Pause => "pause",
            Insert => "insert",
            Home => "home",
            PageUp => "page up",
            Delete => "delete",
            End => "end",
            PageDown => "page down",
            Right => "right",
            Left => "left",
            Down => "down",
            Up => "up",
            PadNumLock => "num lock",
            LeftCtrl => "left ctrl",
            LeftShift => "left shift",
            LeftAlt => "left alt",
            LeftGui => "left gui",
            RightCtrl => "right ctrl",
            RightShift => "right shift",
            RightAlt => "right alt",
            RightGui => "right gui",
            None | ErrRollOver | PostFail | ErrUndefined => return Option::None,
        })
    }
}

impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            Option::None => core::fmt::Debug::fmt(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::string::ToString;

    use enum_iterator::all;

    use super::*;

    #[test]
    fn names_unique() {
        for a in all::<Key>() {
            for b in all::<Key>().filter(|&b| b != a) {
                if let (Some(x), Some(y)) = (a.name(), b.name()) {
                    assert_ne!(x, y, "{a:?} and {b:?} share a name");
                }
            }
        }
    }

    #[test]
    fn from_primitive() {
        assert_eq!(Key::from(0x04), Key::A);
        assert_eq!(Key::from(0x27), Key::Num0);
        assert_eq!(Key::from(0xE1), Key::LeftShift);
        assert_eq!(Key::from(0x54), Key::None);
        assert_eq!(u8::from(Key::Space), 0x2C);
    }

    #[test]
    fn display() {
        assert_eq!(Key::Num9.to_string(), "9");
        assert_eq!(Key::LeftShift.to_string(), "left shift");
        assert_eq!(Key::ErrRollOver.to_string(), "ErrRollOver");
    }
}

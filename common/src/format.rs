//! Allocation-free formatted output.
//!
//! A small `printf` lookalike that renders integers and strings straight
//! onto an [`OutputChannel`], one byte at a time, without `core::fmt`.
//!
//! # Directive grammar
//!
//! ```text
//! %[-][0][width][w]type
//! ```
//!
//! - `-`: padding goes after the value instead of before it
//! - `0`: leading padding uses zeros instead of spaces (integers only)
//! - `width`: minimum output length, in decimal
//! - `w`: the integer operand is 64-bit wide
//! - `type`: `d` signed decimal, `u` unsigned decimal, `x`/`X` lower/upper
//!   hexadecimal, `s` string
//!
//! Trailing padding is always spaces. An unrecognized type character emits
//! a single `%` and is consumed. Running out of format text in the middle
//! of a directive ends rendering. `%%` is not special: the second `%` is an
//! unrecognized type, so it still renders as one `%`.
//!
//! # Usage
//!
//! ```ignore
//! use bench_common::render;
//!
//! render!(&mut uart, "kg: %9u  rs=%u\n", kgen_avg, restarts);
//! ```

use crate::channel::OutputChannel;

/// Longest digit string for a 64-bit value in base 10 or 16.
const MAX_DIGITS: usize = 20;

// =============================================================================
// Arguments
// =============================================================================

/// One argument for [`render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg<'a> {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Str(&'a str),
}

impl Arg<'_> {
    /// Raw 64-bit pattern of a numeric argument (signed values sign-extended).
    const fn bits(self) -> Option<u64> {
        match self {
            Self::I32(v) => Some(v as i64 as u64),
            Self::I64(v) => Some(v as u64),
            Self::U32(v) => Some(v as u64),
            Self::U64(v) => Some(v),
            Self::Str(_) => None,
        }
    }

    /// Value as seen by a `%d` directive of the given operand width.
    const fn as_signed(
        self,
        wide: bool,
    ) -> Option<i64> {
        match self.bits() {
            Some(raw) if wide => Some(raw as i64),
            Some(raw) => Some(raw as u32 as i32 as i64),
            None => None,
        }
    }

    /// Value as seen by a `%u`/`%x`/`%X` directive of the given operand width.
    const fn as_unsigned(
        self,
        wide: bool,
    ) -> Option<u64> {
        match self.bits() {
            Some(raw) if wide => Some(raw),
            Some(raw) => Some(raw as u32 as u64),
            None => None,
        }
    }
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self { Self::I32(v) }
}

impl From<i64> for Arg<'_> {
    fn from(v: i64) -> Self { Self::I64(v) }
}

impl From<u8> for Arg<'_> {
    fn from(v: u8) -> Self { Self::U32(u32::from(v)) }
}

impl From<u16> for Arg<'_> {
    fn from(v: u16) -> Self { Self::U32(u32::from(v)) }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self { Self::U32(v) }
}

impl From<u64> for Arg<'_> {
    fn from(v: u64) -> Self { Self::U64(v) }
}

impl From<usize> for Arg<'_> {
    fn from(v: usize) -> Self { Self::U64(v as u64) }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self { Self::Str(v) }
}

// =============================================================================
// Directive parsing
// =============================================================================

/// Conversion selected by a directive's type character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    SignedDecimal,
    UnsignedDecimal,
    HexLower,
    HexUpper,
    String,
}

impl Conversion {
    const fn from_type(c: u8) -> Option<Self> {
        match c {
            b'd' => Some(Self::SignedDecimal),
            b'u' => Some(Self::UnsignedDecimal),
            b'x' => Some(Self::HexLower),
            b'X' => Some(Self::HexUpper),
            b's' => Some(Self::String),
            _ => None,
        }
    }
}

/// One parsed `%` directive.
///
/// `zero_pad` is never set together with `left_align`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    pub left_align: bool,
    pub zero_pad: bool,
    pub wide: bool,
    pub width: u32,
    pub conversion: Conversion,
}

/// Outcome of parsing the text that follows a `%`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// A well-formed directive.
    Spec(FormatSpec),
    /// Unrecognized type character; renders as a literal `%`.
    Unknown,
    /// Format text ended inside the directive; rendering stops.
    End,
}

impl FormatSpec {
    /// Parse the directive starting right after a `%`.
    ///
    /// Returns the directive and the number of bytes of `text` it consumed,
    /// including the type character (recognized or not).
    pub fn parse(text: &[u8]) -> (Directive, usize) {
        let mut pos = 0;
        let mut next = || {
            let c = text.get(pos).copied();
            if c.is_some() {
                pos += 1;
            }
            c
        };

        let mut left_align = false;
        let mut zero_pad = false;
        let mut wide = false;
        let mut width: u32 = 0;

        let mut c = next();
        if c == Some(b'-') {
            left_align = true;
            c = next();
        }
        if c == Some(b'0') {
            zero_pad = true;
        }
        while let Some(d @ b'0'..=b'9') = c {
            width = width.saturating_mul(10).saturating_add(u32::from(d - b'0'));
            c = next();
        }
        if c == Some(b'w') {
            wide = true;
            c = next();
        }
        // Trailing padding is always spaces
        if left_align {
            zero_pad = false;
        }

        let directive = match c {
            None => Directive::End,
            Some(t) => match Conversion::from_type(t) {
                Some(conversion) => Directive::Spec(Self {
                    left_align,
                    zero_pad,
                    wide,
                    width,
                    conversion,
                }),
                None => Directive::Unknown,
            },
        };
        (directive, pos)
    }

    /// Render one argument according to this directive.
    ///
    /// An argument of the wrong kind (string for a numeric conversion or
    /// the reverse) renders nothing.
    pub fn render<C: OutputChannel + ?Sized>(
        &self,
        out: &mut C,
        arg: Arg<'_>,
    ) {
        let width = self.width as usize;
        let leading = !self.left_align;
        match self.conversion {
            Conversion::SignedDecimal => {
                if let Some(v) = arg.as_signed(self.wide) {
                    send_signed(out, v, width, self.zero_pad, leading);
                }
            }
            Conversion::UnsignedDecimal | Conversion::HexLower | Conversion::HexUpper => {
                if let Some(v) = arg.as_unsigned(self.wide) {
                    let (base, upper) = match self.conversion {
                        Conversion::UnsignedDecimal => (10, false),
                        Conversion::HexLower => (16, false),
                        _ => (16, true),
                    };
                    let digits = Digits::new(v, base, upper);
                    let pad = if self.zero_pad { b'0' } else { b' ' };
                    send_padded(out, digits.as_bytes(), width, pad, leading);
                }
            }
            Conversion::String => {
                if let Arg::Str(s) = arg {
                    send_padded(out, s.as_bytes(), width, b' ', leading);
                }
            }
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render `fmt` onto `out`, consuming `args` left to right.
///
/// A directive with no argument left renders nothing; surplus arguments
/// are ignored. Never fails.
pub fn render<C: OutputChannel + ?Sized>(
    out: &mut C,
    fmt: &str,
    args: &[Arg<'_>],
) {
    let text = fmt.as_bytes();
    let mut args = args.iter().copied();
    let mut pos = 0;

    while pos < text.len() {
        let c = text[pos];
        pos += 1;
        if c != b'%' {
            out.send(c);
            continue;
        }

        let (directive, used) = FormatSpec::parse(&text[pos..]);
        pos += used;
        match directive {
            Directive::Spec(spec) => {
                if let Some(arg) = args.next() {
                    spec.render(out, arg);
                }
            }
            Directive::Unknown => out.send(b'%'),
            Directive::End => return,
        }
    }
}

/// Render a format string with arguments converted through [`Arg::from`].
///
/// ```ignore
/// render!(&mut out, "num = %u\n", iteration);
/// ```
#[macro_export]
macro_rules! render {
    ($out:expr, $fmt:expr $(,)?) => {
        $crate::format::render($out, $fmt, &[])
    };
    ($out:expr, $fmt:expr, $($arg:expr),+ $(,)?) => {
        $crate::format::render($out, $fmt, &[$($crate::format::Arg::from($arg)),+])
    };
}

/// Digits of an unsigned value, most significant first.
struct Digits {
    buf: [u8; MAX_DIGITS],
    start: usize,
}

impl Digits {
    /// Convert `x` in base 10 or 16. Zero yields a single `0`.
    fn new(
        mut x: u64,
        base: u64,
        upper: bool,
    ) -> Self {
        let letters = if upper { b'A' } else { b'a' };
        let mut buf = [0u8; MAX_DIGITS];
        let mut start = MAX_DIGITS;
        loop {
            let d = (x % base) as u8;
            x /= base;
            start -= 1;
            buf[start] = if d < 10 { b'0' + d } else { letters + (d - 10) };
            if x == 0 {
                break;
            }
        }
        Self { buf, start }
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] { &self.buf[self.start..] }

    #[inline]
    fn len(&self) -> usize { MAX_DIGITS - self.start }
}

fn send_repeat<C: OutputChannel + ?Sized>(
    out: &mut C,
    byte: u8,
    count: usize,
) {
    for _ in 0..count {
        out.send(byte);
    }
}

/// Send `s`, padded with `pad` up to `width` before (`leading`) or after it.
fn send_padded<C: OutputChannel + ?Sized>(
    out: &mut C,
    s: &[u8],
    width: usize,
    pad: u8,
    leading: bool,
) {
    let fill = width.saturating_sub(s.len());
    if leading {
        send_repeat(out, pad, fill);
    }
    out.send_all(s);
    if !leading {
        send_repeat(out, pad, fill);
    }
}

/// Signed decimal. Zero padding goes after the `-`, space padding before it.
fn send_signed<C: OutputChannel + ?Sized>(
    out: &mut C,
    x: i64,
    width: usize,
    zero_pad: bool,
    leading: bool,
) {
    let pad = if zero_pad { b'0' } else { b' ' };
    if x >= 0 {
        let digits = Digits::new(x as u64, 10, false);
        send_padded(out, digits.as_bytes(), width, pad, leading);
        return;
    }

    // unsigned_abs() is exact for i64::MIN
    let digits = Digits::new(x.unsigned_abs(), 10, false);
    let fill = width.saturating_sub(digits.len() + 1);
    if !leading {
        out.send(b'-');
        out.send_all(digits.as_bytes());
        send_repeat(out, b' ', fill);
    } else if zero_pad {
        out.send(b'-');
        send_repeat(out, b'0', fill);
        out.send_all(digits.as_bytes());
    } else {
        send_repeat(out, b' ', fill);
        out.send(b'-');
        out.send_all(digits.as_bytes());
    }
}

/*!
 * String Escaping
 * Two-phase "assume clean, fix up only if dirty" escaping
 *
 * The hot path speculatively copies the raw text into the buffer at its
 * final position, then scans the copied region once, counting specials and
 * remembering the position and identity of the LAST special. Three cases:
 *
 * - 0 specials: nothing further to do
 * - 1 special: a single in-place shift inserts the exact escape sequence
 *   at the remembered position - no second full scan
 * - >1 specials: rewind to the FIRST special and re-emit the remaining
 *   input escaped byte-by-byte
 *
 * All three paths produce byte-identical output; they differ only in work
 * performed. The streaming (sink-attached) variant takes the byte-by-byte
 * path unconditionally when the projected length exceeds capacity, since
 * in-place fixups cannot span a flush boundary.
 *
 * Classification is table-driven per mode: a 64-entry bitset for the low
 * range (`Derived::special_bits`), explicit tests for `\`, DEL, the C1
 * range, and U+2028/U+2029, and - in browser-compatible mode - every
 * non-ASCII scalar.
 */

use super::OutBuffer;
use crate::core::errors::SerResult;
use crate::features::{Derived, EscapeMode};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Escape sequence for one input unit (1-3 bytes of UTF-8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Esc {
    /// No escaping needed, pass through raw
    None,
    /// Backslash plus one letter: `\n`, `\"`, `\\`, ...
    Short(u8),
    /// `\uXXXX`
    U16(u16),
    /// Surrogate pair `\uD8XX\uDCXX` for astral scalars
    Pair(u16, u16),
}

impl Esc {
    /// Encoded length in output bytes
    #[inline]
    pub(crate) fn out_len(self) -> usize {
        match self {
            Esc::None => 0,
            Esc::Short(_) => 2,
            Esc::U16(_) => 6,
            Esc::Pair(_, _) => 12,
        }
    }

    /// Render into `dst`, returning the number of bytes written
    pub(crate) fn render(self, dst: &mut [u8]) -> usize {
        match self {
            Esc::None => 0,
            Esc::Short(c) => {
                dst[0] = b'\\';
                dst[1] = c;
                2
            }
            Esc::U16(v) => {
                render_u16(v, dst);
                6
            }
            Esc::Pair(hi, lo) => {
                render_u16(hi, dst);
                render_u16(lo, &mut dst[6..]);
                12
            }
        }
    }
}

#[inline]
fn render_u16(v: u16, dst: &mut [u8]) {
    dst[0] = b'\\';
    dst[1] = b'u';
    dst[2] = HEX_UPPER[(v >> 12) as usize & 0xF];
    dst[3] = HEX_UPPER[(v >> 8) as usize & 0xF];
    dst[4] = HEX_UPPER[(v >> 4) as usize & 0xF];
    dst[5] = HEX_UPPER[v as usize & 0xF];
}

#[inline]
fn classify_ascii(b: u8, d: &Derived) -> Esc {
    match d.mode {
        EscapeMode::Plain => {
            if b == b'\\' {
                return Esc::Short(b'\\');
            }
            if b < 64 && d.special_bits & (1u64 << b) != 0 {
                return match b {
                    0x08 => Esc::Short(b'b'),
                    0x09 => Esc::Short(b't'),
                    0x0A => Esc::Short(b'n'),
                    0x0C => Esc::Short(b'f'),
                    0x0D => Esc::Short(b'r'),
                    b'"' | b'\'' | b'/' => Esc::Short(b),
                    // browser-secure markup characters and the remaining
                    // C0 controls take the numeric form
                    _ => Esc::U16(u16::from(b)),
                };
            }
            if b == 0x7F {
                return Esc::U16(0x7F);
            }
            Esc::None
        }
        EscapeMode::BrowserCompatible => match b {
            0x08 => Esc::Short(b'b'),
            0x09 => Esc::Short(b't'),
            0x0A => Esc::Short(b'n'),
            0x0C => Esc::Short(b'f'),
            0x0D => Esc::Short(b'r'),
            b'"' | b'\\' | b'/' => Esc::Short(b),
            _ if b < 0x20 || b == 0x7F => Esc::U16(u16::from(b)),
            b'(' | b')' | b'<' | b'>' if d.browser_secure => Esc::U16(u16::from(b)),
            _ if b == d.quote => Esc::Short(b),
            _ => Esc::None,
        },
    }
}

/// Decode the scalar starting at `i`; the caller guarantees `bytes` came
/// from a `&str`, so the sequence is well-formed
#[inline]
fn decode_char(bytes: &[u8], i: usize) -> (char, usize) {
    let width = match bytes[i] {
        b if b < 0x80 => 1,
        b if b < 0xE0 => 2,
        b if b < 0xF0 => 3,
        _ => 4,
    };
    let end = (i + width).min(bytes.len());
    match std::str::from_utf8(&bytes[i..end]) {
        Ok(s) => s
            .chars()
            .next()
            .map(|c| (c, width))
            .unwrap_or(('\u{FFFD}', 1)),
        Err(_) => ('\u{FFFD}', 1),
    }
}

/// Classify the input unit at `i`: (source length in bytes, escape)
#[inline]
pub(crate) fn classify(bytes: &[u8], i: usize, d: &Derived) -> (usize, Esc) {
    let b = bytes[i];
    if b < 0x80 {
        return (1, classify_ascii(b, d));
    }
    match d.mode {
        EscapeMode::Plain => {
            // C1 controls (U+0080..U+009F) and the line/paragraph
            // separators are escaped even in plain mode
            if b == 0xC2 && i + 1 < bytes.len() && (0x80..=0x9F).contains(&bytes[i + 1]) {
                (2, Esc::U16(u16::from(bytes[i + 1])))
            } else if b == 0xE2
                && i + 2 < bytes.len()
                && bytes[i + 1] == 0x80
                && (bytes[i + 2] | 1) == 0xA9
            {
                (3, Esc::U16(0x2028 | u16::from(bytes[i + 2] & 1)))
            } else {
                (1, Esc::None)
            }
        }
        EscapeMode::BrowserCompatible => {
            let (ch, width) = decode_char(bytes, i);
            let cp = ch as u32;
            if cp <= 0xFFFF {
                (width, Esc::U16(cp as u16))
            } else {
                let v = cp - 0x10000;
                (
                    width,
                    Esc::Pair(0xD800 | (v >> 10) as u16, 0xDC00 | (v & 0x3FF) as u16),
                )
            }
        }
    }
}

/// Scan results over a copied region
struct Scan {
    specials: usize,
    first: usize,
    last: usize,
    last_src: usize,
    last_esc: Esc,
    extra: usize,
}

fn scan(bytes: &[u8], d: &Derived) -> Scan {
    let mut s = Scan {
        specials: 0,
        first: 0,
        last: 0,
        last_src: 0,
        last_esc: Esc::None,
        extra: 0,
    };
    let mut i = 0;
    while i < bytes.len() {
        let (src, esc) = classify(bytes, i, d);
        if esc != Esc::None {
            if s.specials == 0 {
                s.first = i;
            }
            s.specials += 1;
            s.last = i;
            s.last_src = src;
            s.last_esc = esc;
            s.extra += esc.out_len() - src;
        }
        i += src;
    }
    s
}

/// Append `bytes` to `buf`, escaping as classified. Capacity must already
/// be sufficient; pushes here never reallocate.
fn emit_escaped(buf: &mut Vec<u8>, bytes: &[u8], d: &Derived) {
    let mut tmp = [0u8; 12];
    let mut i = 0;
    let mut raw = 0;
    while i < bytes.len() {
        let (src, esc) = classify(bytes, i, d);
        if esc == Esc::None {
            i += src;
            continue;
        }
        if raw < i {
            buf.extend_from_slice(&bytes[raw..i]);
        }
        let n = esc.render(&mut tmp);
        buf.extend_from_slice(&tmp[..n]);
        i += src;
        raw = i;
    }
    if raw < bytes.len() {
        buf.extend_from_slice(&bytes[raw..]);
    }
}

fn needs_escape(bytes: &[u8], d: &Derived) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let (src, esc) = classify(bytes, i, d);
        if esc != Esc::None {
            return true;
        }
        i += src;
    }
    false
}

impl OutBuffer {
    /// Write a quoted, escaped JSON string
    pub fn write_string(&mut self, text: &str) -> SerResult<()> {
        self.check_usable()?;
        let d = *self.derived();
        let needed = self.buf.len() + text.len() + 2;
        self.check_cap(needed)?;
        if self.sink_attached() {
            if needed > self.buf.capacity() {
                return self.write_string_streaming(text, &d);
            }
        } else if needed > self.buf.capacity() {
            self.grow(needed)?;
        }

        self.buf.push(d.quote);
        let body = self.buf.len();
        self.buf.extend_from_slice(text.as_bytes());

        let s = scan(&self.buf[body..], &d);
        if s.specials == 0 {
            self.buf.push(d.quote);
            return Ok(());
        }

        let new_len = self.buf.len() + s.extra;
        self.check_cap(new_len + 1)?;
        if new_len + 1 > self.buf.capacity() {
            self.grow(new_len + 1)?;
        }

        if s.specials == 1 {
            // shift the clean tail right once and splice the escape in
            let pos = body + s.last;
            let old_len = self.buf.len();
            self.buf.resize(new_len, 0);
            self.buf
                .copy_within(pos + s.last_src..old_len, pos + s.last_src + s.extra);
            let out_len = s.last_esc.out_len();
            s.last_esc.render(&mut self.buf[pos..pos + out_len]);
        } else {
            // rewind to the first special and re-emit the rest escaped
            self.buf.truncate(body + s.first);
            emit_escaped(&mut self.buf, &text.as_bytes()[s.first..], &d);
        }
        self.buf.push(d.quote);
        Ok(())
    }

    /// Streaming escape path: chunked raw runs with escapes spliced
    /// between, flushing through the fixed buffer as needed
    fn write_string_streaming(&mut self, text: &str, d: &Derived) -> SerResult<()> {
        self.write_byte(d.quote)?;
        let bytes = text.as_bytes();
        let mut tmp = [0u8; 12];
        let mut i = 0;
        let mut raw = 0;
        while i < bytes.len() {
            let (src, esc) = classify(bytes, i, d);
            if esc == Esc::None {
                i += src;
                continue;
            }
            if raw < i {
                self.write_raw(&bytes[raw..i])?;
            }
            let n = esc.render(&mut tmp);
            self.write_raw(&tmp[..n])?;
            i += src;
            raw = i;
        }
        if raw < bytes.len() {
            self.write_raw(&bytes[raw..])?;
        }
        self.write_byte(d.quote)
    }

    /// Emit `"name":` / `'name':` / bare `name:` per the quoting features.
    /// Unquoted mode still falls back to quoting when any character of the
    /// name would need escaping.
    pub fn write_field_name(&mut self, name: &str) -> SerResult<()> {
        let d = *self.derived();
        if d.quote_field_names || name.is_empty() || needs_escape(name.as_bytes(), &d) {
            self.write_string(name)?;
        } else {
            self.write_raw(name.as_bytes())?;
        }
        self.write_byte(b':')
    }
}

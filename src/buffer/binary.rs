/*!
 * Byte Array Encoding
 * Base64 by default, hex literals under type-name preservation
 */

use super::OutBuffer;
use crate::core::errors::{SerResult, SerializeError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

impl OutBuffer {
    /// Write a byte array as a quoted base64 string (standard alphabet,
    /// `=` padding). Under WRITE_CLASS_NAME an `x'AB12'` hex literal is
    /// produced instead so the decoder can tell bytes from text.
    pub fn write_bytes_b64(&mut self, data: &[u8]) -> SerResult<()> {
        self.check_usable()?;
        if self.derived().write_class_name {
            return self.write_hex(data);
        }
        let quote = self.derived().quote;
        if data.is_empty() {
            return self.write_raw(if quote == b'\'' { b"''" } else { b"\"\"" });
        }

        let encoded_len = data.len().div_ceil(3) * 4;
        let needed = self.buf.len() + encoded_len + 2;
        self.check_cap(needed)?;
        if self.sink_attached() && needed > self.buf.capacity() {
            // slow path: one transient allocation, then chunked flushes
            let encoded = STANDARD.encode(data);
            self.write_byte(quote)?;
            self.write_raw(encoded.as_bytes())?;
            return self.write_byte(quote);
        }
        if needed > self.buf.capacity() {
            self.grow(needed)?;
        }
        self.buf.push(quote);
        let at = self.buf.len();
        self.buf.resize(at + encoded_len, 0);
        let written = STANDARD
            .encode_slice(data, &mut self.buf[at..])
            .map_err(|_| SerializeError::Format {
                type_name: "byte array",
            })?;
        self.buf.truncate(at + written);
        self.buf.push(quote);
        Ok(())
    }

    /// `x'AB12'` hex literal; the delimiters are single quotes regardless
    /// of the quote feature
    pub fn write_hex(&mut self, data: &[u8]) -> SerResult<()> {
        self.check_usable()?;
        let needed = self.buf.len() + data.len() * 2 + 3;
        self.check_cap(needed)?;
        if self.sink_attached() && needed > self.buf.capacity() {
            self.write_raw(b"x'")?;
            for &b in data {
                let pair = [
                    HEX_UPPER[(b >> 4) as usize],
                    HEX_UPPER[(b & 0xF) as usize],
                ];
                self.write_raw(&pair)?;
            }
            return self.write_byte(b'\'');
        }
        if needed > self.buf.capacity() {
            self.grow(needed)?;
        }
        self.buf.push(b'x');
        self.buf.push(b'\'');
        for &b in data {
            self.buf.push(HEX_UPPER[(b >> 4) as usize]);
            self.buf.push(HEX_UPPER[(b & 0xF) as usize]);
        }
        self.buf.push(b'\'');
        Ok(())
    }
}

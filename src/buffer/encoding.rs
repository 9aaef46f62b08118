/*!
 * Output Encodings
 * UTF-8 fast path plus a generic re-encoding fallback
 */

use super::OutBuffer;
use crate::core::errors::{SerResult, SerializeError};

/// Target character encoding for buffer extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// The buffer's native encoding; extraction is a straight copy
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl OutBuffer {
    /// Write the buffered text to `out` in the given encoding, returning
    /// the number of bytes written. In-memory mode only.
    pub fn write_to(&self, out: &mut dyn std::io::Write, encoding: Encoding) -> SerResult<usize> {
        if self.sink_attached() {
            return Err(SerializeError::SinkAttached);
        }
        match encoding {
            Encoding::Utf8 => {
                out.write_all(&self.buf).map_err(SerializeError::SinkIo)?;
                Ok(self.buf.len())
            }
            _ => {
                let bytes = self.encoded_bytes(encoding)?;
                out.write_all(&bytes).map_err(SerializeError::SinkIo)?;
                Ok(bytes.len())
            }
        }
    }

    /// Buffered text re-encoded into a fresh byte vector
    pub fn encoded_bytes(&self, encoding: Encoding) -> SerResult<Vec<u8>> {
        if self.sink_attached() {
            return Err(SerializeError::SinkAttached);
        }
        match encoding {
            Encoding::Utf8 => Ok(self.buf.clone()),
            Encoding::Utf16Le | Encoding::Utf16Be => {
                let text =
                    std::str::from_utf8(&self.buf).map_err(|_| SerializeError::InvalidUtf8)?;
                let mut bytes = Vec::with_capacity(self.buf.len() * 2);
                let mut units = [0u16; 2];
                for ch in text.chars() {
                    for unit in ch.encode_utf16(&mut units) {
                        let pair = if encoding == Encoding::Utf16Le {
                            unit.to_le_bytes()
                        } else {
                            unit.to_be_bytes()
                        };
                        bytes.extend_from_slice(&pair);
                    }
                }
                Ok(bytes)
            }
        }
    }
}

/*!
 * Output Buffer
 * Growable UTF-8 output buffer with escaping, numeric formatting, and
 * optional streaming sink
 *
 * # Performance
 *
 * - Speculative-copy escaping: clean strings cost one memcpy plus one scan
 * - Digits and floats formatted on the stack (itoa/ryu), one memcpy each
 * - Thread-local buffer reuse between calls (`core::pool`)
 *
 * # Resource model
 *
 * Without a sink the buffer grows by 1.5x (+1) per expansion and never
 * shrinks; an optional `max_size` converts runaway output into a
 * deterministic `CapacityExceeded`. With a sink attached the buffer stays
 * at a fixed capacity and flushes instead of growing: bounded memory,
 * unbounded output length. A sink failure poisons the writer permanently.
 */

pub mod binary;
pub mod encoding;
pub mod escape;
pub mod number;

pub use encoding::Encoding;

use crate::core::errors::{SerResult, SerializeError};
use crate::core::limits::{DEFAULT_BUFFER_CAPACITY, STREAM_BUFFER_CAPACITY};
use crate::core::pool;
use crate::core::types::NullKind;
use crate::features::{compute_derived, Derived, Features};
use std::io::Write;

/// Growable output buffer owning the serialized text
pub struct OutBuffer {
    buf: Vec<u8>,
    features: Features,
    derived: Derived,
    max_size: Option<usize>,
    sink: Option<Box<dyn Write + Send>>,
    poisoned: bool,
}

impl OutBuffer {
    /// In-memory buffer with default features
    pub fn new() -> Self {
        Self::with_features(Features::default())
    }

    /// In-memory buffer with the given feature mask
    pub fn with_features(features: Features) -> Self {
        Self::with_capacity(features, DEFAULT_BUFFER_CAPACITY)
    }

    /// In-memory buffer with an explicit initial capacity
    pub fn with_capacity(features: Features, capacity: usize) -> Self {
        Self {
            buf: pool::acquire(capacity),
            features,
            derived: compute_derived(features),
            max_size: None,
            sink: None,
            poisoned: false,
        }
    }

    /// Sink-backed buffer: writes past capacity flush instead of growing
    pub fn streaming(sink: Box<dyn Write + Send>, features: Features) -> Self {
        Self {
            buf: pool::acquire(STREAM_BUFFER_CAPACITY),
            features,
            derived: compute_derived(features),
            max_size: None,
            sink: Some(sink),
            poisoned: false,
        }
    }

    /// Cap total buffered output; exceeding it fails the call
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Adjust the output cap in place
    pub fn set_max_size(&mut self, max_size: Option<usize>) {
        self.max_size = max_size;
    }

    // ------------------------------------------------------------------
    // Feature access
    // ------------------------------------------------------------------

    #[inline]
    pub fn features(&self) -> Features {
        self.features
    }

    #[inline]
    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Replace the whole mask, recomputing derived state once
    pub fn set_features(&mut self, features: Features) {
        self.features = features;
        self.derived = compute_derived(features);
    }

    /// Set or clear one flag (enum-representation exclusion applies)
    pub fn config(&mut self, flag: Features, on: bool) {
        self.set_features(self.features.config(flag, on));
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn sink_attached(&self) -> bool {
        self.sink.is_some()
    }

    /// Buffered bytes (valid UTF-8 by construction)
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub(crate) fn check_usable(&self) -> SerResult<()> {
        if self.poisoned {
            return Err(SerializeError::Poisoned);
        }
        Ok(())
    }

    /// Enforce the output cap for in-memory writers. Sink-backed writers
    /// are exempt: their memory is already bounded by the fixed buffer.
    #[inline]
    pub(crate) fn check_cap(&self, needed: usize) -> SerResult<()> {
        if self.sink.is_none() {
            if let Some(max) = self.max_size {
                if needed > max {
                    return Err(SerializeError::CapacityExceeded { limit: max, needed });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Raw writes
    // ------------------------------------------------------------------

    /// Append one byte, growing or flushing as needed
    #[inline]
    pub fn write_byte(&mut self, b: u8) -> SerResult<()> {
        self.check_usable()?;
        self.check_cap(self.buf.len() + 1)?;
        if self.buf.len() == self.buf.capacity() {
            if self.sink.is_none() {
                self.grow(self.buf.len() + 1)?;
            } else {
                self.flush()?;
            }
        }
        self.buf.push(b);
        Ok(())
    }

    /// Append raw bytes
    ///
    /// Without a sink, grows once up front. With a sink, copies the
    /// overflowing prefix into the remaining space and flushes in a loop,
    /// supporting writes of arbitrary length through a fixed buffer.
    pub fn write_raw(&mut self, bytes: &[u8]) -> SerResult<()> {
        self.check_usable()?;
        if bytes.is_empty() {
            return Ok(());
        }
        let needed = self.buf.len() + bytes.len();
        self.check_cap(needed)?;
        if needed <= self.buf.capacity() {
            self.buf.extend_from_slice(bytes);
            return Ok(());
        }
        if self.sink.is_none() {
            self.grow(needed)?;
            self.buf.extend_from_slice(bytes);
            return Ok(());
        }
        let cap = self.buf.capacity();
        let mut off = 0;
        while self.buf.len() + (bytes.len() - off) > cap {
            let take = cap - self.buf.len();
            self.buf.extend_from_slice(&bytes[off..off + take]);
            off += take;
            self.flush()?;
        }
        self.buf.extend_from_slice(&bytes[off..]);
        Ok(())
    }

    /// Append a string's bytes verbatim (no escaping, no quotes)
    #[inline]
    pub fn push_str(&mut self, s: &str) -> SerResult<()> {
        self.write_raw(s.as_bytes())
    }

    /// Expand capacity to at least `min_capacity`, multiplying by 1.5 (+1)
    /// and clamping to `max_size`
    pub(crate) fn grow(&mut self, min_capacity: usize) -> SerResult<()> {
        if let Some(max) = self.max_size {
            if min_capacity > max {
                return Err(SerializeError::CapacityExceeded {
                    limit: max,
                    needed: min_capacity,
                });
            }
        }
        let cap = self.buf.capacity();
        let mut new_cap = (cap + (cap >> 1) + 1).max(min_capacity);
        if let Some(max) = self.max_size {
            new_cap = new_cap.min(max);
        }
        self.buf.reserve_exact(new_cap - self.buf.len());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Null representations
    // ------------------------------------------------------------------

    #[inline]
    pub fn write_null(&mut self) -> SerResult<()> {
        self.write_raw(b"null")
    }

    /// Write the representation of an absent value of the given kind,
    /// honoring the `NULL_*_AS_*` substitution features
    pub fn write_null_for(&mut self, kind: NullKind) -> SerResult<()> {
        let f = self.features;
        match kind {
            NullKind::List if f.contains(Features::NULL_LIST_AS_EMPTY) => self.write_raw(b"[]"),
            NullKind::Str if f.contains(Features::NULL_STRING_AS_EMPTY) => self.write_string(""),
            NullKind::Number if f.contains(Features::NULL_NUMBER_AS_ZERO) => self.write_byte(b'0'),
            NullKind::Bool if f.contains(Features::NULL_BOOL_AS_FALSE) => self.write_raw(b"false"),
            _ => self.write_null(),
        }
    }

    #[inline]
    pub fn write_bool(&mut self, v: bool) -> SerResult<()> {
        self.write_raw(if v { b"true" as &[u8] } else { b"false" })
    }

    // ------------------------------------------------------------------
    // Sink lifecycle
    // ------------------------------------------------------------------

    /// Push buffered bytes to the sink and reset length to zero.
    /// No-op without a sink.
    pub fn flush(&mut self) -> SerResult<()> {
        self.check_usable()?;
        if let Some(sink) = self.sink.as_mut() {
            if !self.buf.is_empty() {
                if let Err(e) = sink.write_all(&self.buf) {
                    self.poisoned = true;
                    return Err(SerializeError::SinkIo(e));
                }
                self.buf.clear();
            }
        }
        Ok(())
    }

    /// Flush remaining output and release the writer. The backing
    /// allocation is donated to the thread-local pool on drop.
    pub fn close(mut self) -> SerResult<()> {
        self.flush()?;
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                self.poisoned = true;
                return Err(SerializeError::SinkIo(e));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Output extraction (in-memory mode only)
    // ------------------------------------------------------------------

    pub fn into_string(mut self) -> SerResult<String> {
        if self.sink.is_some() {
            return Err(SerializeError::SinkAttached);
        }
        let buf = std::mem::take(&mut self.buf);
        String::from_utf8(buf).map_err(|_| SerializeError::InvalidUtf8)
    }

    /// UTF-8 bytes without an intermediate text allocation (the buffer IS
    /// the UTF-8 encoding)
    pub fn into_bytes(mut self) -> SerResult<Vec<u8>> {
        if self.sink.is_some() {
            return Err(SerializeError::SinkAttached);
        }
        Ok(std::mem::take(&mut self.buf))
    }

    /// Zero-copy shared bytes for handing to transport layers
    pub fn into_shared(self) -> SerResult<bytes::Bytes> {
        Ok(bytes::Bytes::from(self.into_bytes()?))
    }
}

impl Default for OutBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OutBuffer {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        if buf.capacity() > 0 {
            pool::release(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(out: OutBuffer) -> String {
        out.into_string().unwrap()
    }

    #[test]
    fn test_raw_writes() {
        let mut out = OutBuffer::new();
        out.write_raw(b"abc").unwrap();
        out.write_byte(b'!').unwrap();
        out.push_str("def").unwrap();
        assert_eq!(text(out), "abc!def");
    }

    #[test]
    fn test_growth_reproduces_concatenation() {
        for initial in [1usize, 2, 3, 7, 64, 1000] {
            let mut out = OutBuffer::with_capacity(Features::default(), initial);
            let mut expected = String::new();
            for i in 0..100 {
                let chunk = format!("chunk-{i};");
                out.push_str(&chunk).unwrap();
                expected.push_str(&chunk);
            }
            assert_eq!(text(out), expected);
        }
    }

    #[test]
    fn test_max_size_exceeded_is_fatal() {
        let mut out = OutBuffer::with_capacity(Features::default(), 8).with_max_size(16);
        out.write_raw(b"0123456789").unwrap();
        let err = out.write_raw(b"0123456789").unwrap_err();
        assert!(matches!(err, SerializeError::CapacityExceeded { limit: 16, .. }));
    }

    #[test]
    fn test_null_substitutions() {
        let cases = [
            (Features::default(), NullKind::List, "null"),
            (
                Features::default() | Features::NULL_LIST_AS_EMPTY,
                NullKind::List,
                "[]",
            ),
            (
                Features::default() | Features::NULL_STRING_AS_EMPTY,
                NullKind::Str,
                "\"\"",
            ),
            (
                Features::default() | Features::NULL_NUMBER_AS_ZERO,
                NullKind::Number,
                "0",
            ),
            (
                Features::default() | Features::NULL_BOOL_AS_FALSE,
                NullKind::Bool,
                "false",
            ),
            (
                Features::default() | Features::NULL_BOOL_AS_FALSE,
                NullKind::Other,
                "null",
            ),
        ];
        for (features, kind, expected) in cases {
            let mut out = OutBuffer::with_features(features);
            out.write_null_for(kind).unwrap();
            assert_eq!(text(out), expected);
        }
    }

    #[test]
    fn test_sink_flush_loop() {
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Capture(Arc<Mutex<Vec<u8>>>);
        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut out = OutBuffer::streaming(
            Box::new(Capture(Arc::clone(&captured))),
            Features::default(),
        );
        // far larger than STREAM_BUFFER_CAPACITY to force repeated flushes
        let payload = "x".repeat(STREAM_BUFFER_CAPACITY * 3 + 17);
        out.write_raw(payload.as_bytes()).unwrap();
        out.close().unwrap();
        assert_eq!(captured.lock().unwrap().as_slice(), payload.as_bytes());
    }

    #[test]
    fn test_sink_failure_poisons() {
        struct Failing;
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "down"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut out = OutBuffer::streaming(Box::new(Failing), Features::default());
        out.write_raw(b"data").unwrap();
        assert!(matches!(out.flush(), Err(SerializeError::SinkIo(_))));
        assert!(matches!(out.write_byte(b'x'), Err(SerializeError::Poisoned)));
    }

    #[test]
    fn test_into_string_rejected_with_sink() {
        let out = OutBuffer::streaming(Box::new(std::io::sink()), Features::default());
        assert!(matches!(
            out.into_string(),
            Err(SerializeError::SinkAttached)
        ));
    }
}

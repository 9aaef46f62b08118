/*!
 * Serialization Core
 * The `Serializer` capability, the per-call `JsonWriter`, and the
 * top-level convenience API
 *
 * A `JsonWriter` owns everything one call needs: the output buffer, the
 * traversal context, a handle to the registry, and the pretty-print
 * indent counter. It is exclusively owned by the calling thread for the
 * duration of the call; only the registry behind it is shared.
 */

pub mod containers;
pub mod filters;
pub mod primitives;
pub mod record;

pub use containers::{ListSerializer, MapSerializer};
pub use primitives::{
    BoolSerializer, BytesSerializer, CharSerializer, CustomSerializer, DateSerializer,
    EnumSerializer, ErrorSerializer, FloatSerializer, IntSerializer, NullSerializer,
    PathSerializer, RawSerializer, StringSerializer,
};
pub use record::{FieldDescriptor, RecordSerializer, TypeConfig};

use crate::buffer::OutBuffer;
use crate::context::SerialContext;
use crate::core::errors::{SerResult, SerializeError};
use crate::core::types::Label;
use crate::features::Features;
use crate::graph::Node;
use crate::registry::SerializerRegistry;
use std::any::TypeId;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Writes one value's JSON representation
///
/// `label` is the value's position in its parent (for `$ref` paths);
/// `declared` is the statically declared type at that position, when the
/// caller knows it - a record whose runtime type matches `declared` skips
/// its `@type` tag. Features are reachable through `w.out()`.
pub trait Serializer: Send + Sync {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        label: Label<'_>,
        declared: Option<TypeId>,
    ) -> SerResult<()>;
}

pub(crate) fn unsupported(value: &dyn Node) -> SerializeError {
    SerializeError::UnsupportedType {
        type_name: value.type_name().into(),
    }
}

/// Per-call serialization state: buffer + context + registry handle
pub struct JsonWriter {
    out: OutBuffer,
    ctx: SerialContext,
    registry: Arc<SerializerRegistry>,
    indent: usize,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::with_features(Features::default())
    }

    pub fn with_features(features: Features) -> Self {
        Self::with_registry(features, Arc::clone(SerializerRegistry::global()))
    }

    pub fn with_registry(features: Features, registry: Arc<SerializerRegistry>) -> Self {
        let out = OutBuffer::with_features(features);
        let detect = out.derived().detect_cycles;
        Self {
            out,
            ctx: SerialContext::new(detect),
            registry,
            indent: 0,
        }
    }

    /// Sink-backed writer: bounded memory, unbounded output
    pub fn streaming(sink: Box<dyn Write + Send>, features: Features) -> Self {
        let out = OutBuffer::streaming(sink, features);
        let detect = out.derived().detect_cycles;
        Self {
            out,
            ctx: SerialContext::new(detect),
            registry: Arc::clone(SerializerRegistry::global()),
            indent: 0,
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.out.set_max_size(Some(max_size));
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.ctx.set_max_depth(max_depth);
        self
    }

    #[inline]
    pub fn out(&self) -> &OutBuffer {
        &self.out
    }

    #[inline]
    pub fn out_mut(&mut self) -> &mut OutBuffer {
        &mut self.out
    }

    #[inline]
    pub fn context(&self) -> &SerialContext {
        &self.ctx
    }

    #[inline]
    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    #[inline]
    pub fn features(&self) -> Features {
        self.out.features()
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Push a context frame for `node`, returning a guard that pops it on
    /// drop - on every exit path, including error returns
    pub fn enter<'w>(&'w mut self, node: &dyn Node, label: Label<'_>) -> SerResult<Scope<'w>> {
        self.ctx.push(node, label)?;
        Ok(Scope { w: self })
    }

    /// Serialize one root value into the buffer
    pub fn write_value(&mut self, value: &dyn Node) -> SerResult<()> {
        let registry = Arc::clone(&self.registry);
        let ser = registry.resolve(value, true)?;
        let mut scope = self.enter(value, Label::None)?;
        ser.write(&mut scope, value, Label::None, None)
    }

    /// Emit a `{"$ref":"<path>"}` back-reference marker
    pub fn write_reference(&mut self, path: &str) -> SerResult<()> {
        self.out.write_byte(b'{')?;
        self.out.write_field_name("$ref")?;
        self.out.write_string(path)?;
        self.out.write_byte(b'}')
    }

    // ------------------------------------------------------------------
    // Pretty printing
    // ------------------------------------------------------------------

    #[inline]
    pub fn inc_indent(&mut self) {
        self.indent += 1;
    }

    #[inline]
    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Newline plus one tab per indent level
    pub fn println(&mut self) -> SerResult<()> {
        self.out.write_byte(b'\n')?;
        for _ in 0..self.indent {
            self.out.write_byte(b'\t')?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Output extraction
    // ------------------------------------------------------------------

    pub fn into_string(self) -> SerResult<String> {
        self.out.into_string()
    }

    pub fn into_bytes(self) -> SerResult<Vec<u8>> {
        self.out.into_bytes()
    }

    pub fn into_shared(self) -> SerResult<bytes::Bytes> {
        self.out.into_shared()
    }

    pub fn flush(&mut self) -> SerResult<()> {
        self.out.flush()
    }

    pub fn close(self) -> SerResult<()> {
        self.out.close()
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Context-frame guard; dereferences to the writer and pops on drop
pub struct Scope<'w> {
    w: &'w mut JsonWriter,
}

impl Deref for Scope<'_> {
    type Target = JsonWriter;

    #[inline]
    fn deref(&self) -> &JsonWriter {
        self.w
    }
}

impl DerefMut for Scope<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut JsonWriter {
        self.w
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.w.ctx.pop();
    }
}

// ---------------------------------------------------------------------
// Convenience API
// ---------------------------------------------------------------------

/// Serialize with default features
pub fn to_string(value: &dyn Node) -> SerResult<String> {
    to_string_with(value, Features::default())
}

pub fn to_string_with(value: &dyn Node, features: Features) -> SerResult<String> {
    let mut w = JsonWriter::with_features(features);
    w.write_value(value)?;
    w.into_string()
}

/// UTF-8 bytes without an intermediate text allocation
pub fn to_vec(value: &dyn Node) -> SerResult<Vec<u8>> {
    to_vec_with(value, Features::default())
}

pub fn to_vec_with(value: &dyn Node, features: Features) -> SerResult<Vec<u8>> {
    let mut w = JsonWriter::with_features(features);
    w.write_value(value)?;
    w.into_bytes()
}

/// Zero-copy shared bytes for handing to transport layers
pub fn to_bytes(value: &dyn Node) -> SerResult<bytes::Bytes> {
    let mut w = JsonWriter::new();
    w.write_value(value)?;
    w.into_shared()
}

/// Stream directly to a sink through a fixed-size buffer
pub fn to_writer(
    sink: Box<dyn Write + Send>,
    value: &dyn Node,
    features: Features,
) -> SerResult<()> {
    let mut w = JsonWriter::streaming(sink, features);
    w.write_value(value)?;
    w.close()
}

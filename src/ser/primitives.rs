/*!
 * Built-in Serializers
 * Leaf-value serializers installed by the registry at construction
 *
 * Every serializer tolerates a `Null` view (an absent `Option` resolved
 * through a cached mapping) by writing the feature-selected null
 * representation.
 */

use super::{unsupported, JsonWriter, Serializer};
use crate::core::errors::SerResult;
use crate::core::types::Label;
use crate::features::Features;
use crate::graph::{Node, View};
use std::any::TypeId;
use std::time::UNIX_EPOCH;

pub struct BoolSerializer;

impl Serializer for BoolSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Bool(v) => w.out_mut().write_bool(v),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct IntSerializer;

impl Serializer for IntSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Int(v) => w.out_mut().write_i64(v),
            View::UInt(v) => w.out_mut().write_u64(v),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct FloatSerializer;

impl Serializer for FloatSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Float(v) => w.out_mut().write_f64(v, true),
            View::Float32(v) => w.out_mut().write_f32(v, true),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct StringSerializer;

impl Serializer for StringSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Str(s) => w.out_mut().write_string(s),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct CharSerializer;

impl Serializer for CharSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            // NUL is emitted as the empty string
            View::Char('\0') => w.out_mut().write_string(""),
            View::Char(c) => w.out_mut().write_string(c.encode_utf8(&mut [0u8; 4])),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct BytesSerializer;

impl Serializer for BytesSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Bytes(b) => w.out_mut().write_bytes_b64(b),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

/// Date-like values emit epoch milliseconds, negative before the epoch
pub struct DateSerializer;

impl Serializer for DateSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Timestamp(t) => {
                let millis = match t.duration_since(UNIX_EPOCH) {
                    Ok(elapsed) => elapsed.as_millis() as i64,
                    Err(before) => -(before.duration().as_millis() as i64),
                };
                w.out_mut().write_i64(millis)
            }
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct PathSerializer;

impl Serializer for PathSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::FsPath(p) => w.out_mut().write_string(&p.to_string_lossy()),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

/// Throwable-like values always carry their concrete type name
pub struct ErrorSerializer;

impl Serializer for ErrorSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Error(e) => {
                let type_name = value.type_name();
                let message = e.to_string();
                let cause = e.source().map(|s| s.to_string());
                let out = w.out_mut();
                out.write_byte(b'{')?;
                out.write_field_name("@type")?;
                out.write_string(type_name)?;
                out.write_byte(b',')?;
                out.write_field_name("message")?;
                out.write_string(&message)?;
                if let Some(cause) = cause {
                    out.write_byte(b',')?;
                    out.write_field_name("cause")?;
                    out.write_string(&cause)?;
                }
                out.write_byte(b'}')
            }
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct EnumSerializer;

impl Serializer for EnumSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Enum(e) => {
                let f = w.features();
                if f.contains(Features::ENUM_AS_TEXT) {
                    let text = e.text.as_deref().unwrap_or(e.variant);
                    w.out_mut().write_string(text)
                } else if f.contains(Features::ENUM_AS_NAME) {
                    w.out_mut().write_string(e.variant)
                } else {
                    w.out_mut().write_u32(e.ordinal)
                }
            }
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

/// Pre-rendered JSON emitted verbatim
pub struct RawSerializer;

impl Serializer for RawSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::RawJson(s) => w.out_mut().push_str(s),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

/// Self-serializing values write through the buffer directly
pub struct CustomSerializer;

impl Serializer for CustomSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Custom(c) => c.write_json(w.out_mut()),
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

pub struct NullSerializer;

impl Serializer for NullSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        match value.view() {
            View::Null(kind) => w.out_mut().write_null_for(kind),
            _ => Err(unsupported(value)),
        }
    }
}

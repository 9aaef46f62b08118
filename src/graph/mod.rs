/*!
 * Value Model
 * Object-graph traversal surface consumed by the registry and serializers
 *
 * A value enters serialization as `&dyn Node`: a runtime type identity
 * (`TypeId` through `Any`), a fully-qualified type name, and a structural
 * [`View`] describing what the value IS. The registry dispatches on the
 * view; serializers read data through it. Field lists come from `Node`
 * implementations - hand-written or generated by the [`json_record!`] /
 * [`json_enum!`] macros - never from runtime reflection.
 */

mod impls;
mod macros;

pub use impls::ErrorNode;

use crate::buffer::OutBuffer;
use crate::core::errors::SerResult;
use crate::core::types::NullKind;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::path::Path;
use std::time::SystemTime;

/// A serializable graph node
///
/// Smart pointers (`Arc`, `Rc`, `Box`) delegate to their pointee, so every
/// clone of one shared allocation presents the same identity to the cycle
/// detector and the same `TypeId` to the registry.
pub trait Node: Any {
    /// Fully-qualified type name; hashed for the registry denylist and
    /// used in error payloads
    fn type_name(&self) -> &'static str;

    /// The value as `Any`, anchored at the node's data
    fn as_any(&self) -> &dyn Any;

    /// Structural view used for capability dispatch
    fn view(&self) -> View<'_>;
}

/// Declared null kind of a type, used when an `Option` holding it is
/// `None` so the null-substitution features can pick `[]`, `""`, `0`, or
/// `false`
pub trait NullHint {
    const KIND: NullKind = NullKind::Other;
}

/// Structural view of one node, in registry dispatch precedence order
pub enum View<'a> {
    Map(&'a dyn MapLike),
    List(&'a dyn ListLike),
    /// Date-like value, emitted as epoch milliseconds
    Timestamp(SystemTime),
    /// Pre-rendered JSON emitted verbatim; validity is the producer's
    /// responsibility
    RawJson(&'a str),
    /// Value that writes its own JSON through the buffer
    Custom(&'a dyn SelfSerialize),
    Enum(EnumView<'a>),
    Bytes(&'a [u8]),
    /// Error values always carry their concrete type name
    Error(&'a (dyn std::error::Error + 'static)),
    FsPath(&'a Path),
    Char(char),
    Str(&'a str),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Null(NullKind),
    /// Named-field fallback, gated by the registry denylist
    Record(&'a dyn RecordLike),
}

/// Index-addressable sequence of nodes
pub trait ListLike {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<&dyn Node>;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key of one map entry
#[derive(Debug, Clone, Copy)]
pub enum MapKey<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
}

impl MapKey<'_> {
    /// Key text for emission and sorting; integer keys format through a
    /// stack buffer
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            MapKey::Str(s) => Cow::Borrowed(s),
            MapKey::Int(v) => Cow::Owned(itoa::Buffer::new().format(*v).to_string()),
            MapKey::UInt(v) => Cow::Owned(itoa::Buffer::new().format(*v).to_string()),
        }
    }
}

/// Boxed entry iterator; one allocation per map traversal
pub type MapEntries<'a> = Box<dyn Iterator<Item = (MapKey<'a>, &'a dyn Node)> + 'a>;

/// Keyed collection of nodes
pub trait MapLike {
    fn len(&self) -> usize;
    fn entries(&self) -> MapEntries<'_>;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named-field view used by the fallback record serializer
pub trait RecordLike {
    /// Concrete type name recorded in `@type` tags
    fn record_name(&self) -> &'static str;
    fn fields(&self) -> Vec<RecordField<'_>>;
}

/// One named field of a record
pub struct RecordField<'a> {
    pub name: &'static str,
    pub value: &'a dyn Node,
}

/// Enum variant view
pub struct EnumView<'a> {
    pub variant: &'static str,
    pub ordinal: u32,
    /// Display text for ENUM_AS_TEXT; falls back to the variant name
    pub text: Option<Cow<'a, str>>,
}

/// Value that renders its own JSON representation
pub trait SelfSerialize {
    fn write_json(&self, out: &mut OutBuffer) -> SerResult<()>;
}

/// Pre-rendered JSON fragment node
pub struct RawJson(pub String);

/// Keys accepted by the std map implementations
pub trait MapKeyRef: 'static {
    fn map_key(&self) -> MapKey<'_>;
}

/// Identity of a node's data, compared together with its `TypeId`.
///
/// Two live values share an address only when one is a leading by-value
/// field of the other, and such a pair can never share a type - so the
/// (address, TypeId) pair is reference equality for cycle purposes.
#[inline]
pub fn node_ident(node: &dyn Node) -> usize {
    node.as_any() as *const dyn Any as *const u8 as usize
}

/// Runtime type of the node's data (pointee type for smart pointers)
#[inline]
pub fn node_type_id(node: &dyn Node) -> TypeId {
    node.as_any().type_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::sync::Arc;

    #[test]
    fn test_shared_clones_share_identity() {
        let a = Arc::new(String::from("x"));
        let b = Arc::clone(&a);
        assert_eq!(node_ident(&a), node_ident(&b));
        assert_eq!(node_type_id(&a), TypeId::of::<String>());

        let r = Rc::new(42i64);
        let s = Rc::clone(&r);
        assert_eq!(node_ident(&r), node_ident(&s));
    }

    #[test]
    fn test_distinct_values_distinct_identity() {
        let a = String::from("x");
        let b = String::from("x");
        assert_ne!(node_ident(&a), node_ident(&b));
    }

    #[test]
    fn test_map_key_text() {
        assert_eq!(MapKey::Str("k").as_text(), "k");
        assert_eq!(MapKey::Int(-7).as_text(), "-7");
        assert_eq!(MapKey::UInt(7).as_text(), "7");
    }
}

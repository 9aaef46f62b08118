/*!
 * Node Implementations
 * Value-model coverage for std types
 */

use super::{
    ListLike, MapEntries, MapKey, MapKeyRef, MapLike, Node, NullHint, RawJson, View,
};
use crate::core::types::NullKind;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

macro_rules! signed_int_node {
    ($($ty:ty),+ $(,)?) => {$(
        impl Node for $ty {
            fn type_name(&self) -> &'static str {
                std::any::type_name::<$ty>()
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn view(&self) -> View<'_> {
                View::Int(*self as i64)
            }
        }
        impl NullHint for $ty {
            const KIND: NullKind = NullKind::Number;
        }
    )+};
}

macro_rules! unsigned_int_node {
    ($($ty:ty),+ $(,)?) => {$(
        impl Node for $ty {
            fn type_name(&self) -> &'static str {
                std::any::type_name::<$ty>()
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn view(&self) -> View<'_> {
                View::UInt(*self as u64)
            }
        }
        impl NullHint for $ty {
            const KIND: NullKind = NullKind::Number;
        }
    )+};
}

signed_int_node!(i8, i16, i32, i64, isize);
unsigned_int_node!(u8, u16, u32, u64, usize);

impl Node for bool {
    fn type_name(&self) -> &'static str {
        "bool"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Bool(*self)
    }
}
impl NullHint for bool {
    const KIND: NullKind = NullKind::Bool;
}

impl Node for f64 {
    fn type_name(&self) -> &'static str {
        "f64"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Float(*self)
    }
}
impl NullHint for f64 {
    const KIND: NullKind = NullKind::Number;
}

impl Node for f32 {
    fn type_name(&self) -> &'static str {
        "f32"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Float32(*self)
    }
}
impl NullHint for f32 {
    const KIND: NullKind = NullKind::Number;
}

impl Node for char {
    fn type_name(&self) -> &'static str {
        "char"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Char(*self)
    }
}
impl NullHint for char {
    const KIND: NullKind = NullKind::Str;
}

impl Node for String {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<String>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Str(self)
    }
}
impl NullHint for String {
    const KIND: NullKind = NullKind::Str;
}

impl Node for &'static str {
    fn type_name(&self) -> &'static str {
        "&str"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Str(self)
    }
}
impl NullHint for &'static str {
    const KIND: NullKind = NullKind::Str;
}

impl Node for bytes::Bytes {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<bytes::Bytes>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Bytes(self)
    }
}
impl NullHint for bytes::Bytes {
    const KIND: NullKind = NullKind::Str;
}

impl Node for SystemTime {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<SystemTime>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Timestamp(*self)
    }
}
impl NullHint for SystemTime {}

impl Node for PathBuf {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<PathBuf>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::FsPath(self.as_path())
    }
}
impl NullHint for PathBuf {
    const KIND: NullKind = NullKind::Str;
}

impl Node for RawJson {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<RawJson>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::RawJson(&self.0)
    }
}
impl NullHint for RawJson {}

/// Wrapper presenting any error value as a throwable-like node
pub struct ErrorNode<E: std::error::Error + 'static>(pub E);

impl<E: std::error::Error + 'static> Node for ErrorNode<E> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<E>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Error(&self.0)
    }
}
impl<E: std::error::Error + 'static> NullHint for ErrorNode<E> {}

// ---------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------

impl<T: Node> ListLike for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }
    fn get(&self, index: usize) -> Option<&dyn Node> {
        self.as_slice().get(index).map(|v| v as &dyn Node)
    }
}

impl<T: Node> Node for Vec<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Vec<T>>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::List(self)
    }
}
impl<T> NullHint for Vec<T> {
    const KIND: NullKind = NullKind::List;
}

impl<T: Node, const N: usize> ListLike for [T; N] {
    fn len(&self) -> usize {
        N
    }
    fn get(&self, index: usize) -> Option<&dyn Node> {
        self.as_slice().get(index).map(|v| v as &dyn Node)
    }
}

impl<T: Node, const N: usize> Node for [T; N] {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<[T; N]>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::List(self)
    }
}
impl<T, const N: usize> NullHint for [T; N] {
    const KIND: NullKind = NullKind::List;
}

// ---------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------

impl MapKeyRef for String {
    fn map_key(&self) -> MapKey<'_> {
        MapKey::Str(self)
    }
}
impl MapKeyRef for &'static str {
    fn map_key(&self) -> MapKey<'_> {
        MapKey::Str(self)
    }
}

macro_rules! int_map_key {
    ($($ty:ty => $variant:ident),+ $(,)?) => {$(
        impl MapKeyRef for $ty {
            fn map_key(&self) -> MapKey<'_> {
                MapKey::$variant(*self as _)
            }
        }
    )+};
}
int_map_key!(i32 => Int, i64 => Int, u32 => UInt, u64 => UInt, usize => UInt);

impl<K: MapKeyRef, V: Node, S: BuildHasher + 'static> MapLike for HashMap<K, V, S> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }
    fn entries(&self) -> MapEntries<'_> {
        Box::new(self.iter().map(|(k, v)| (k.map_key(), v as &dyn Node)))
    }
}

impl<K: MapKeyRef, V: Node, S: BuildHasher + 'static> Node for HashMap<K, V, S> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<HashMap<K, V, S>>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Map(self)
    }
}
impl<K, V, S> NullHint for HashMap<K, V, S> {}

impl<K: MapKeyRef + Ord, V: Node> MapLike for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
    fn entries(&self) -> MapEntries<'_> {
        Box::new(self.iter().map(|(k, v)| (k.map_key(), v as &dyn Node)))
    }
}

impl<K: MapKeyRef + Ord, V: Node> Node for BTreeMap<K, V> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<BTreeMap<K, V>>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Map(self)
    }
}
impl<K, V> NullHint for BTreeMap<K, V> {}

// ---------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------

/// `Option` delegates identity and type to its payload when present, so a
/// populated option is indistinguishable from the bare value; `None`
/// surfaces the payload's declared null kind.
impl<T: Node + NullHint> Node for Option<T> {
    fn type_name(&self) -> &'static str {
        match self {
            Some(v) => v.type_name(),
            None => std::any::type_name::<Option<T>>(),
        }
    }
    fn as_any(&self) -> &dyn Any {
        match self {
            Some(v) => v.as_any(),
            None => self,
        }
    }
    fn view(&self) -> View<'_> {
        match self {
            Some(v) => v.view(),
            None => View::Null(T::KIND),
        }
    }
}
impl<T: NullHint> NullHint for Option<T> {
    const KIND: NullKind = T::KIND;
}

/// Lazily-settable cell; the one safe std building block for cyclic
/// graphs (`Arc<T>` holding a `OnceLock<Arc<T>>` back edge)
impl<T: Node + NullHint> Node for OnceLock<T> {
    fn type_name(&self) -> &'static str {
        match self.get() {
            Some(v) => v.type_name(),
            None => std::any::type_name::<OnceLock<T>>(),
        }
    }
    fn as_any(&self) -> &dyn Any {
        match self.get() {
            Some(v) => v.as_any(),
            None => self,
        }
    }
    fn view(&self) -> View<'_> {
        match self.get() {
            Some(v) => v.view(),
            None => View::Null(T::KIND),
        }
    }
}
impl<T: NullHint> NullHint for OnceLock<T> {
    const KIND: NullKind = T::KIND;
}

macro_rules! pointer_node {
    ($($ptr:ident),+ $(,)?) => {$(
        impl<T: Node> Node for $ptr<T> {
            fn type_name(&self) -> &'static str {
                (**self).type_name()
            }
            fn as_any(&self) -> &dyn Any {
                (**self).as_any()
            }
            fn view(&self) -> View<'_> {
                (**self).view()
            }
        }
        impl<T: NullHint> NullHint for $ptr<T> {
            const KIND: NullKind = T::KIND;
        }
    )+};
}
pointer_node!(Box, Arc, Rc);

impl Node for Box<dyn Node> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
    fn view(&self) -> View<'_> {
        (**self).view()
    }
}
impl NullHint for Box<dyn Node> {}

impl Node for Arc<dyn Node> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
    fn view(&self) -> View<'_> {
        (**self).view()
    }
}
impl NullHint for Arc<dyn Node> {}

/*!
 * Container Serializers
 * List/array and map traversal driving registry + context + buffer
 */

use super::{unsupported, JsonWriter, Serializer};
use crate::core::errors::SerResult;
use crate::core::types::Label;
use crate::features::Features;
use crate::graph::{ListLike, MapLike, Node, View};
use std::any::TypeId;
use std::sync::Arc;

/// Whether the direct numeric fast path should append an `L` suffix:
/// only 64-bit element types carry one under WRITE_CLASS_NAME
#[inline]
fn is_wide_int(item: &dyn Node) -> bool {
    let tid = crate::graph::node_type_id(item);
    tid == TypeId::of::<i64>() || tid == TypeId::of::<u64>()
}

fn write_item(w: &mut JsonWriter, item: &dyn Node, index: usize) -> SerResult<()> {
    if let Some(path) = w.context().reference_path(item) {
        return w.write_reference(&path);
    }
    let registry = Arc::clone(w.registry());
    let ser = registry.resolve(item, true)?;
    let mut scope = w.enter(item, Label::Index(index))?;
    ser.write(&mut scope, item, Label::Index(index), None)
}

pub struct ListSerializer;

impl ListSerializer {
    /// Compact form: elements whose runtime type is exactly an integer
    /// bypass registry dispatch entirely
    fn write_compact(&self, w: &mut JsonWriter, list: &dyn ListLike) -> SerResult<()> {
        let write_class_name = w.out().derived().write_class_name;
        w.out_mut().write_byte(b'[')?;
        for i in 0..list.len() {
            if i != 0 {
                w.out_mut().write_byte(b',')?;
            }
            let Some(item) = list.get(i) else {
                w.out_mut().write_null()?;
                continue;
            };
            match item.view() {
                View::Null(_) => w.out_mut().write_null()?,
                View::Int(v) => {
                    w.out_mut().write_i64(v)?;
                    if write_class_name && is_wide_int(item) {
                        w.out_mut().write_byte(b'L')?;
                    }
                }
                View::UInt(v) => {
                    w.out_mut().write_u64(v)?;
                    if write_class_name && is_wide_int(item) {
                        w.out_mut().write_byte(b'L')?;
                    }
                }
                _ => write_item(w, item, i)?,
            }
        }
        w.out_mut().write_byte(b']')
    }

    /// Pretty form: one element per line, indent bumped around the loop
    fn write_pretty(&self, w: &mut JsonWriter, list: &dyn ListLike) -> SerResult<()> {
        w.out_mut().write_byte(b'[')?;
        w.inc_indent();
        for i in 0..list.len() {
            if i != 0 {
                w.out_mut().write_byte(b',')?;
            }
            w.println()?;
            let Some(item) = list.get(i) else {
                w.out_mut().write_null()?;
                continue;
            };
            match item.view() {
                View::Null(_) => w.out_mut().write_null()?,
                _ => write_item(w, item, i)?,
            }
        }
        w.dec_indent();
        w.println()?;
        w.out_mut().write_byte(b']')
    }
}

impl Serializer for ListSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        let list = match value.view() {
            View::List(l) => l,
            View::Null(kind) => return w.out_mut().write_null_for(kind),
            _ => return Err(unsupported(value)),
        };
        if list.is_empty() {
            return w.out_mut().write_raw(b"[]");
        }
        if w.out().derived().pretty {
            self.write_pretty(w, list)
        } else {
            self.write_compact(w, list)
        }
    }
}

pub struct MapSerializer;

impl MapSerializer {
    fn write_entry(
        &self,
        w: &mut JsonWriter,
        key: &str,
        item: &dyn Node,
        first: &mut bool,
        pretty: bool,
    ) -> SerResult<()> {
        if !*first {
            w.out_mut().write_byte(b',')?;
        }
        if pretty {
            w.println()?;
        }
        *first = false;
        w.out_mut().write_field_name(key)?;

        if let View::Null(kind) = item.view() {
            return w.out_mut().write_null_for(kind);
        }
        if let Some(path) = w.context().reference_path(item) {
            return w.write_reference(&path);
        }
        let registry = Arc::clone(w.registry());
        let ser = registry.resolve(item, true)?;
        let mut scope = w.enter(item, Label::Field(key))?;
        ser.write(&mut scope, item, Label::Field(key), None)
    }
}

impl Serializer for MapSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        _declared: Option<TypeId>,
    ) -> SerResult<()> {
        let map = match value.view() {
            View::Map(m) => m,
            View::Null(kind) => return w.out_mut().write_null_for(kind),
            _ => return Err(unsupported(value)),
        };
        if map.is_empty() {
            return w.out_mut().write_raw(b"{}");
        }

        let d = *w.out().derived();
        let write_nulls = w.features().contains(Features::WRITE_NULL_PROPERTIES);

        w.out_mut().write_byte(b'{')?;
        if d.pretty {
            w.inc_indent();
        }
        let mut first = true;

        if d.sort_fields {
            let mut entries: Vec<(String, &dyn Node)> = map
                .entries()
                .map(|(k, v)| (k.as_text().into_owned(), v))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, item) in entries {
                if matches!(item.view(), View::Null(_)) && !write_nulls {
                    continue;
                }
                self.write_entry(w, &key, item, &mut first, d.pretty)?;
            }
        } else {
            for (key, item) in map.entries() {
                if matches!(item.view(), View::Null(_)) && !write_nulls {
                    continue;
                }
                let key = key.as_text();
                self.write_entry(w, &key, item, &mut first, d.pretty)?;
            }
        }

        if d.pretty {
            w.dec_indent();
            w.println()?;
        }
        w.out_mut().write_byte(b'}')
    }
}

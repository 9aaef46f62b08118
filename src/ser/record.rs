/*!
 * Record Serialization
 * Field-by-field fallback serializer with descriptors and filter hooks
 *
 * Field lists come from the value's [`RecordLike`] view. Per-field
 * descriptors - explicit, data-only records supplied at registration
 * time - control renaming, ordering, skipping, null emission, and custom
 * codecs, and are consumed uniformly whether the `Node` implementation is
 * hand-written or macro-generated.
 */

use super::filters::FilterChain;
use super::{unsupported, JsonWriter, Serializer};
use crate::core::errors::SerResult;
use crate::core::types::{InlineString, Label, NullKind};
use crate::features::Features;
use crate::graph::{node_type_id, Node, RecordLike, View};
use std::any::TypeId;
use std::borrow::Cow;
use std::sync::Arc;

/// Declarative per-field configuration
#[derive(Clone, Default)]
pub struct FieldDescriptor {
    /// Source field this descriptor applies to
    pub name: &'static str,
    /// Output name override
    pub rename: Option<InlineString>,
    /// Emission order; equal ordinals keep source order
    pub ordinal: i32,
    /// Never emit this field
    pub skip: bool,
    /// Emit this field even when absent, regardless of
    /// WRITE_NULL_PROPERTIES
    pub write_null: bool,
    /// Null-substitution kind override for this field
    pub null_kind: Option<NullKind>,
    /// Serializer override bypassing registry resolution
    pub codec: Option<Arc<dyn Serializer>>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rename(mut self, to: &str) -> Self {
        self.rename = Some(InlineString::from(to));
        self
    }

    #[must_use]
    pub fn ordinal(mut self, ordinal: i32) -> Self {
        self.ordinal = ordinal;
        self
    }

    #[must_use]
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    #[must_use]
    pub fn write_null(mut self) -> Self {
        self.write_null = true;
        self
    }

    #[must_use]
    pub fn null_kind(mut self, kind: NullKind) -> Self {
        self.null_kind = Some(kind);
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn Serializer>) -> Self {
        self.codec = Some(codec);
        self
    }
}

/// Per-type overrides consumed at record-serializer synthesis
#[derive(Clone)]
pub struct TypeConfig {
    /// Features forced on while serializing values of this type
    pub features_on: Features,
    /// Features forced off while serializing values of this type
    pub features_off: Features,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeConfig {
    pub fn new() -> Self {
        Self {
            features_on: Features::empty(),
            features_off: Features::empty(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn enable(mut self, features: Features) -> Self {
        self.features_on |= features;
        self
    }

    #[must_use]
    pub fn disable(mut self, features: Features) -> Self {
        self.features_off |= features;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic field-by-field serializer
pub struct RecordSerializer {
    config: Option<Arc<TypeConfig>>,
}

impl RecordSerializer {
    /// Plain serializer with no per-type configuration
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Synthesis entry point: validates the configuration against the
    /// instance's field list. An inconsistent configuration is logged and
    /// downgraded to the plain generic serializer rather than failing the
    /// call.
    pub(crate) fn for_record(rec: &dyn RecordLike, config: Option<Arc<TypeConfig>>) -> Self {
        if let Some(cfg) = &config {
            let fields = rec.fields();
            for fd in &cfg.fields {
                if !fields.iter().any(|f| f.name == fd.name) {
                    log::warn!(
                        "descriptor for unknown field {} on {}; using generic record serializer",
                        fd.name,
                        rec.record_name()
                    );
                    return Self { config: None };
                }
            }
        }
        Self { config }
    }

    fn descriptor_for(&self, name: &str) -> Option<&FieldDescriptor> {
        self.config
            .as_ref()
            .and_then(|c| c.fields.iter().find(|fd| fd.name == name))
    }

    #[allow(clippy::too_many_lines)]
    fn write_body(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        rec: &dyn RecordLike,
        declared: Option<TypeId>,
    ) -> SerResult<()> {
        let d = *w.out().derived();
        let f = w.out().features();
        let write_nulls = f.contains(Features::WRITE_NULL_PROPERTIES);
        let skip_defaults = f.contains(Features::SKIP_DEFAULT_VALUES);
        let tid = node_type_id(value);
        let chain: Option<FilterChain> = w.registry().filters_for(tid);

        struct Emit<'a> {
            name: Cow<'a, str>,
            value: &'a dyn Node,
            ordinal: i32,
            write_null: bool,
            null_kind: Option<NullKind>,
            codec: Option<Arc<dyn Serializer>>,
        }

        let mut emits: Vec<Emit<'_>> = Vec::new();
        for field in rec.fields() {
            let fd = self.descriptor_for(field.name);
            if fd.is_some_and(|fd| fd.skip) {
                continue;
            }
            emits.push(Emit {
                name: match fd.and_then(|fd| fd.rename.as_ref()) {
                    Some(renamed) => Cow::Owned(renamed.to_string()),
                    None => Cow::Borrowed(field.name),
                },
                value: field.value,
                ordinal: fd.map_or(0, |fd| fd.ordinal),
                write_null: fd.is_some_and(|fd| fd.write_null),
                null_kind: fd.and_then(|fd| fd.null_kind),
                codec: fd.and_then(|fd| fd.codec.clone()),
            });
        }
        if d.sort_fields {
            emits.sort_by(|a, b| a.name.cmp(&b.name));
        } else {
            emits.sort_by_key(|e| e.ordinal);
        }

        w.out_mut().write_byte(b'{')?;
        if d.pretty {
            w.inc_indent();
        }
        let mut first = true;

        // concrete type tag for polymorphic positions
        if d.write_class_name && declared != Some(tid) {
            if d.pretty {
                w.println()?;
            }
            w.out_mut().write_field_name("@type")?;
            w.out_mut().write_string(value.type_name())?;
            first = false;
        }

        for emit in &emits {
            if let Some(chain) = &chain {
                if !chain.pre.iter().all(|pf| pf.accept(value, &emit.name)) {
                    continue;
                }
            }

            // value filters may substitute; later filters see earlier output
            let mut boxed: Option<Box<dyn Node>> = None;
            if let Some(chain) = &chain {
                for vf in &chain.value {
                    let current: &dyn Node = boxed.as_deref().unwrap_or(emit.value);
                    if let Some(replacement) = vf.apply(value, &emit.name, current) {
                        boxed = Some(replacement);
                    }
                }
            }
            let item: &dyn Node = boxed.as_deref().unwrap_or(emit.value);

            let null_kind = match item.view() {
                View::Null(kind) => Some(kind),
                _ => None,
            };
            if null_kind.is_some() && !(write_nulls || emit.write_null) {
                continue;
            }
            if null_kind.is_none() && skip_defaults && is_default_value(item) {
                continue;
            }

            let mut name: Cow<'_, str> = Cow::Borrowed(emit.name.as_ref());
            if let Some(chain) = &chain {
                for nf in &chain.name {
                    if let Some(renamed) = nf.rename(value, &name, item) {
                        name = Cow::Owned(renamed);
                    }
                }
            }

            if !first {
                w.out_mut().write_byte(b',')?;
            }
            if d.pretty {
                w.println()?;
            }
            first = false;
            w.out_mut().write_field_name(&name)?;

            if let Some(kind) = null_kind {
                w.out_mut().write_null_for(emit.null_kind.unwrap_or(kind))?;
                continue;
            }

            if let Some(path) = w.context().reference_path(item) {
                w.write_reference(&path)?;
                continue;
            }

            let ser = match &emit.codec {
                Some(codec) => Arc::clone(codec),
                None => {
                    let registry = Arc::clone(w.registry());
                    registry.resolve(item, true)?
                }
            };
            let mut scope = w.enter(item, Label::Field(name.as_ref()))?;
            ser.write(&mut scope, item, Label::Field(name.as_ref()), None)?;
        }

        if d.pretty {
            w.dec_indent();
            w.println()?;
        }
        w.out_mut().write_byte(b'}')
    }
}

impl Default for RecordSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer for RecordSerializer {
    fn write(
        &self,
        w: &mut JsonWriter,
        value: &dyn Node,
        _label: Label<'_>,
        declared: Option<TypeId>,
    ) -> SerResult<()> {
        let rec = match value.view() {
            View::Record(r) => r,
            View::Null(kind) => return w.out_mut().write_null_for(kind),
            _ => return Err(unsupported(value)),
        };

        // per-type feature overrides hold for the duration of this record,
        // restored on every exit path
        let saved = w.out().features();
        let mut changed = false;
        if let Some(cfg) = &self.config {
            let effective = (saved | cfg.features_on) - cfg.features_off;
            if effective != saved {
                w.out_mut().set_features(effective);
                changed = true;
            }
        }
        let result = self.write_body(w, value, rec, declared);
        if changed {
            w.out_mut().set_features(saved);
        }
        result
    }
}

/// Primitive default check for SKIP_DEFAULT_VALUES
fn is_default_value(item: &dyn Node) -> bool {
    match item.view() {
        View::Int(0) | View::UInt(0) | View::Bool(false) | View::Char('\0') => true,
        View::Float(v) => v == 0.0,
        View::Float32(v) => v == 0.0,
        _ => false,
    }
}

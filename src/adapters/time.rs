/*!
 * time Crate Adapter
 * RFC 3339 datetimes and fractional-second durations
 */

use crate::buffer::OutBuffer;
use crate::core::errors::{SerResult, SerializeError};
use crate::core::types::{Label, NullKind};
use crate::graph::{Node, NullHint, SelfSerialize, View};
use crate::registry::SerializerRegistry;
use crate::ser::{JsonWriter, Serializer};
use std::any::{Any, TypeId};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

impl Node for OffsetDateTime {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<OffsetDateTime>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Custom(self)
    }
}
impl NullHint for OffsetDateTime {}

impl SelfSerialize for OffsetDateTime {
    fn write_json(&self, out: &mut OutBuffer) -> SerResult<()> {
        let text = self.format(&Rfc3339).map_err(|_| SerializeError::Format {
            type_name: "OffsetDateTime",
        })?;
        out.write_string(&text)
    }
}

impl Node for Duration {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Duration>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn view(&self) -> View<'_> {
        View::Float(self.as_seconds_f64())
    }
}
impl NullHint for Duration {
    const KIND: NullKind = NullKind::Number;
}

/// Dedicated serializer so datetimes resolve through an exact-type hit
/// instead of the structural chain
pub struct OffsetDateTimeSerializer;

impl Serializer for OffsetDateTimeSerializer {
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
            _ => Err(SerializeError::UnsupportedType {
                type_name: value.type_name().into(),
            }),
        }
    }
}

/// Register the adapter's serializers. Call once at startup.
pub fn register(registry: &SerializerRegistry) {
    registry.register::<OffsetDateTime>(Arc::new(OffsetDateTimeSerializer));
    log::info!("time adapter registered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::to_string;

    #[test]
    fn test_datetime_rfc3339() {
        let dt = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let json = to_string(&dt).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");
    }

    #[test]
    fn test_duration_as_seconds() {
        let d = Duration::milliseconds(1500);
        assert_eq!(to_string(&d).unwrap(), "1.5");
    }

    #[test]
    fn test_registered_serializer_resolves_exactly() {
        let registry = SerializerRegistry::new();
        register(&registry);
        let dt = OffsetDateTime::from_unix_timestamp(86_400).unwrap();
        assert!(registry.resolve(&dt, false).is_ok());
    }
}

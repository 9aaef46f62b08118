/*!
 * Registry Integration Tests
 * Resolution layering, providers, the denylist gate, and the global
 * instance
 */

use jetjson::{
    json_record, Features, JsonWriter, Label, Node, SerResult, SerializeError, Serializer,
    SerializerProvider, SerializerRegistry, TypeConfig, View,
};
use serial_test::serial;
use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn serialize_with(registry: &Arc<SerializerRegistry>, value: &dyn Node) -> SerResult<String> {
    let mut w = JsonWriter::with_registry(Features::default(), Arc::clone(registry));
    w.write_value(value)?;
    w.into_string()
}

#[test]
fn test_resolve_idempotent_output() {
    struct Item {
        id: u64,
        label: String,
    }
    json_record!(Item { id, label });

    let registry = Arc::new(SerializerRegistry::new());
    let item = Item {
        id: 4,
        label: String::from("anvil"),
    };
    let first = serialize_with(&registry, &item).unwrap();
    let second = serialize_with(&registry, &item).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "{\"id\":4,\"label\":\"anvil\"}");
}

#[test]
fn test_concurrent_resolution_identical_output() {
    struct Shape {
        edges: u32,
    }
    json_record!(Shape { edges });

    let registry = Arc::new(SerializerRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let shape = Shape { edges: 3 };
                serialize_with(&registry, &shape).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "{\"edges\":3}");
    }
}

#[test]
fn test_custom_registration_overrides_builtin_path() {
    struct Upper;
    impl Serializer for Upper {
        fn write(
            &self,
            w: &mut JsonWriter,
            value: &dyn Node,
            _label: Label<'_>,
            _declared: Option<TypeId>,
        ) -> SerResult<()> {
            match value.view() {
                View::Str(s) => w.out_mut().write_string(&s.to_uppercase()),
                _ => w.out_mut().write_null(),
            }
        }
    }

    let registry = Arc::new(SerializerRegistry::new());
    registry.register::<String>(Arc::new(Upper));
    let text = String::from("quiet");
    assert_eq!(serialize_with(&registry, &text).unwrap(), "\"QUIET\"");
}

#[test]
fn test_provider_consulted_once_per_type() {
    struct Exotic {
        n: i32,
    }
    json_record!(Exotic { n });

    struct Probe(AtomicUsize);
    impl SerializerProvider for Probe {
        fn provide(
            &self,
            _missing: TypeId,
            _type_name: &str,
        ) -> Vec<(TypeId, Arc<dyn Serializer>)> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        }
    }

    let registry = Arc::new(SerializerRegistry::new());
    let probe = Arc::new(Probe(AtomicUsize::new(0)));
    registry.add_provider(Arc::clone(&probe) as Arc<dyn SerializerProvider>);

    let value = Exotic { n: 1 };
    // first resolve scans the provider, synthesizes, and caches
    serialize_with(&registry, &value).unwrap();
    serialize_with(&registry, &value).unwrap();
    assert_eq!(probe.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_denylist_error_is_security_denied() {
    struct Credentials {
        token: String,
    }
    json_record!(Credentials { token });

    let registry = Arc::new(SerializerRegistry::new());
    registry.deny_type_name(std::any::type_name::<Credentials>());

    let creds = Credentials {
        token: String::from("s3cr3t"),
    };
    let err = serialize_with(&registry, &creds).unwrap_err();
    assert!(matches!(err, SerializeError::SecurityDenied { .. }));
}

#[test]
fn test_configure_invalidates_cached_serializer() {
    struct Msg {
        body: String,
        retries: i32,
    }
    json_record!(Msg { body, retries });

    let registry = Arc::new(SerializerRegistry::new());
    let msg = Msg {
        body: String::from("hi"),
        retries: 0,
    };
    assert_eq!(
        serialize_with(&registry, &msg).unwrap(),
        "{\"body\":\"hi\",\"retries\":0}"
    );

    registry.configure::<Msg>(
        TypeConfig::new().with_field(jetjson::FieldDescriptor::new("retries").skip()),
    );
    assert_eq!(serialize_with(&registry, &msg).unwrap(), "{\"body\":\"hi\"}");
}

#[test]
fn test_fnv_denylist_is_name_based() {
    let registry = SerializerRegistry::new();
    registry.deny_type_name("acme::Widget");
    assert!(registry.is_denied("acme::Widget"));
    assert!(!registry.is_denied("acme::Widget2"));
    assert!(!registry.is_denied("acme::widget"));
}

#[test]
#[serial]
fn test_global_registry_shared_and_resettable() {
    struct Marker;
    impl Serializer for Marker {
        fn write(
            &self,
            w: &mut JsonWriter,
            _value: &dyn Node,
            _label: Label<'_>,
            _declared: Option<TypeId>,
        ) -> SerResult<()> {
            w.out_mut().write_raw(b"\"marked\"")
        }
    }

    struct GlobalProbe {
        n: i32,
    }
    json_record!(GlobalProbe { n });

    let global = SerializerRegistry::global();
    global.register::<GlobalProbe>(Arc::new(Marker));
    assert_eq!(
        jetjson::to_string(&GlobalProbe { n: 1 }).unwrap(),
        "\"marked\""
    );

    global.clear_to_builtins();
    // back to the synthesized record path
    assert_eq!(
        jetjson::to_string(&GlobalProbe { n: 1 }).unwrap(),
        "{\"n\":1}"
    );
    // built-ins still resolve after the reset
    assert_eq!(jetjson::to_string(&5i32).unwrap(), "5");
}

#[test]
#[serial]
fn test_global_registry_is_process_wide() {
    let a = Arc::clone(SerializerRegistry::global());
    let b = Arc::clone(SerializerRegistry::global());
    assert!(Arc::ptr_eq(&a, &b));
}

/*!
 * Serializer Registry
 * Type-to-serializer resolution with layered fallback and a security gate
 *
 * The registry is the one piece of cross-call shared mutable state.
 * Lookups are lock-free (`DashMap`); caching a freshly resolved serializer
 * is a benign last-write-wins race - resolution is deterministic and
 * idempotent, so two threads computing the same mapping and both storing
 * it is accepted, never guarded by a lock that would serialize unrelated
 * resolutions.
 *
 * Resolution order:
 * 1. exact `TypeId` lookup
 * 2. provider scan (merged into the table, then retried)
 * 3. structural synthesis from the value's [`View`] capability
 * 4. record fallback, gated by the FNV-1a-64 name denylist
 */

pub mod denylist;

pub use denylist::fnv1a_64;

use crate::core::errors::{SerResult, SerializeError};
use crate::graph::{node_type_id, Node, View};
use crate::ser::filters::{FilterChain, SerializeFilter};
use crate::ser::record::{RecordSerializer, TypeConfig};
use crate::ser::{
    BoolSerializer, BytesSerializer, CharSerializer, CustomSerializer, DateSerializer,
    EnumSerializer, ErrorSerializer, FloatSerializer, IntSerializer, ListSerializer,
    MapSerializer, NullSerializer, PathSerializer, RawSerializer, Serializer, StringSerializer,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

type FastMap<K, V> = DashMap<K, V, ahash::RandomState>;

/// External component contributing serializer mappings on demand
///
/// Providers are registered explicitly by the hosting application at
/// startup; the registry never scans for them. A provider is consulted at
/// most once per distinct missing type per registry (duplicate consults
/// under concurrent misses are tolerated).
pub trait SerializerProvider: Send + Sync {
    /// Mappings contributed when `missing` could not be resolved.
    /// Mappings for additional types may be returned; all are merged.
    fn provide(&self, missing: TypeId, type_name: &str) -> Vec<(TypeId, Arc<dyn Serializer>)>;
}

static GLOBAL_REGISTRY: OnceLock<Arc<SerializerRegistry>> = OnceLock::new();

/// Shared, long-lived mapping from runtime type to serializer
pub struct SerializerRegistry {
    table: FastMap<TypeId, Arc<dyn Serializer>>,
    configs: FastMap<TypeId, Arc<TypeConfig>>,
    filters: FastMap<TypeId, FilterChain>,
    /// types whose provider scan already ran and found nothing new
    probed: FastMap<TypeId, ()>,
    providers: RwLock<Vec<Arc<dyn SerializerProvider>>>,
    /// sorted FNV-1a-64 hashes of denied type names
    deny_hashes: RwLock<Vec<u64>>,
}

impl SerializerRegistry {
    /// Fresh registry with built-ins installed
    pub fn new() -> Self {
        let registry = Self {
            table: FastMap::default(),
            configs: FastMap::default(),
            filters: FastMap::default(),
            probed: FastMap::default(),
            providers: RwLock::new(Vec::new()),
            deny_hashes: RwLock::new(default_deny_hashes()),
        };
        registry.install_builtins();
        log::info!(
            "serializer registry initialized: {} built-ins",
            registry.table.len()
        );
        registry
    }

    /// The distinguished process-wide instance. Built-ins are populated
    /// before first use; acquisition is explicit rather than ambient.
    pub fn global() -> &'static Arc<SerializerRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new()))
    }

    fn install_builtins(&self) {
        let ints: Arc<dyn Serializer> = Arc::new(IntSerializer);
        for tid in [
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<isize>(),
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<usize>(),
        ] {
            self.table.insert(tid, Arc::clone(&ints));
        }

        let floats: Arc<dyn Serializer> = Arc::new(FloatSerializer);
        self.table.insert(TypeId::of::<f32>(), Arc::clone(&floats));
        self.table.insert(TypeId::of::<f64>(), floats);

        let strings: Arc<dyn Serializer> = Arc::new(StringSerializer);
        self.table
            .insert(TypeId::of::<String>(), Arc::clone(&strings));
        self.table.insert(TypeId::of::<&'static str>(), strings);

        self.table
            .insert(TypeId::of::<bool>(), Arc::new(BoolSerializer));
        self.table
            .insert(TypeId::of::<char>(), Arc::new(CharSerializer));
        self.table
            .insert(TypeId::of::<bytes::Bytes>(), Arc::new(BytesSerializer));
        self.table
            .insert(TypeId::of::<SystemTime>(), Arc::new(DateSerializer));
        self.table
            .insert(TypeId::of::<PathBuf>(), Arc::new(PathSerializer));
    }

    // ------------------------------------------------------------------
    // Registration API
    // ------------------------------------------------------------------

    /// Register a serializer for `T`, replacing any cached resolution
    pub fn register<T: 'static>(&self, serializer: Arc<dyn Serializer>) {
        self.table.insert(TypeId::of::<T>(), serializer);
    }

    /// Register a serializer under an explicit type id
    pub fn register_for(&self, type_id: TypeId, serializer: Arc<dyn Serializer>) {
        self.table.insert(type_id, serializer);
    }

    /// Attach per-type feature overrides and field descriptors. Drops any
    /// cached serializer for `T` so the next resolution picks them up.
    pub fn configure<T: 'static>(&self, config: TypeConfig) {
        let tid = TypeId::of::<T>();
        self.configs.insert(tid, Arc::new(config));
        self.table.remove(&tid);
    }

    /// Attach a filter to `T`'s filter chain, applied around record field
    /// emission
    pub fn add_filter<T: 'static>(&self, filter: SerializeFilter) {
        self.filters
            .entry(TypeId::of::<T>())
            .or_default()
            .push(filter);
    }

    /// Register a provider consulted for types with no exact mapping
    pub fn add_provider(&self, provider: Arc<dyn SerializerProvider>) {
        self.providers.write().push(provider);
        // newly announced mappings may cover previously missing types
        self.probed.clear();
    }

    /// Deny fallback synthesis for a fully-qualified type name
    pub fn deny_type_name(&self, type_name: &str) {
        let hash = fnv1a_64(type_name.as_bytes());
        let mut hashes = self.deny_hashes.write();
        if let Err(at) = hashes.binary_search(&hash) {
            hashes.insert(at, hash);
        }
    }

    pub fn is_denied(&self, type_name: &str) -> bool {
        let hash = fnv1a_64(type_name.as_bytes());
        self.deny_hashes.read().binary_search(&hash).is_ok()
    }

    /// Drop every registration, configuration, filter, and provider, then
    /// re-install the built-ins. The denylist survives.
    pub fn clear_to_builtins(&self) {
        self.table.clear();
        self.configs.clear();
        self.filters.clear();
        self.probed.clear();
        self.providers.write().clear();
        self.install_builtins();
        log::info!("serializer registry reset to built-ins");
    }

    pub(crate) fn config_for(&self, type_id: TypeId) -> Option<Arc<TypeConfig>> {
        self.configs.get(&type_id).map(|c| Arc::clone(c.value()))
    }

    pub(crate) fn filters_for(&self, type_id: TypeId) -> Option<FilterChain> {
        self.filters.get(&type_id).map(|c| c.value().clone())
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve a serializer for `value`'s runtime type.
    ///
    /// With `create = false` only the lookup layers run; a miss reports
    /// `UnsupportedType` without synthesizing or caching anything.
    pub fn resolve(&self, value: &dyn Node, create: bool) -> SerResult<Arc<dyn Serializer>> {
        let tid = node_type_id(value);
        if let Some(existing) = self.table.get(&tid) {
            return Ok(Arc::clone(existing.value()));
        }

        if !self.probed.contains_key(&tid) {
            let mut merged = false;
            {
                let providers = self.providers.read();
                for provider in providers.iter() {
                    for (ptid, ser) in provider.provide(tid, value.type_name()) {
                        self.table.insert(ptid, ser);
                        merged = true;
                    }
                }
            }
            self.probed.insert(tid, ());
            if merged {
                if let Some(found) = self.table.get(&tid) {
                    return Ok(Arc::clone(found.value()));
                }
            }
        }

        if !create {
            return Err(SerializeError::UnsupportedType {
                type_name: value.type_name().into(),
            });
        }

        let ser = self.synthesize(value)?;
        self.table.insert(tid, Arc::clone(&ser));
        Ok(ser)
    }

    /// Structural dispatch on the value's capability view, in precedence
    /// order; the record fallback sits behind the denylist gate
    fn synthesize(&self, value: &dyn Node) -> SerResult<Arc<dyn Serializer>> {
        let ser: Arc<dyn Serializer> = match value.view() {
            View::Map(_) => Arc::new(MapSerializer),
            View::List(_) => Arc::new(ListSerializer),
            View::Timestamp(_) => Arc::new(DateSerializer),
            View::RawJson(_) => Arc::new(RawSerializer),
            View::Custom(_) => Arc::new(CustomSerializer),
            View::Enum(_) => Arc::new(EnumSerializer),
            View::Bytes(_) => Arc::new(BytesSerializer),
            View::Error(_) => Arc::new(ErrorSerializer),
            View::FsPath(_) => Arc::new(PathSerializer),
            View::Char(_) => Arc::new(CharSerializer),
            View::Str(_) => Arc::new(StringSerializer),
            View::Bool(_) => Arc::new(BoolSerializer),
            View::Int(_) | View::UInt(_) => Arc::new(IntSerializer),
            View::Float(_) | View::Float32(_) => Arc::new(FloatSerializer),
            View::Null(_) => Arc::new(NullSerializer),
            View::Record(rec) => {
                let type_name = value.type_name();
                if self.is_denied(type_name) {
                    log::warn!("refused serializer synthesis for denied type {type_name}");
                    return Err(SerializeError::SecurityDenied {
                        type_name: type_name.into(),
                    });
                }
                log::debug!("synthesizing record serializer for {type_name}");
                Arc::new(RecordSerializer::for_record(
                    rec,
                    self.config_for(node_type_id(value)),
                ))
            }
        };
        Ok(ser)
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_deny_hashes() -> Vec<u64> {
    let mut hashes = denylist::DEFAULT_DENY_HASHES.to_vec();
    hashes.sort_unstable();
    hashes
}

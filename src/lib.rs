/*!
 * jetjson
 * Direct-to-text JSON serialization for object graphs
 *
 * Converts in-memory object graphs into JSON text - no intermediate value
 * tree - under a bitmask of formatting and compatibility features, with
 * identity-based cycle detection and a process-wide type-to-serializer
 * registry.
 *
 * # Example
 *
 * ```
 * use jetjson::{json_record, to_string, to_string_with, Features};
 *
 * struct Server {
 *     host: String,
 *     port: u16,
 *     tags: Vec<String>,
 * }
 * json_record!(Server { host, port, tags });
 *
 * let server = Server {
 *     host: "db-1".to_string(),
 *     port: 5432,
 *     tags: vec!["primary".to_string()],
 * };
 * assert_eq!(
 *     to_string(&server).unwrap(),
 *     r#"{"host":"db-1","port":5432,"tags":["primary"]}"#
 * );
 *
 * let sorted = Features::default() | Features::SORT_FIELDS;
 * assert_eq!(
 *     to_string_with(&server, sorted).unwrap(),
 *     r#"{"host":"db-1","port":5432,"tags":["primary"]}"#
 * );
 * ```
 *
 * # Architecture
 *
 * - [`features`]: the feature bitmask and its derived hot-path state
 * - [`buffer`]: the growable output buffer - escaping, numerics, base64,
 *   streaming sinks, output encodings
 * - [`graph`]: the value model (`Node`/`View`) and the `json_record!` /
 *   `json_enum!` derivation macros
 * - [`registry`]: type-to-serializer resolution with providers,
 *   structural fallback, and the denylist gate
 * - [`context`]: the traversal stack and cycle detector
 * - [`ser`]: serializers, the per-call `JsonWriter`, and the top-level
 *   API
 * - [`adapters`]: optional ecosystem adapters (feature-gated)
 */

pub mod adapters;
pub mod buffer;
pub mod context;
pub mod core;
pub mod features;
pub mod graph;
pub mod registry;
pub mod ser;

// Re-exports
pub use buffer::{Encoding, OutBuffer};
pub use context::SerialContext;
pub use self::core::errors::{SerResult, SerializeError};
pub use self::core::pool::SharedPool;
pub use self::core::types::{Label, NullKind};
pub use features::{Derived, EscapeMode, Features};
pub use graph::{
    EnumView, ErrorNode, ListLike, MapEntries, MapKey, MapKeyRef, MapLike, Node, NullHint,
    RawJson, RecordField, RecordLike, SelfSerialize, View,
};
pub use registry::{fnv1a_64, SerializerProvider, SerializerRegistry};
pub use ser::filters::{
    FilterChain, NameFilter, PascalNameFilter, PropertyPreFilter, SerializeFilter, ValueFilter,
};
pub use ser::{
    to_bytes, to_string, to_string_with, to_vec, to_vec_with, to_writer, FieldDescriptor,
    JsonWriter, RecordSerializer, Serializer, TypeConfig,
};

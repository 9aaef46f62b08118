/*!
 * Error Types
 * Serialization error taxonomy with thiserror and miette support
 */

use super::types::InlineString;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for serialization operations
pub type SerResult<T> = Result<T, SerializeError>;

/// Serialization errors
///
/// There is no retry policy anywhere in this crate: every resolution and
/// recursion is synchronous and deterministic, so a failed call fails the
/// same way again without caller-level changes (raising the capacity cap,
/// registering a serializer, ...).
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("output exceeded configured maximum size: limit {limit} bytes, needed {needed}")]
    #[diagnostic(
        code(jetjson::capacity_exceeded),
        help("Raise the writer's max_size, or attach a streaming sink for unbounded output.")
    )]
    CapacityExceeded { limit: usize, needed: usize },

    #[error("refusing to synthesize a serializer for denied type {type_name}")]
    #[diagnostic(
        code(jetjson::security_denied),
        help("The type's name hash is on the registry denylist. Register an explicit serializer if this type is actually safe to emit.")
    )]
    SecurityDenied { type_name: InlineString },

    #[error("no serializer registered for type {type_name}")]
    #[diagnostic(
        code(jetjson::unsupported_type),
        help("Register a serializer for the type, or resolve with create enabled.")
    )]
    UnsupportedType { type_name: InlineString },

    #[error("sink write failed during flush")]
    #[diagnostic(
        code(jetjson::sink_io),
        help("Buffer state is undefined after a sink failure; the writer is poisoned and must not be reused.")
    )]
    SinkIo(#[source] std::io::Error),

    #[error("writer used after a sink failure")]
    #[diagnostic(
        code(jetjson::poisoned),
        help("Construct a fresh writer; a poisoned writer never recovers.")
    )]
    Poisoned,

    #[error("nesting depth exceeded limit of {limit}")]
    #[diagnostic(
        code(jetjson::depth_exceeded),
        help("Raise max_depth, or check the input graph for unexpected nesting.")
    )]
    DepthExceeded { limit: usize },

    #[error("operation requires an in-memory buffer, but a sink is attached")]
    #[diagnostic(
        code(jetjson::sink_attached),
        help("Textual accessors only work in-memory; a sink-backed writer is drained through flush/close.")
    )]
    SinkAttached,

    #[error("serialized output was not valid UTF-8")]
    #[diagnostic(code(jetjson::invalid_utf8))]
    InvalidUtf8,

    #[error("failed to format a {type_name} value")]
    #[diagnostic(code(jetjson::format_failed))]
    Format { type_name: &'static str },
}

/*!
 * Core Types
 * Small shared types used across the crate
 */

/// Inline-optimized string for short payloads (field labels, type names in
/// errors). Strings up to 23 bytes live on the stack.
pub type InlineString = smartstring::alias::String;

/// Position of a value inside its parent during traversal.
///
/// Used for `$ref` path construction and passed to every
/// [`Serializer::write`](crate::ser::Serializer::write) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label<'a> {
    /// Root value of a serialization call
    None,
    /// Named property of a record or map
    Field(&'a str),
    /// Element index of a list or array
    Index(usize),
}

/// Declared kind of an absent value.
///
/// Selects the substitution text when one of the `NULL_*_AS_*` features is
/// enabled: a null list can become `[]`, a null string `""`, and so on.
/// `Option<T>` nodes derive the kind from `T`; field descriptors can
/// override it per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullKind {
    #[default]
    Other,
    List,
    Str,
    Number,
    Bool,
}

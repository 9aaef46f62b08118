/*!
 * Declarative Node Derivation
 * Compile-time field/variant registration for user types
 */

/// Implement [`Node`](crate::graph::Node) for a struct by naming its
/// serializable fields.
///
/// This is the compile-time replacement for reflective field discovery:
/// the field list is fixed when the macro expands, and the record
/// serializer consumes it uniformly with hand-written implementations.
///
/// ```
/// use jetjson::json_record;
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
/// json_record!(Person { name, age });
/// ```
#[macro_export]
macro_rules! json_record {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::graph::RecordLike for $ty {
            fn record_name(&self) -> &'static str {
                stringify!($ty)
            }
            fn fields(&self) -> ::std::vec::Vec<$crate::graph::RecordField<'_>> {
                ::std::vec![
                    $($crate::graph::RecordField {
                        name: stringify!($field),
                        value: &self.$field,
                    }),+
                ]
            }
        }

        impl $crate::graph::Node for $ty {
            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn view(&self) -> $crate::graph::View<'_> {
                $crate::graph::View::Record(self)
            }
        }

        impl $crate::graph::NullHint for $ty {}
    };
}

/// Implement [`Node`](crate::graph::Node) for a unit-variant enum.
///
/// The enum must be `Clone + Copy` (unit variants are cast to their
/// ordinal). The variant name doubles as the display text unless the type
/// implements `Node` by hand.
///
/// ```
/// use jetjson::json_enum;
///
/// #[derive(Clone, Copy)]
/// enum Color {
///     Red,
///     Green,
///     Blue,
/// }
/// json_enum!(Color { Red, Green, Blue });
/// ```
#[macro_export]
macro_rules! json_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::graph::Node for $ty {
            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn view(&self) -> $crate::graph::View<'_> {
                let variant = match self {
                    $($ty::$variant => stringify!($variant)),+
                };
                $crate::graph::View::Enum($crate::graph::EnumView {
                    variant,
                    ordinal: *self as u32,
                    text: ::std::option::Option::None,
                })
            }
        }

        impl $crate::graph::NullHint for $ty {}
    };
}

#[cfg(test)]
mod tests {
    use crate::graph::{Node, View};

    struct Point {
        x: i32,
        y: i32,
    }
    json_record!(Point { x, y });

    #[derive(Clone, Copy)]
    enum Direction {
        North,
        East,
    }
    json_enum!(Direction { North, East });

    #[test]
    fn test_record_macro_fields() {
        let p = Point { x: 1, y: -2 };
        match p.view() {
            View::Record(rec) => {
                assert_eq!(rec.record_name(), "Point");
                let fields = rec.fields();
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name, "x");
                assert!(matches!(fields[1].value.view(), View::Int(-2)));
            }
            _ => panic!("expected record view"),
        }
    }

    #[test]
    fn test_enum_macro_variants() {
        match Direction::East.view() {
            View::Enum(e) => {
                assert_eq!(e.variant, "East");
                assert_eq!(e.ordinal, 1);
                assert!(e.text.is_none());
            }
            _ => panic!("expected enum view"),
        }
        match Direction::North.view() {
            View::Enum(e) => assert_eq!(e.ordinal, 0),
            _ => panic!("expected enum view"),
        }
    }
}

//! # Packwire Types
//!
//! The in-memory value model shared by every packwire component. A [`Node`]
//! is the dynamically-typed tree that the converter registry produces from
//! host values and that the frame writer walks when encoding.
//!
//! Arrays are never stored as a plain list of nodes. They are normalised into
//! homogeneous typed [`Slice`]s by the [`slicer`], so that runs of primitives
//! stay unboxed and can be packed on the wire.

mod node;
pub mod slicer;

pub use node::*;

/// Macro for creating an [`Object`] node.
///
/// Values are converted with `Node::from`, field order is preserved.
///
/// # Example
///
/// ```rust
/// use packwire_types::object;
///
/// let user = object! {
///     id: 1i64,
///     name: "Alice",
///     "display-name": "alice",
/// };
/// assert_eq!(user.len(), 3);
/// ```
#[macro_export]
macro_rules! object {
    // Base case: empty object
    () => {
        $crate::Object::new()
    };

    // Handle a list of field-value pairs (supports both identifiers and literals)
    ($($key:tt: $value:expr),* $(,)?) => {
        {
            let mut obj = $crate::Object::new();
            $(
                $crate::object!(@insert obj, $key: $crate::Node::from($value));
            )*
            obj
        }
    };

    // Internal helper to insert a single field - handles identifiers
    (@insert $obj:expr, $key:ident: $value:expr) => {
        $obj.insert(stringify!($key).to_string(), $value);
    };

    // Internal helper to insert a single field - handles string literals
    (@insert $obj:expr, $key:literal: $value:expr) => {
        $obj.insert($key.to_string(), $value);
    };
}

/// Macro for creating an [`Array`] node.
///
/// The values are sliced into typed runs exactly like any other sequence of
/// nodes.
///
/// # Example
///
/// ```rust
/// use packwire_types::{array, SliceKind};
///
/// let arr = array![1i64, 2i64, 3i64];
/// assert_eq!(arr.kind(), Some(SliceKind::Long));
/// ```
#[macro_export]
macro_rules! array {
    // Base case: empty array
    [] => {
        $crate::Array::empty()
    };

    // Handle a list of values
    [$($value:expr),* $(,)?] => {
        $crate::Array::from_nodes(vec![$($crate::Node::from($value)),*])
    };
}

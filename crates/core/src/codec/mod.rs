//! Built-in codecs.
//!
//! A codec is a bundle of converters which are installed together. The
//! built-in codecs connect the common Rust types to [`Node`], and connect the
//! host collection types to each other.

mod array;
mod collection;
mod object;
mod scalar;

use std::any::Any;

use packwire_types::Node;

pub use self::array::ArrayCodec;
pub use self::collection::{Collection, CollectionCodec, Deque, HostArray, Iter, List};
pub use self::object::{Map, ObjectCodec};
pub use self::scalar::ScalarCodec;
use crate::conv::{Converters, Instance, Registry};
use crate::err::Error;

/// A bundle of converters
pub trait Codec: Any + Send + Sync {
	/// Adds this codec's converters to `converters`.
	fn converters(&self, converters: &mut Converters);
}

/// Installs every built-in codec into a registry.
pub fn install_defaults(registry: &Registry) {
	registry.install(ScalarCodec);
	registry.install(ArrayCodec);
	registry.install(ObjectCodec);
	registry.install(CollectionCodec);
}

/// Converts a node into the natural host value for its kind.
///
/// Arrays become a [`List`] and objects a [`Map`], with their contents
/// converted the same way.
pub fn node_to_host(node: Node) -> Option<Instance> {
	Some(match node {
		Node::Null => return None,
		Node::Bool(v) => Instance::new(v),
		Node::Varint(v) => Instance::new(v),
		Node::Float32(v) => Instance::new(v),
		Node::Float64(v) => Instance::new(v),
		Node::String(v) => Instance::new(v),
		Node::Symbol(v) => Instance::new(v),
		Node::Array(v) => Instance::new(array::array_to_list(v)),
		Node::Object(v) => Instance::new(object::object_to_map(v)),
	})
}

/// The error for a node of the wrong kind.
fn mismatch(expected: &str, found: &Node) -> Error {
	Error::invalid_value(expected, found.kind_name())
}

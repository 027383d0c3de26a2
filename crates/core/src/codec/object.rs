use indexmap::IndexMap;
use packwire_types::{Node, Object};

use super::{Codec, mismatch, node_to_host};
use crate::conv::{Converters, Instance};

/// A host map of dynamically typed values, in insertion order.
pub type Map = IndexMap<String, Option<Instance>>;

/// Converters between maps and object nodes
#[derive(Debug)]
pub struct ObjectCodec;

impl Codec for ObjectCodec {
	fn converters(&self, c: &mut Converters) {
		c.add::<Map, Node, _>(1, |v, ctx| {
			let mut obj = Object::with_capacity(v.len());
			for (key, value) in v {
				obj.insert(key, ctx.to_node(value)?);
			}
			Ok(Node::Object(obj))
		});
		c.add::<Node, Map, _>(1, |v, _| match v {
			Node::Object(v) => Ok(object_to_map(v)),
			v => fail!(mismatch("object", &v)),
		});
	}
}

pub(super) fn object_to_map(obj: Object) -> Map {
	obj.into_iter().map(|(key, value)| (key, node_to_host(value))).collect()
}

#[cfg(test)]
mod tests {
	use packwire_types::object;

	use super::*;
	use crate::conv::Registry;

	#[test]
	fn test_map_round_trip() {
		let registry = Registry::default();
		let mut map = Map::new();
		map.insert("name".to_string(), Some(Instance::new("Alice")));
		map.insert("id".to_string(), Some(Instance::new(7i32)));
		map.insert("manager".to_string(), None);
		let node = registry.to_node(Some(Instance::new(map))).unwrap();
		assert_eq!(node, Node::Object(object! { name: "Alice", id: 7i64, manager: Node::Null }));

		let back = registry.from_node::<Map>(node).unwrap().unwrap();
		let keys: Vec<&str> = back.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["name", "id", "manager"]);
		assert_eq!(back["id"].as_ref().and_then(|v| v.downcast_ref::<i64>()), Some(&7));
		assert!(back["manager"].is_none());
	}
}

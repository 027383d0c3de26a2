use std::collections::VecDeque;

use packwire_types::Node;

use super::array::{array_to_list, list_to_node};
use super::{Codec, mismatch};
use crate::conv::{Context, Converters, Instance, TypeKey};
use crate::err::Error;

/// A host list of dynamically typed values.
pub type List = Vec<Option<Instance>>;

/// A host double-ended queue of dynamically typed values.
pub type Deque = VecDeque<Option<Instance>>;

/// A fixed-size host array of dynamically typed values.
pub type HostArray = Box<[Option<Instance>]>;

/// Any collection of dynamically typed values
///
/// Concrete collection types are declared as subtypes of `Collection`, so a
/// single extensible converter can produce any of them.
#[derive(Debug, Default)]
pub struct Collection(pub Vec<Option<Instance>>);

/// A consuming iterator over a collection.
#[derive(Debug)]
pub struct Iter(pub std::vec::IntoIter<Option<Instance>>);

/// Converters between collection types, and between collections and nodes
#[derive(Debug)]
pub struct CollectionCodec;

impl Codec for CollectionCodec {
	fn converters(&self, c: &mut Converters) {
		c.subtype::<List, Collection, _>(Collection);
		c.subtype::<Deque, Collection, _>(|v| Collection(v.into()));
		c.add::<HostArray, Collection, _>(1, |v, _| Ok(Collection(v.into_vec())));
		c.add::<Collection, HostArray, _>(1, |v, _| Ok(v.0.into_boxed_slice()));
		c.add::<Collection, Iter, _>(1, |v, _| Ok(Iter(v.0.into_iter())));
		c.add::<Iter, Collection, _>(1, |v, _| Ok(Collection(v.0.collect())));
		c.extensible::<Collection, Collection, _>(1, build);
		c.add::<Collection, Node, _>(1, |v, ctx| Ok(list_to_node(v.0, ctx)?));
		c.add::<Node, Collection, _>(1, |v, _| match v {
			Node::Array(v) => Ok(Collection(array_to_list(v))),
			v => fail!(mismatch("array", &v)),
		});
	}
}

/// Builds the requested concrete collection type, converting the elements
/// to the requested element type if there is one.
fn build(src: Collection, ctx: &Context<'_>) -> anyhow::Result<Instance> {
	let target = ctx.target();
	let items = match target.param() {
		Some(param) => src.0.into_iter().map(|v| ctx.convert(v, param)).collect::<Result<List, Error>>()?,
		None => src.0,
	};
	let raw = target.raw();
	if raw == TypeKey::of::<List>() {
		Ok(Instance::new(items))
	} else if raw == TypeKey::of::<Deque>() {
		Ok(Instance::new(Deque::from(items)))
	} else if raw == TypeKey::of::<Collection>() {
		Ok(Instance::new(Collection(items)))
	} else {
		fail!(Error::unsupported("collection", target.to_string()))
	}
}

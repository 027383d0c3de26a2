use std::any::{Any, TypeId};

use packwire_types::slicer::runs;
use packwire_types::{Array, Node, Slice, Symbol};

use super::{Codec, List, mismatch, node_to_host};
use crate::conv::{Context, Converters, Instance};
use crate::err::Error;

/// Converters between typed vectors and array nodes
///
/// A typed vector becomes a single slice without boxing its elements.
/// Converting back requires an array holding exactly that slice kind, or no
/// elements at all.
#[derive(Debug)]
pub struct ArrayCodec;

macro_rules! typed_vec {
	($c:expr, $($t:ty => $variant:ident),* $(,)?) => {
		$(
			$c.add::<Vec<$t>, Node, _>(1, |v, _| Ok(Node::Array(Array::from(Slice::$variant(v)))));
			$c.add::<Node, Vec<$t>, _>(1, |v, _| match into_slice(v)? {
				Slice::$variant(v) => Ok(v),
				s if s.is_empty() => Ok(Vec::new()),
				s => fail!(Error::invalid_value(
					concat!("array of ", stringify!($t)),
					format!("array of {:?}", s.kind()),
				)),
			});
		)*
	};
}

impl Codec for ArrayCodec {
	fn converters(&self, c: &mut Converters) {
		typed_vec!(c,
			bool => Bool,
			i8 => Byte,
			i16 => Short,
			i32 => Int,
			i64 => Long,
			f32 => Float,
			f64 => Double,
			String => String,
			Symbol => Symbol,
		);
	}
}

/// Takes the only slice out of a non-mixed array node.
fn into_slice(node: Node) -> Result<Slice, Error> {
	match node {
		Node::Array(arr) if !arr.is_mixed() => {
			Ok(arr.into_slices().into_iter().next().unwrap_or(Slice::Null(0)))
		}
		Node::Array(_) => Err(Error::invalid_value("typed array", "mixed array")),
		v => Err(mismatch("array", &v)),
	}
}

/// The runtime type of a host list element, as far as slicing cares.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum HostKind {
	Null,
	Bool,
	Byte,
	Short,
	Int,
	Long,
	Float,
	Double,
	String,
	Symbol,
	Other(TypeId),
}

fn host_kind(v: &Option<Instance>) -> HostKind {
	let Some(v) = v else {
		return HostKind::Null;
	};
	let id = v.type_key().id();
	macro_rules! kinds {
		($($t:ty => $kind:ident),*) => {
			$(if id == TypeId::of::<$t>() {
				return HostKind::$kind;
			})*
		};
	}
	kinds!(
		bool => Bool,
		i8 => Byte,
		i16 => Short,
		i32 => Int,
		i64 => Long,
		f32 => Float,
		f64 => Double,
		String => String,
		Symbol => Symbol
	);
	HostKind::Other(id)
}

/// Unboxes every element of a run which is known to hold only `T`.
fn unbox<T: Any>(run: List) -> Vec<T> {
	run.into_iter().flatten().filter_map(|v| v.downcast::<T>().ok()).collect()
}

/// Slices a host list into an array node.
///
/// Runs of primitives are unboxed directly. Any other run is converted
/// element by element through the registry and sliced again by node kind.
pub(super) fn list_to_node(list: List, ctx: &Context<'_>) -> Result<Node, Error> {
	let mut slices = Vec::new();
	for (kind, run) in runs(list, host_kind) {
		match kind {
			HostKind::Null => slices.push(Slice::Null(run.len())),
			HostKind::Bool => slices.push(Slice::Bool(unbox(run))),
			HostKind::Byte => slices.push(Slice::Byte(unbox(run))),
			HostKind::Short => slices.push(Slice::Short(unbox(run))),
			HostKind::Int => slices.push(Slice::Int(unbox(run))),
			HostKind::Long => slices.push(Slice::Long(unbox(run))),
			HostKind::Float => slices.push(Slice::Float(unbox(run))),
			HostKind::Double => slices.push(Slice::Double(unbox(run))),
			HostKind::String => slices.push(Slice::String(unbox(run))),
			HostKind::Symbol => slices.push(Slice::Symbol(unbox(run))),
			HostKind::Other(_) => {
				let nodes = run.into_iter().map(|v| ctx.to_node(v)).collect::<Result<Vec<_>, _>>()?;
				slices.extend(Array::from_nodes(nodes).into_slices());
			}
		}
	}
	Ok(Node::Array(Array::from_slices(slices)))
}

/// Flattens an array node into a host list, keeping each slice's element
/// type.
pub(super) fn array_to_list(arr: Array) -> List {
	let mut out = List::with_capacity(arr.len());
	for slice in arr.into_slices() {
		match slice {
			Slice::Null(n) => out.extend(std::iter::repeat_with(|| None).take(n)),
			Slice::Bool(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Byte(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Short(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Int(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Long(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Float(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Double(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::String(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Symbol(v) => out.extend(v.into_iter().map(|v| Some(Instance::new(v)))),
			Slice::Object(v) => out.extend(v.into_iter().map(|v| node_to_host(Node::Object(v)))),
			Slice::Array(v) => out.extend(v.into_iter().map(|v| node_to_host(Node::Array(v)))),
		}
	}
	out
}

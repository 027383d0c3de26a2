//! Grouping of heterogeneous sequences into homogeneous runs.
//!
//! The slicer walks a sequence once and starts a new run every time the
//! element kind changes. A uniform sequence therefore produces exactly one
//! run, and a sequence alternating kinds on every element produces one run
//! per element. Elements are never reordered.

use crate::{Array, Node, Slice, SliceKind};

/// Splits `items` into maximal runs of consecutive elements sharing a kind.
///
/// The kind function is called exactly once per element.
pub fn runs<T, K, F>(items: impl IntoIterator<Item = T>, mut kind_of: F) -> Vec<(K, Vec<T>)>
where
	K: PartialEq,
	F: FnMut(&T) -> K,
{
	let mut runs: Vec<(K, Vec<T>)> = Vec::new();
	for item in items {
		let kind = kind_of(&item);
		match runs.last_mut() {
			Some((last, run)) if *last == kind => run.push(item),
			_ => runs.push((kind, vec![item])),
		}
	}
	runs
}

/// Slices a sequence of nodes into an array.
pub fn slice_nodes(nodes: Vec<Node>) -> Array {
	if nodes.is_empty() {
		return Array::empty();
	}
	let runs = runs(nodes, Node::slice_kind);
	Array::from_slices(runs.into_iter().map(|(kind, run)| collect_run(kind, run)))
}

/// Collects a run of nodes which all have the given slice kind.
fn collect_run(kind: SliceKind, run: Vec<Node>) -> Slice {
	macro_rules! collect {
		($variant:ident, $pat:pat => $v:expr) => {
			Slice::$variant(
				run.into_iter()
					.filter_map(|node| match node {
						$pat => Some($v),
						_ => None,
					})
					.collect(),
			)
		};
	}
	match kind {
		SliceKind::Null => Slice::Null(run.len()),
		SliceKind::Bool => collect!(Bool, Node::Bool(v) => v),
		// Integer nodes are always 64-bit, narrower slices come from typed host data
		SliceKind::Byte | SliceKind::Short | SliceKind::Int | SliceKind::Long => {
			collect!(Long, Node::Varint(v) => v)
		}
		SliceKind::Float => collect!(Float, Node::Float32(v) => v),
		SliceKind::Double => collect!(Double, Node::Float64(v) => v),
		SliceKind::String => collect!(String, Node::String(v) => v),
		SliceKind::Symbol => collect!(Symbol, Node::Symbol(v) => v),
		SliceKind::Object => collect!(Object, Node::Object(v) => v),
		SliceKind::Array => collect!(Array, Node::Array(v) => v),
	}
}

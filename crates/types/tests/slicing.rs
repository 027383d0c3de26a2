use packwire_types::{Array, Node, Slice, SliceKind, Symbol, array, object};
use rstest::rstest;

#[rstest]
#[case::bools(vec![Node::from(true), Node::from(false)], SliceKind::Bool)]
#[case::longs(vec![Node::from(1i64), Node::from(-1i64), Node::from(0i64)], SliceKind::Long)]
#[case::floats(vec![Node::from(1.5f32), Node::from(0.0f32)], SliceKind::Float)]
#[case::doubles(vec![Node::from(1.5f64)], SliceKind::Double)]
#[case::strings(vec![Node::from("a"), Node::from("")], SliceKind::String)]
#[case::symbols(vec![Node::from(Symbol::from("RED"))], SliceKind::Symbol)]
#[case::objects(vec![Node::from(object! { id: 1i64 }), Node::from(object! {})], SliceKind::Object)]
#[case::arrays(vec![Node::from(array![1i64]), Node::from(array![])], SliceKind::Array)]
#[case::nulls(vec![Node::Null], SliceKind::Null)]
fn test_uniform_sequence_is_one_slice(#[case] nodes: Vec<Node>, #[case] kind: SliceKind) {
	let len = nodes.len();
	let arr = Array::from_nodes(nodes);
	assert!(!arr.is_mixed());
	assert_eq!(arr.kind(), Some(kind));
	assert_eq!(arr.len(), len);
}

#[test]
fn test_alternating_kinds_give_one_slice_per_element() {
	let nodes: Vec<Node> = (0..10)
		.map(|i| {
			if i % 2 == 0 {
				Node::from(i as i64)
			} else {
				Node::from(format!("{i}"))
			}
		})
		.collect();
	let arr = Array::from_nodes(nodes.clone());
	assert!(arr.is_mixed());
	assert_eq!(arr.slices().len(), 10);
	assert!(arr.slices().iter().all(|s| s.len() == 1));
	assert_eq!(arr.into_nodes(), nodes);
}

#[test]
fn test_concatenating_slices_reproduces_the_input() {
	let nodes = vec![
		Node::from(1i64),
		Node::from(2i64),
		Node::Null,
		Node::from("x"),
		Node::from("y"),
		Node::from(true),
		Node::from(object! { id: 1i64, name: "a" }),
		Node::from(1.25f64),
		Node::Null,
		Node::Null,
	];
	let arr = Array::from_nodes(nodes.clone());
	let kinds: Vec<SliceKind> = arr.slices().iter().map(Slice::kind).collect();
	assert_eq!(
		kinds,
		vec![
			SliceKind::Long,
			SliceKind::Null,
			SliceKind::String,
			SliceKind::Bool,
			SliceKind::Object,
			SliceKind::Double,
			SliceKind::Null,
		]
	);
	assert_eq!(arr.len(), nodes.len());
	assert_eq!(arr.into_nodes(), nodes);
}

#[test]
fn test_empty_sequence_is_the_empty_array() {
	let arr = Array::from_nodes(vec![]);
	assert!(arr.is_empty());
	assert_eq!(arr, Array::empty());
	assert_eq!(array![], Array::empty());
}

#[test]
fn test_mixed_arrays_never_nest() {
	let inner = array![1i64, "a"];
	assert!(inner.is_mixed());
	let outer = array![inner.clone(), inner.clone(), 5i64];
	assert!(outer.is_mixed());
	for slice in outer.slices() {
		assert_ne!(slice.len(), 0);
	}
	assert_eq!(outer.slices()[0], Slice::Array(vec![inner.clone(), inner]));
}

#[test]
fn test_typed_vectors_stay_unboxed() {
	let arr = Array::from(vec![1i32, 2, 3]);
	assert_eq!(arr.kind(), Some(SliceKind::Int));
	assert_eq!(arr.get(1), Some(Node::Varint(2)));
	let arr = Array::from(vec![1i8, -1]);
	assert_eq!(arr.slices(), &[Slice::Byte(vec![1, -1])]);
}

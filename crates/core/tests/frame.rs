//! Tests for frames written and read across a whole stream

#![allow(clippy::unwrap_used)]

use std::io::{self, Write};
use std::sync::Arc;

use packwire_core::err::Error;
use packwire_core::frame::{FrameReader, FrameWriter};
use packwire_core::types::{Array, Node, Object, Slice, Symbol, array, object};
use parking_lot::Mutex;
use rstest::rstest;

fn round_trip(node: Node) {
	let mut writer = FrameWriter::new();
	let mut reader = FrameReader::new();
	let bytes = writer.write(&node).unwrap();
	assert_eq!(reader.read(&bytes).unwrap(), node);
}

#[rstest]
#[case::null(Node::Null)]
#[case::t(Node::Bool(true))]
#[case::f(Node::Bool(false))]
#[case::zero(Node::Varint(0))]
#[case::min(Node::Varint(i64::MIN))]
#[case::max(Node::Varint(i64::MAX))]
#[case::float(Node::Float32(-1.5))]
#[case::float_zero(Node::Float32(0.0))]
#[case::negative_zero(Node::Float64(-0.0))]
#[case::double(Node::Float64(f64::MAX))]
#[case::empty_string(Node::from(""))]
#[case::unicode(Node::from("héllo wörld 😀"))]
#[case::symbol(Node::from(Symbol::from("RED")))]
#[case::empty_symbol(Node::from(Symbol::from("")))]
#[case::empty_array(Node::from(array![]))]
#[case::empty_typed_array(Node::from(Array::from(Vec::<f64>::new())))]
#[case::empty_object(Node::from(object! {}))]
#[case::bytes(Node::from(Array::from(vec![i8::MIN, 0, i8::MAX])))]
#[case::shorts(Node::from(Array::from(vec![i16::MIN, 0, i16::MAX])))]
#[case::ints(Node::from(Array::from(vec![i32::MIN, 0, i32::MAX])))]
#[case::floats(Node::from(Array::from(vec![0.0f32, 1.5, f32::INFINITY])))]
#[case::bools(Node::from(Array::from(vec![true; 17])))]
#[case::nulls(Node::from(array![Node::Null, Node::Null]))]
#[case::strings(Node::from(array!["a", "", "b", "a"]))]
#[case::symbols(Node::from(array![Symbol::from("A"), Symbol::from(""), Symbol::from("A")]))]
#[case::mixed(Node::from(array![1i64, "a", Node::Null, 2.5f64, true, Symbol::from("B")]))]
#[case::nested_arrays(Node::from(array![array![1i64, 2i64], array![], array!["x", 1i64]]))]
#[case::objects(Node::from(array![object! { id: 1i64 }, object! { id: 2i64, tag: "x" }]))]
#[case::nested(Node::from(object! {
	id: 1i64,
	name: "Alice",
	roles: array![Symbol::from("ADMIN"), Symbol::from("USER")],
	manager: object! { id: 2i64, name: "Bob", manager: Node::Null },
	scores: Array::from(vec![1.5f64, 0.0, -2.25]),
}))]
#[case::transient(Node::from(object! { "first name": "a", "9": array![object! { "x y": 1i64 }] }))]
fn test_round_trip(#[case] node: Node) {
	round_trip(node);
}

#[test]
fn test_repeated_shape_reuses_the_struct() {
	let mut writer = FrameWriter::new();
	let mut reader = FrameReader::new();
	let first = Node::from(object! { id: 1i64, name: "a" });
	let bytes = writer.write(&first).unwrap();
	assert_eq!(writer.last_diff().structs.added, 1);
	assert_eq!(reader.read(&bytes).unwrap(), first);
	let second = Node::from(object! { id: 2i64, name: "b" });
	let bytes = writer.write(&second).unwrap();
	let diff = writer.last_diff();
	assert_eq!(diff.structs.added, 0);
	assert_eq!(diff.structs.expired, 0);
	assert_eq!(diff.names.added, 0);
	assert_eq!(reader.read(&bytes).unwrap(), second);
	assert!(bytes.len() < 16);
}

#[test]
fn test_field_order_is_a_different_struct() {
	let mut writer = FrameWriter::new();
	writer.write(&Node::from(object! { id: 1i64, name: "a" })).unwrap();
	writer.write(&Node::from(object! { name: "a", id: 1i64 })).unwrap();
	let diff = writer.last_diff();
	assert_eq!(diff.structs.added, 1);
	assert_eq!(diff.structs.expired, 1);
	assert_eq!(diff.names.added, 0);
}

#[test]
fn test_unused_symbols_expire_once() {
	let mut writer = FrameWriter::new();
	let mut reader = FrameReader::new();
	let frames = [
		Node::from(array![Symbol::from("RED"), Symbol::from("GREEN")]),
		Node::from(Symbol::from("GREEN")),
		Node::from(Symbol::from("GREEN")),
		Node::from(array![Symbol::from("RED"), Symbol::from("GREEN")]),
	];
	let mut diffs = Vec::new();
	for node in &frames {
		let bytes = writer.write(node).unwrap();
		diffs.push(writer.last_diff());
		assert_eq!(&reader.read(&bytes).unwrap(), node);
	}
	assert_eq!(diffs[0].symbols.added, 2);
	assert_eq!(diffs[1].symbols.expired, 1);
	assert!(diffs[2].is_empty());
	assert_eq!(diffs[3].symbols.added, 1);
	assert_eq!(diffs[3].symbols.expired, 0);
	assert_eq!(writer.context().sizes(), reader.context().sizes());
}

#[test]
fn test_dictionaries_stay_in_sync() {
	let mut writer = FrameWriter::new();
	let mut reader = FrameReader::new();
	for i in 0..50i64 {
		let mut obj = Object::new();
		obj.insert(format!("field{}", i % 7), Node::from(Symbol::new(format!("S{}", i % 5))));
		obj.insert(format!("other{}", i % 3), Node::from(i));
		if i % 4 == 0 {
			obj.insert(format!("dynamic key {i}"), Node::Null);
		}
		let node = Node::from(array![obj, Symbol::new(format!("T{}", i % 11))]);
		let bytes = writer.write(&node).unwrap();
		assert_eq!(reader.read(&bytes).unwrap(), node);
		assert_eq!(writer.context().sizes(), reader.context().sizes());
	}
}

#[test]
fn test_transient_structs_stay_out_of_the_dictionaries() {
	let mut writer = FrameWriter::new();
	let node = Node::from(object! { "user-1": 1i64, "user-2": 2i64 });
	writer.write(&node).unwrap();
	assert!(writer.last_diff().is_empty());
	assert_eq!(writer.context().sizes(), (0, 0, 0));
}

#[test]
fn test_array_larger_than_the_buffer() {
	let mut writer = FrameWriter::with_limit(1024);
	let node = Node::from(Array::from(vec![7i8; 1025]));
	assert!(matches!(writer.write(&node), Err(Error::OutOfSpace { .. })));
}

#[test]
fn test_truncated_frames() {
	let mut writer = FrameWriter::new();
	let node = Node::from(object! { id: 1i64, name: "Alice", tags: array!["a", "b"] });
	let bytes = writer.write(&node).unwrap();
	for len in 0..bytes.len() {
		let mut reader = FrameReader::new();
		let err = reader.read(&bytes[..len]).unwrap_err();
		assert!(err.is_fatal(), "unexpected error {err:?} at length {len}");
	}
}

#[test]
fn test_trailing_bytes() {
	let mut writer = FrameWriter::new();
	let mut bytes = writer.write(&Node::from(1i64)).unwrap().to_vec();
	bytes.push(0);
	assert!(matches!(FrameReader::new().read(&bytes), Err(Error::UnexpectedRead(_))));
}

#[test]
fn test_frames_out_of_order_are_rejected() {
	let mut writer = FrameWriter::new();
	writer.write(&Node::from(Symbol::from("A"))).unwrap();
	let bytes = writer.write(&Node::from(Symbol::from("B"))).unwrap();
	// The second frame expires symbol A, which this reader never saw
	let mut reader = FrameReader::new();
	assert!(matches!(reader.read(&bytes), Err(Error::InvalidData(_))));
}

/// A log sink shared with the test which installed it.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Captured {
	fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock()).into_owned()
	}
}

#[test]
fn test_skipped_frame_is_still_decoded() {
	let logs = Captured::default();
	let sink = logs.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::WARN)
		.with_ansi(false)
		.with_writer(move || sink.clone())
		.finish();
	let mut writer = FrameWriter::new();
	let mut reader = FrameReader::new();
	let first = writer.write(&Node::from(1i64)).unwrap();
	writer.write(&Node::from(2i64)).unwrap();
	let third = writer.write(&Node::from(3i64)).unwrap();
	tracing::subscriber::with_default(subscriber, || {
		reader.read(&first).unwrap();
		assert!(logs.contents().is_empty());
		// Literal-only frames carry no dictionary changes
		assert_eq!(reader.read(&third).unwrap(), Node::from(3i64));
	});
	assert_eq!(reader.last_sequence(), Some(2));
	let out = logs.contents();
	assert!(out.contains("WARN"), "missing warning in {out:?}");
	assert!(out.contains("Expected frame 1, but received frame 2"), "unexpected log {out:?}");
}

#[test]
fn test_write_can_be_retried_after_running_out_of_space() {
	let mut writer = FrameWriter::with_limit(64);
	let mut reader = FrameReader::new();
	let large = Node::from(object! { id: 1i64, name: "x".repeat(100) });
	let err = writer.write(&large).unwrap_err();
	assert!(err.is_capacity());
	assert!(!err.is_fatal());
	assert_eq!(writer.sequence(), 0);
	// The next frame still announces everything the failed one would have
	let small = Node::from(object! { id: 2i64, name: "b" });
	let bytes = writer.write(&small).unwrap();
	assert_eq!(writer.last_diff().structs.added, 1);
	assert_eq!(writer.last_diff().names.added, 2);
	assert_eq!(reader.read(&bytes).unwrap(), small);
	// The same value fits once the limit is raised
	assert!(writer.write(&large).is_err());
	writer.set_limit(1024);
	let bytes = writer.write(&large).unwrap();
	assert_eq!(reader.read(&bytes).unwrap(), large);
	assert_eq!(reader.last_sequence(), Some(1));
	assert_eq!(writer.context().sizes(), reader.context().sizes());
}

#[test]
fn test_nesting_limit() {
	let mut node = Node::from(1i64);
	for _ in 0..10 {
		node = Node::from(array![node]);
	}
	let mut writer = FrameWriter::new().with_max_depth(8);
	assert!(matches!(writer.write(&node), Err(Error::InvalidData(_))));
	let bytes = FrameWriter::new().write(&node).unwrap();
	let mut reader = FrameReader::new().with_max_depth(8);
	assert!(matches!(reader.read(&bytes), Err(Error::UnexpectedRead(_))));
	assert_eq!(FrameReader::new().read(&bytes).unwrap(), node);
}

#[test]
fn test_mixed_array_slices_survive() {
	let node = Node::from(array![1i64, 2i64, "a", Node::Null, Node::Null, 3i64]);
	let mut writer = FrameWriter::new();
	let bytes = writer.write(&node).unwrap();
	let back = FrameReader::new().read(&bytes).unwrap();
	let slices = back.as_array().unwrap().slices();
	assert_eq!(slices.len(), 4);
	assert_eq!(slices[1], Slice::String(vec!["a".to_string()]));
	assert_eq!(slices[2], Slice::Null(2));
}

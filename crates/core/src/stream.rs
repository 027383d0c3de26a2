//! A duplex stream of frames bound to a converter registry.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use packwire_types::Node;

use crate::conv::{Instance, Registry};
use crate::err::Error;
use crate::frame::{FrameReader, FrameWriter};

/// One end of a packwire connection
///
/// The writer encodes outbound values and the reader decodes inbound frames.
/// The two directions keep separate dictionaries, and the registry is shared
/// with any other stream of the process.
#[derive(Debug)]
pub struct Stream {
	registry: Arc<Registry>,
	writer: FrameWriter,
	reader: FrameReader,
}

impl Default for Stream {
	fn default() -> Self {
		Stream::new(Arc::new(Registry::default()))
	}
}

impl Stream {
	pub fn new(registry: Arc<Registry>) -> Self {
		Stream {
			registry,
			writer: FrameWriter::new(),
			reader: FrameReader::new(),
		}
	}

	/// Replaces the outbound frame writer, for example to change its limit.
	pub fn with_writer(mut self, writer: FrameWriter) -> Self {
		self.writer = writer;
		self
	}

	pub fn with_reader(mut self, reader: FrameReader) -> Self {
		self.reader = reader;
		self
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	pub fn writer(&self) -> &FrameWriter {
		&self.writer
	}

	/// The outbound frame writer, for example to raise its limit after a
	/// write failed with [`Error::OutOfSpace`].
	pub fn writer_mut(&mut self) -> &mut FrameWriter {
		&mut self.writer
	}

	pub fn reader(&self) -> &FrameReader {
		&self.reader
	}

	/// Converts a host value and writes it as the next outbound frame.
	pub fn serialize<T: Any + Send + Sync>(&mut self, value: T) -> Result<Bytes, Error> {
		self.serialize_instance(Some(Instance::new(value)))
	}

	/// Writes a possibly missing host value as the next outbound frame.
	pub fn serialize_instance(&mut self, value: Option<Instance>) -> Result<Bytes, Error> {
		let node = self.registry.to_node(value)?;
		self.writer.write(&node)
	}

	pub fn serialize_node(&mut self, node: &Node) -> Result<Bytes, Error> {
		self.writer.write(node)
	}

	/// Reads the next inbound frame and converts it into `T`.
	///
	/// A null value is returned as `None`.
	pub fn deserialize<T: Any + Send + Sync>(&mut self, bytes: &[u8]) -> Result<Option<T>, Error> {
		let node = self.reader.read(bytes)?;
		self.registry.from_node::<T>(node)
	}

	pub fn deserialize_node(&mut self, bytes: &[u8]) -> Result<Node, Error> {
		self.reader.read(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::Map;

	#[test]
	fn test_round_trip_through_the_registry() {
		let mut tx = Stream::default();
		let mut rx = Stream::new(tx.registry().clone());
		let bytes = tx.serialize(vec![1i64, 2, 3]).unwrap();
		assert_eq!(rx.deserialize::<Vec<i64>>(&bytes).unwrap(), Some(vec![1, 2, 3]));
		let bytes = tx.serialize(String::from("hello")).unwrap();
		assert_eq!(rx.deserialize::<String>(&bytes).unwrap().as_deref(), Some("hello"));
	}

	#[test]
	fn test_retry_with_a_larger_frame() {
		let mut tx = Stream::default().with_writer(FrameWriter::with_limit(8));
		let mut rx = Stream::default();
		let err = tx.serialize(String::from("a longer string")).unwrap_err();
		assert!(err.is_capacity());
		tx.writer_mut().set_limit(64);
		let bytes = tx.serialize(String::from("a longer string")).unwrap();
		assert_eq!(rx.deserialize::<String>(&bytes).unwrap().as_deref(), Some("a longer string"));
	}

	#[test]
	fn test_null_round_trip() {
		let mut tx = Stream::default();
		let mut rx = Stream::default();
		let bytes = tx.serialize_instance(None).unwrap();
		assert_eq!(rx.deserialize::<i64>(&bytes).unwrap(), None);
	}

	#[test]
	fn test_maps_decode_in_field_order() {
		let mut tx = Stream::default();
		let mut rx = Stream::default();
		let mut map = Map::new();
		map.insert("b".to_string(), Some(Instance::new(1i64)));
		map.insert("a".to_string(), None);
		let bytes = tx.serialize(map).unwrap();
		let back = rx.deserialize::<Map>(&bytes).unwrap().unwrap();
		assert_eq!(back.keys().map(String::as_str).collect::<Vec<_>>(), vec!["b", "a"]);
		assert!(back["a"].is_none());
	}
}

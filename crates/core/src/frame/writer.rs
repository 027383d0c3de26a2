use bytes::Bytes;
use packwire_types::{Array, Node, Object, Slice};

use super::{
	FrameDiff, PROTOCOL_VERSION, constant, data, head, next_sequence, record, schema, slice, tag,
};
use crate::buf::Output;
use crate::cnf::MAX_FRAME_SIZE;
use crate::ctx::{ContextDiff, OutputContext};
use crate::err::Error;

/// The writing end of a stream
///
/// Every frame written here must be read, in order, by the same
/// [`FrameReader`](super::FrameReader). A failed write produces no frame
/// and leaves the dictionaries as they were, so the stream stays usable.
#[derive(Debug)]
pub struct FrameWriter {
	ctx: OutputContext,
	sequence: i64,
	limit: usize,
	last_diff: FrameDiff,
}

impl Default for FrameWriter {
	fn default() -> Self {
		Self::new()
	}
}

impl FrameWriter {
	/// Creates a writer bounded by the configured maximum frame size.
	pub fn new() -> Self {
		Self::with_limit(*MAX_FRAME_SIZE)
	}

	/// Creates a writer whose frames are at most `limit` bytes long.
	pub fn with_limit(limit: usize) -> Self {
		FrameWriter {
			ctx: OutputContext::new(),
			sequence: 0,
			limit,
			last_diff: FrameDiff::default(),
		}
	}

	/// Overrides the maximum nesting depth of written values.
	pub fn with_max_depth(mut self, max_depth: u32) -> Self {
		self.ctx = self.ctx.with_max_depth(max_depth);
		self
	}

	/// The sequence number the next frame will carry.
	pub fn sequence(&self) -> i64 {
		self.sequence
	}

	/// The dictionary changes carried by the last frame written.
	pub fn last_diff(&self) -> FrameDiff {
		self.last_diff
	}

	pub fn context(&self) -> &OutputContext {
		&self.ctx
	}

	/// Changes the maximum size of the frames written from now on.
	///
	/// A write which failed with [`Error::OutOfSpace`] left the dictionaries
	/// untouched, so it can be retried after raising the limit.
	pub fn set_limit(&mut self, limit: usize) {
		self.limit = limit;
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Encodes a node as a single frame.
	///
	/// If the frame cannot be written, the dictionary changes it would have
	/// carried are undone and the sequence number is not used up.
	pub fn write(&mut self, node: &Node) -> Result<Bytes, Error> {
		let diff = self.ctx.scan(node)?;
		let bytes = match self.encode(node, &diff) {
			Ok(bytes) => bytes,
			Err(e) => {
				debug!("Discarding frame {}: {e}", self.sequence);
				self.ctx.revert();
				return Err(e);
			}
		};
		self.last_diff = FrameDiff::from(&diff);
		trace!("Wrote frame {} of {} bytes with {:?}", self.sequence, bytes.len(), self.last_diff);
		self.sequence = next_sequence(self.sequence);
		Ok(bytes)
	}

	fn encode(&mut self, node: &Node, diff: &ContextDiff) -> Result<Bytes, Error> {
		let data = self.data_records(diff);
		let schema = self.schema_records(diff);
		let mut out = Output::with_limit(self.limit);
		let mut flags = head::HAS_SEQUENCE;
		if !data.is_empty() {
			flags |= head::HAS_DATA;
		}
		if !schema.is_empty() {
			flags |= head::HAS_SCHEMA;
		}
		out.write_u8((PROTOCOL_VERSION << 4) | flags)?;
		out.write_varuint(self.sequence as u64)?;
		self.write_data(&mut out, diff, &data)?;
		self.write_schema(&mut out, diff, &schema)?;
		self.write_node(&mut out, node)?;
		Ok(out.finish())
	}

	fn data_records(&self, diff: &ContextDiff) -> Vec<(u8, usize)> {
		[
			(data::FLOAT, self.ctx.floats().len()),
			(data::DOUBLE, self.ctx.doubles().len()),
			(data::VARINT, self.ctx.varints().len()),
			(data::STRING, self.ctx.strings().len()),
			(data::SYMBOL_EXPIRED, diff.symbols.expired.len()),
			(data::SYMBOL_ADDED, diff.symbols.added.len()),
		]
		.into_iter()
		.filter(|(_, count)| *count > 0)
		.collect()
	}

	fn schema_records(&self, diff: &ContextDiff) -> Vec<(u8, usize)> {
		[
			(schema::NAME_TMP, self.ctx.tmp_names().len()),
			(schema::STRUCT_TMP, self.ctx.tmp_structs().len()),
			(schema::NAME_EXPIRED, diff.names.expired.len()),
			(schema::NAME_ADDED, diff.names.added.len()),
			(schema::STRUCT_EXPIRED, diff.structs.expired.len()),
			(schema::STRUCT_ADDED, diff.structs.added.len()),
		]
		.into_iter()
		.filter(|(_, count)| *count > 0)
		.collect()
	}

	fn write_data(
		&self,
		out: &mut Output,
		diff: &ContextDiff,
		records: &[(u8, usize)],
	) -> Result<(), Error> {
		for (i, (flag, count)) in records.iter().enumerate() {
			write_record(out, *flag, *count, i + 1 < records.len())?;
			match *flag {
				data::FLOAT => {
					for v in self.ctx.floats() {
						out.write_f32(f32::from_bits(*v))?;
					}
				}
				data::DOUBLE => {
					for v in self.ctx.doubles() {
						out.write_f64(f64::from_bits(*v))?;
					}
				}
				data::VARINT => {
					for v in self.ctx.varints() {
						out.write_varint(*v)?;
					}
				}
				data::STRING => {
					for v in self.ctx.strings() {
						out.write_str(v)?;
					}
				}
				data::SYMBOL_EXPIRED => {
					for id in &diff.symbols.expired {
						out.write_varuint(u64::from(*id))?;
					}
				}
				data::SYMBOL_ADDED => {
					for (_, v) in &diff.symbols.added {
						out.write_str(v)?;
					}
				}
				_ => {}
			}
		}
		Ok(())
	}

	fn write_schema(
		&self,
		out: &mut Output,
		diff: &ContextDiff,
		records: &[(u8, usize)],
	) -> Result<(), Error> {
		for (i, (flag, count)) in records.iter().enumerate() {
			write_record(out, *flag, *count, i + 1 < records.len())?;
			match *flag {
				schema::NAME_TMP => {
					for v in self.ctx.tmp_names() {
						out.write_str(v)?;
					}
				}
				schema::STRUCT_TMP => {
					for fields in self.ctx.tmp_structs() {
						out.write_varuint(fields.len() as u64)?;
						for name in fields.iter() {
							out.write_varuint(self.ctx.tmp_name_index(name)? as u64)?;
						}
					}
				}
				schema::NAME_EXPIRED => {
					for id in &diff.names.expired {
						out.write_varuint(u64::from(*id))?;
					}
				}
				schema::NAME_ADDED => {
					for (_, v) in &diff.names.added {
						out.write_str(v)?;
					}
				}
				schema::STRUCT_EXPIRED => {
					for id in &diff.structs.expired {
						out.write_varuint(u64::from(*id))?;
					}
				}
				schema::STRUCT_ADDED => {
					for (_, fields) in &diff.structs.added {
						out.write_varuint(fields.len() as u64)?;
						for name in fields.iter() {
							out.write_varuint(u64::from(self.ctx.name_id(name)?))?;
						}
					}
				}
				_ => {}
			}
		}
		Ok(())
	}

	fn write_node(&mut self, out: &mut Output, node: &Node) -> Result<(), Error> {
		match node {
			Node::Null => write_value(out, tag::CONST, constant::NULL),
			Node::Bool(false) => write_value(out, tag::CONST, constant::FALSE),
			Node::Bool(true) => write_value(out, tag::CONST, constant::TRUE),
			Node::Varint(v) => write_value(out, tag::VARINT, self.ctx.varint_id(*v)?),
			Node::Float32(v) => write_value(out, tag::FLOAT, self.ctx.float_id(*v)?),
			Node::Float64(v) => write_value(out, tag::DOUBLE, self.ctx.double_id(*v)?),
			Node::String(v) => write_value(out, tag::STRING, self.ctx.string_id(v)?),
			Node::Symbol(v) => write_value(out, tag::SYMBOL, self.ctx.symbol_id(v.as_str())?),
			Node::Array(v) => {
				write_value(out, tag::ARRAY, 0)?;
				self.write_slices(out, v)
			}
			Node::Object(v) => {
				write_value(out, tag::OBJECT, self.ctx.next_struct_ref()?)?;
				self.write_fields(out, v)
			}
		}
	}

	fn write_fields(&mut self, out: &mut Output, obj: &Object) -> Result<(), Error> {
		for value in obj.values() {
			self.write_node(out, value)?;
		}
		Ok(())
	}

	fn write_slices(&mut self, out: &mut Output, arr: &Array) -> Result<(), Error> {
		let slices = arr.slices();
		for (i, s) in slices.iter().enumerate() {
			let more = u64::from(i + 1 < slices.len());
			let kind = u64::from(s.kind() as u8);
			out.write_varuint(((s.len() as u64) << slice::COUNT_SHIFT) | (kind << 1) | more)?;
			match s {
				Slice::Null(_) => {}
				Slice::Bool(v) => out.write_bools(v)?,
				Slice::Byte(v) => {
					for x in v {
						out.write_i8(*x)?;
					}
				}
				Slice::Short(v) => {
					for x in v {
						out.write_i16(*x)?;
					}
				}
				Slice::Int(v) => {
					for x in v {
						out.write_varint(i64::from(*x))?;
					}
				}
				Slice::Long(v) => {
					for x in v {
						out.write_varint(*x)?;
					}
				}
				Slice::Float(v) => {
					for x in v {
						out.write_f32(*x)?;
					}
				}
				Slice::Double(v) => {
					for x in v {
						out.write_f64(*x)?;
					}
				}
				Slice::String(v) => {
					for x in v {
						out.write_varuint(self.ctx.string_id(x)?)?;
					}
				}
				Slice::Symbol(v) => {
					for x in v {
						out.write_varuint(self.ctx.symbol_id(x.as_str())?)?;
					}
				}
				Slice::Object(v) => {
					for obj in v {
						out.write_varuint(self.ctx.next_struct_ref()?)?;
						self.write_fields(out, obj)?;
					}
				}
				Slice::Array(v) => {
					for arr in v {
						self.write_slices(out, arr)?;
					}
				}
			}
		}
		Ok(())
	}
}

fn write_record(out: &mut Output, flag: u8, count: usize, more: bool) -> Result<(), Error> {
	let head = ((count as u64) << record::COUNT_SHIFT) | (u64::from(flag) << 1) | u64::from(more);
	out.write_varuint(head)
}

fn write_value(out: &mut Output, code: u64, payload: u64) -> Result<(), Error> {
	out.write_varuint((payload << tag::BITS) | code)
}

#[cfg(test)]
mod tests {
	use packwire_types::{Symbol, array, object};

	use super::*;

	#[test]
	fn test_null_frame_layout() {
		let mut writer = FrameWriter::new();
		let bytes = writer.write(&Node::Null).unwrap();
		assert_eq!(&bytes[..], &[0x14, 0x00, 0x00]);
		let bytes = writer.write(&Node::Bool(true)).unwrap();
		assert_eq!(&bytes[..], &[0x14, 0x01, 0x10]);
		assert_eq!(writer.sequence(), 2);
	}

	#[test]
	fn test_literal_frame_layout() {
		let mut writer = FrameWriter::new();
		let bytes = writer.write(&Node::from("hi")).unwrap();
		// One string record, then the string tag with id 2
		assert_eq!(&bytes[..], &[0x15, 0x00, 0x18, 0x02, b'h', b'i', 0x14]);
		let bytes = writer.write(&Node::from("")).unwrap();
		assert_eq!(&bytes[..], &[0x14, 0x01, 0x0C]);
	}

	#[test]
	fn test_small_array_layout() {
		let mut writer = FrameWriter::new();
		let bytes = writer.write(&Node::from(array![true, false, true])).unwrap();
		// Array tag, then one bool slice of three elements
		assert_eq!(&bytes[..], &[0x14, 0x00, 0x06, 0x62, 0x05]);
	}

	#[test]
	fn test_repeated_shape_has_no_schema() {
		let mut writer = FrameWriter::new();
		writer.write(&Node::from(object! { id: 1i64, name: "a" })).unwrap();
		let diff = writer.last_diff();
		assert_eq!(diff.names.added, 2);
		assert_eq!(diff.structs.added, 1);
		let bytes = writer.write(&Node::from(object! { id: 2i64, name: "b" })).unwrap();
		assert!(writer.last_diff().is_empty());
		assert_eq!(bytes[0] & head::HAS_SCHEMA, 0);
	}

	#[test]
	fn test_frame_size_limit() {
		let mut writer = FrameWriter::with_limit(16);
		let long = "x".repeat(32);
		assert!(matches!(writer.write(&Node::from(long)), Err(Error::OutOfSpace { .. })));
		let mut writer = FrameWriter::with_limit(16);
		assert!(writer.write(&Node::from(Symbol::from("RED"))).is_ok());
	}

	#[test]
	fn test_failed_write_keeps_the_sequence() {
		let mut writer = FrameWriter::with_limit(16);
		let node = Node::from(array![Symbol::from("LONG_SYMBOL_NAME"), Symbol::from("B")]);
		assert!(matches!(writer.write(&node), Err(Error::OutOfSpace { .. })));
		assert_eq!(writer.sequence(), 0);
		assert_eq!(writer.context().sizes(), (0, 0, 0));
		writer.set_limit(64);
		assert_eq!(writer.limit(), 64);
		writer.write(&node).unwrap();
		assert_eq!(writer.sequence(), 1);
		assert_eq!(writer.last_diff().symbols.added, 2);
	}
}

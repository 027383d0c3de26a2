use packwire_types::{Array, Node, Object, Slice, SliceKind};

use super::{PROTOCOL_VERSION, constant, data, head, next_sequence, record, schema, slice, tag};
use crate::buf::Input;
use crate::cnf::MAX_NESTING_DEPTH;
use crate::ctx::InputContext;
use crate::err::Error;

/// The reading end of a stream
///
/// Frames must be read in the order the matching
/// [`FrameWriter`](super::FrameWriter) produced them. A failed read leaves
/// the dictionaries in an unknown state, and the stream must be discarded.
#[derive(Debug)]
pub struct FrameReader {
	ctx: InputContext,
	last: Option<i64>,
	max_depth: u32,
}

impl Default for FrameReader {
	fn default() -> Self {
		Self::new()
	}
}

/// Reads `count` items of at least `width` bytes each.
fn read_vec<'a, T>(
	input: &mut Input<'a>,
	count: usize,
	width: usize,
	mut f: impl FnMut(&mut Input<'a>) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
	let mut out = Vec::with_capacity(input.capacity_hint(count, width));
	for _ in 0..count {
		out.push(f(input)?);
	}
	Ok(out)
}

/// Reads a record header, returning its flag, item count and continuation bit.
fn read_record(input: &mut Input<'_>) -> Result<(u8, usize, bool), Error> {
	let v = input.read_varuint()?;
	let flag = ((v >> 1) & record::FLAG_MASK) as u8;
	let count = usize::try_from(v >> record::COUNT_SHIFT)
		.map_err(|_| Error::UnexpectedRead(format!("record count {v} is too large")))?;
	Ok((flag, count, v & 1 == 1))
}

impl FrameReader {
	pub fn new() -> Self {
		FrameReader {
			ctx: InputContext::new(),
			last: None,
			max_depth: *MAX_NESTING_DEPTH,
		}
	}

	/// Overrides the maximum nesting depth of read values.
	pub fn with_max_depth(mut self, max_depth: u32) -> Self {
		self.max_depth = max_depth;
		self
	}

	/// The sequence number of the last frame read.
	pub fn last_sequence(&self) -> Option<i64> {
		self.last
	}

	pub fn context(&self) -> &InputContext {
		&self.ctx
	}

	/// Decodes a single frame.
	pub fn read(&mut self, bytes: &[u8]) -> Result<Node, Error> {
		let mut input = Input::new(bytes);
		let byte = input.read_u8()?;
		let version = byte >> 4;
		if version != PROTOCOL_VERSION {
			return Err(Error::UnexpectedRead(format!("unsupported protocol version {version}")));
		}
		let flags = byte & 0x0F;
		if flags & !head::MASK != 0 {
			return Err(Error::UnexpectedRead(format!("unknown frame flags {flags:#04x}")));
		}
		if flags & head::HAS_SEQUENCE != 0 {
			let v = input.read_varuint()?;
			let sequence = i64::try_from(v)
				.map_err(|_| Error::UnexpectedRead(format!("frame sequence {v} is out of range")))?;
			self.observe(sequence);
		}
		self.ctx.begin_frame();
		if flags & head::HAS_DATA != 0 {
			self.read_data(&mut input)?;
		}
		if flags & head::HAS_SCHEMA != 0 {
			self.read_schema(&mut input)?;
		}
		let node = self.read_node(&mut input, 0)?;
		if !input.is_empty() {
			return Err(Error::UnexpectedRead(format!(
				"{} trailing bytes after the frame body",
				input.remaining()
			)));
		}
		trace!("Read frame {:?} of {} bytes", self.last, bytes.len());
		Ok(node)
	}

	fn observe(&mut self, sequence: i64) {
		if let Some(last) = self.last {
			let expected = next_sequence(last);
			if sequence != expected {
				warn!("Expected frame {expected}, but received frame {sequence}");
			}
		}
		self.last = Some(sequence);
	}

	fn read_data(&mut self, input: &mut Input<'_>) -> Result<(), Error> {
		loop {
			let (flag, count, more) = read_record(input)?;
			match flag {
				data::FLOAT => {
					let v = read_vec(input, count, 4, |i| i.read_f32())?;
					self.ctx.floats.extend(v);
				}
				data::DOUBLE => {
					let v = read_vec(input, count, 8, |i| i.read_f64())?;
					self.ctx.doubles.extend(v);
				}
				data::VARINT => {
					let v = read_vec(input, count, 1, |i| i.read_varint())?;
					self.ctx.varints.extend(v);
				}
				data::STRING => {
					let v = read_vec(input, count, 1, |i| i.read_str().map(str::to_string))?;
					self.ctx.strings.extend(v);
				}
				data::SYMBOL_ADDED => {
					for _ in 0..count {
						let v = input.read_str()?;
						self.ctx.add_symbol(v.to_string());
					}
				}
				data::SYMBOL_EXPIRED => {
					for _ in 0..count {
						let id = input.read_varuint()?;
						self.ctx.expire_symbol(id)?;
					}
				}
				flag => {
					return Err(Error::UnexpectedRead(format!("unknown data record {flag}")));
				}
			}
			if !more {
				return Ok(());
			}
		}
	}

	fn read_schema(&mut self, input: &mut Input<'_>) -> Result<(), Error> {
		loop {
			let (flag, count, more) = read_record(input)?;
			match flag {
				schema::NAME_TMP => {
					for _ in 0..count {
						let v = input.read_str()?;
						self.ctx.add_tmp_name(v.to_string());
					}
				}
				schema::STRUCT_TMP => {
					for _ in 0..count {
						let names = read_names(input)?;
						self.ctx.add_tmp_struct(&names)?;
					}
				}
				schema::NAME_ADDED => {
					for _ in 0..count {
						let v = input.read_str()?;
						self.ctx.add_name(v.to_string());
					}
				}
				schema::NAME_EXPIRED => {
					for _ in 0..count {
						let id = input.read_varuint()?;
						self.ctx.expire_name(id)?;
					}
				}
				schema::STRUCT_ADDED => {
					for _ in 0..count {
						let names = read_names(input)?;
						self.ctx.add_struct(&names)?;
					}
				}
				schema::STRUCT_EXPIRED => {
					for _ in 0..count {
						let id = input.read_varuint()?;
						self.ctx.expire_struct(id)?;
					}
				}
				flag => {
					return Err(Error::UnexpectedRead(format!("unknown schema record {flag}")));
				}
			}
			if !more {
				return Ok(());
			}
		}
	}

	fn check_depth(&self, depth: u32) -> Result<(), Error> {
		if depth >= self.max_depth {
			return Err(Error::UnexpectedRead(format!(
				"value is nested deeper than {} levels",
				self.max_depth
			)));
		}
		Ok(())
	}

	fn read_node(&self, input: &mut Input<'_>, depth: u32) -> Result<Node, Error> {
		let v = input.read_varuint()?;
		let payload = v >> tag::BITS;
		// A zero id is the null of every pooled kind
		if payload == 0 && (tag::VARINT..=tag::SYMBOL).contains(&(v & tag::MASK)) {
			return Ok(Node::Null);
		}
		Ok(match v & tag::MASK {
			tag::CONST => match payload {
				constant::NULL => Node::Null,
				constant::FALSE => Node::Bool(false),
				constant::TRUE => Node::Bool(true),
				v => return Err(Error::UnexpectedRead(format!("unknown constant {v}"))),
			},
			tag::VARINT => Node::Varint(self.ctx.varint(payload)?),
			tag::FLOAT => Node::Float32(self.ctx.float(payload)?),
			tag::DOUBLE => Node::Float64(self.ctx.double(payload)?),
			tag::STRING => Node::String(self.ctx.string(payload)?),
			tag::SYMBOL => Node::Symbol(self.ctx.symbol(payload)?),
			tag::ARRAY => {
				if payload != 0 {
					return Err(Error::UnexpectedRead(format!("unexpected array payload {payload}")));
				}
				self.check_depth(depth)?;
				Node::Array(self.read_slices(input, depth + 1)?)
			}
			_ => {
				self.check_depth(depth)?;
				Node::Object(self.read_fields(input, payload, depth + 1)?)
			}
		})
	}

	fn read_fields(&self, input: &mut Input<'_>, reference: u64, depth: u32) -> Result<Object, Error> {
		let fields = self.ctx.fields(reference)?;
		let mut obj = Object::with_capacity(fields.len());
		for name in fields.iter() {
			obj.insert(name.clone(), self.read_node(input, depth)?);
		}
		Ok(obj)
	}

	fn read_slices(&self, input: &mut Input<'_>, depth: u32) -> Result<Array, Error> {
		let mut slices = Vec::new();
		loop {
			let v = input.read_varuint()?;
			let kind = ((v >> 1) & slice::KIND_MASK) as u8;
			let kind = SliceKind::try_from(kind)
				.map_err(|k| Error::UnexpectedRead(format!("unknown slice kind {k}")))?;
			let count = usize::try_from(v >> slice::COUNT_SHIFT)
				.map_err(|_| Error::UnexpectedRead(format!("slice length {v} is too large")))?;
			slices.push(self.read_slice(input, kind, count, depth)?);
			if v & 1 == 0 {
				return Ok(Array::from_slices(slices));
			}
		}
	}

	fn read_slice(
		&self,
		input: &mut Input<'_>,
		kind: SliceKind,
		count: usize,
		depth: u32,
	) -> Result<Slice, Error> {
		Ok(match kind {
			SliceKind::Null => Slice::Null(count),
			SliceKind::Bool => Slice::Bool(input.read_bools(count)?),
			SliceKind::Byte => Slice::Byte(read_vec(input, count, 1, |i| i.read_i8())?),
			SliceKind::Short => Slice::Short(read_vec(input, count, 2, |i| i.read_i16())?),
			SliceKind::Int => Slice::Int(read_vec(input, count, 1, |i| {
				let v = i.read_varint()?;
				i32::try_from(v).map_err(|_| Error::UnexpectedRead(format!("{v} is out of range for int")))
			})?),
			SliceKind::Long => Slice::Long(read_vec(input, count, 1, |i| i.read_varint())?),
			SliceKind::Float => Slice::Float(read_vec(input, count, 4, |i| i.read_f32())?),
			SliceKind::Double => Slice::Double(read_vec(input, count, 8, |i| i.read_f64())?),
			SliceKind::String => Slice::String(read_vec(input, count, 1, |i| {
				self.ctx.string(element_id(i)?)
			})?),
			SliceKind::Symbol => Slice::Symbol(read_vec(input, count, 1, |i| {
				self.ctx.symbol(element_id(i)?)
			})?),
			SliceKind::Object => Slice::Object(read_vec(input, count, 1, |i| {
				self.check_depth(depth)?;
				let reference = i.read_varuint()?;
				self.read_fields(i, reference, depth + 1)
			})?),
			SliceKind::Array => Slice::Array(read_vec(input, count, 1, |i| {
				self.check_depth(depth)?;
				self.read_slices(i, depth + 1)
			})?),
		})
	}
}

/// Reads the name references of a struct definition.
fn read_names(input: &mut Input<'_>) -> Result<Vec<u64>, Error> {
	let len = input.read_len()?;
	read_vec(input, len, 1, |i| i.read_varuint())
}

/// Reads a pooled id inside a slice, where null is not allowed.
fn element_id(input: &mut Input<'_>) -> Result<u64, Error> {
	match input.read_varuint()? {
		0 => Err(Error::InvalidData("null id inside a typed slice".to_string())),
		id => Ok(id),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reads_constants() {
		let mut reader = FrameReader::new();
		assert_eq!(reader.read(&[0x14, 0x00, 0x00]).unwrap(), Node::Null);
		assert_eq!(reader.read(&[0x14, 0x01, 0x10]).unwrap(), Node::Bool(true));
		assert_eq!(reader.last_sequence(), Some(1));
	}

	#[test]
	fn test_reads_null_ids() {
		let mut reader = FrameReader::new();
		// A string tag with the null id
		assert_eq!(reader.read(&[0x14, 0x00, 0x04]).unwrap(), Node::Null);
		// A string tag with the empty id
		assert_eq!(reader.read(&[0x14, 0x01, 0x0C]).unwrap(), Node::from(""));
	}

	#[test]
	fn test_rejects_malformed_headers() {
		let mut reader = FrameReader::new();
		assert!(matches!(reader.read(&[]), Err(Error::UnexpectedEnd { .. })));
		assert!(matches!(reader.read(&[0x24, 0x00, 0x00]), Err(Error::UnexpectedRead(_))));
		assert!(matches!(reader.read(&[0x1C, 0x00, 0x00]), Err(Error::UnexpectedRead(_))));
	}

	#[test]
	fn test_rejects_unknown_records() {
		let mut reader = FrameReader::new();
		// Data record with flag 7
		assert!(matches!(reader.read(&[0x15, 0x00, 0x1E]), Err(Error::UnexpectedRead(_))));
		// Schema record with flag 0
		assert!(matches!(reader.read(&[0x16, 0x00, 0x10]), Err(Error::UnexpectedRead(_))));
	}

	#[test]
	fn test_rejects_unknown_slice_kind() {
		let mut reader = FrameReader::new();
		// Array tag, slice record with kind 12
		assert!(matches!(reader.read(&[0x14, 0x00, 0x06, 0x18]), Err(Error::UnexpectedRead(_))));
	}

	#[test]
	fn test_rejects_null_in_string_slice() {
		let mut reader = FrameReader::new();
		// Array tag, string slice of one element with id 0
		assert!(matches!(reader.read(&[0x14, 0x00, 0x06, 0x30, 0x00]), Err(Error::InvalidData(_))));
	}

	#[test]
	fn test_rejects_unknown_references() {
		let mut reader = FrameReader::new();
		// A varint with id 2, but no literals
		assert!(matches!(reader.read(&[0x14, 0x00, 0x11]), Err(Error::InvalidData(_))));
		// An object with durable struct 2
		assert!(matches!(reader.read(&[0x14, 0x01, 0x27]), Err(Error::InvalidData(_))));
	}

	#[test]
	fn test_rejects_deep_nesting() {
		let mut reader = FrameReader::new().with_max_depth(2);
		// Three nested arrays, each holding a single array
		let bytes = [0x14, 0x00, 0x06, 0x36, 0x36, 0x16];
		assert!(matches!(reader.read(&bytes), Err(Error::UnexpectedRead(_))));
		let mut reader = FrameReader::new().with_max_depth(3);
		assert!(reader.read(&bytes).is_ok());
	}
}

use bytes::{BufMut, Bytes, BytesMut};

use super::{varuint_len, zigzag};
use crate::cnf::{INITIAL_FRAME_CAPACITY, MAX_FRAME_SIZE};
use crate::err::Error;

/// A growable output buffer with a hard capacity limit
///
/// Every write checks the remaining capacity before touching the buffer, so
/// a failed write never leaves a partially written value behind.
#[derive(Debug)]
pub struct Output {
	buf: BytesMut,
	limit: usize,
}

impl Default for Output {
	fn default() -> Self {
		Self::with_limit(*MAX_FRAME_SIZE)
	}
}

impl Output {
	/// Creates a buffer limited to the configured maximum frame size.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a buffer which accepts at most `limit` bytes.
	pub fn with_limit(limit: usize) -> Self {
		Output {
			buf: BytesMut::with_capacity(limit.min(*INITIAL_FRAME_CAPACITY)),
			limit,
		}
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// The number of bytes which can still be written.
	pub fn remaining(&self) -> usize {
		self.limit - self.buf.len()
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	/// Consumes the buffer, returning the written bytes.
	pub fn finish(self) -> Bytes {
		self.buf.freeze()
	}

	fn reserve(&mut self, need: usize) -> Result<(), Error> {
		let available = self.remaining();
		if need > available {
			return Err(Error::OutOfSpace {
				need,
				available,
			});
		}
		self.buf.reserve(need);
		Ok(())
	}

	pub fn write_u8(&mut self, v: u8) -> Result<(), Error> {
		self.reserve(1)?;
		self.buf.put_u8(v);
		Ok(())
	}

	pub fn write_i8(&mut self, v: i8) -> Result<(), Error> {
		self.reserve(1)?;
		self.buf.put_i8(v);
		Ok(())
	}

	pub fn write_i16(&mut self, v: i16) -> Result<(), Error> {
		self.reserve(2)?;
		self.buf.put_i16_le(v);
		Ok(())
	}

	pub fn write_f32(&mut self, v: f32) -> Result<(), Error> {
		self.reserve(4)?;
		self.buf.put_f32_le(v);
		Ok(())
	}

	pub fn write_f64(&mut self, v: f64) -> Result<(), Error> {
		self.reserve(8)?;
		self.buf.put_f64_le(v);
		Ok(())
	}

	pub fn write_varuint(&mut self, mut v: u64) -> Result<(), Error> {
		self.reserve(varuint_len(v))?;
		while v >= 0x80 {
			self.buf.put_u8((v as u8 & 0x7F) | 0x80);
			v >>= 7;
		}
		self.buf.put_u8(v as u8);
		Ok(())
	}

	pub fn write_varint(&mut self, v: i64) -> Result<(), Error> {
		self.write_varuint(zigzag(v))
	}

	/// Writes a length-prefixed UTF-8 string.
	pub fn write_str(&mut self, v: &str) -> Result<(), Error> {
		let len = v.len() as u64;
		self.reserve(varuint_len(len) + v.len())?;
		self.write_varuint(len)?;
		self.buf.put_slice(v.as_bytes());
		Ok(())
	}

	/// Writes raw bytes, without a length prefix.
	pub fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
		self.reserve(v.len())?;
		self.buf.put_slice(v);
		Ok(())
	}

	/// Writes booleans packed eight to a byte, least significant bit first.
	pub fn write_bools(&mut self, v: &[bool]) -> Result<(), Error> {
		self.reserve(v.len().div_ceil(8))?;
		for chunk in v.chunks(8) {
			let byte = chunk.iter().enumerate().fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << i));
			self.buf.put_u8(byte);
		}
		Ok(())
	}
}

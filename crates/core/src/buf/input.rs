use bytes::Buf;

use super::{MAX_VARINT_LEN, unzigzag};
use crate::err::Error;

/// A read cursor over a borrowed byte slice
#[derive(Clone, Debug)]
pub struct Input<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Input<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Input {
			buf,
			pos: 0,
		}
	}

	/// The number of bytes consumed so far.
	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// Consumes exactly `need` bytes.
	fn take(&mut self, need: usize) -> Result<&'a [u8], Error> {
		let available = self.remaining();
		if need > available {
			return Err(Error::UnexpectedEnd {
				need,
				available,
			});
		}
		let out = &self.buf[self.pos..self.pos + need];
		self.pos += need;
		Ok(out)
	}

	pub fn read_u8(&mut self) -> Result<u8, Error> {
		Ok(self.take(1)?.get_u8())
	}

	pub fn read_i8(&mut self) -> Result<i8, Error> {
		Ok(self.take(1)?.get_i8())
	}

	pub fn read_i16(&mut self) -> Result<i16, Error> {
		Ok(self.take(2)?.get_i16_le())
	}

	pub fn read_f32(&mut self) -> Result<f32, Error> {
		Ok(self.take(4)?.get_f32_le())
	}

	pub fn read_f64(&mut self) -> Result<f64, Error> {
		Ok(self.take(8)?.get_f64_le())
	}

	pub fn read_varuint(&mut self) -> Result<u64, Error> {
		let mut value = 0u64;
		for i in 0..MAX_VARINT_LEN {
			let byte = self.read_u8()?;
			if i == MAX_VARINT_LEN - 1 && byte > 1 {
				return Err(Error::UnexpectedRead("varint overflows 64 bits".to_string()));
			}
			value |= u64::from(byte & 0x7F) << (7 * i);
			if byte & 0x80 == 0 {
				return Ok(value);
			}
		}
		Err(Error::UnexpectedRead(format!("varint is longer than {MAX_VARINT_LEN} bytes")))
	}

	pub fn read_varint(&mut self) -> Result<i64, Error> {
		self.read_varuint().map(unzigzag)
	}

	/// Reads a varint which is used as a length or a count.
	pub fn read_len(&mut self) -> Result<usize, Error> {
		let v = self.read_varuint()?;
		usize::try_from(v).map_err(|_| Error::UnexpectedRead(format!("length {v} is too large")))
	}

	/// Reads a length-prefixed UTF-8 string.
	pub fn read_str(&mut self) -> Result<&'a str, Error> {
		let len = self.read_len()?;
		let bytes = self.take(len)?;
		std::str::from_utf8(bytes)
			.map_err(|e| Error::UnexpectedRead(format!("invalid UTF-8 in string: {e}")))
	}

	/// Reads `len` raw bytes.
	pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
		self.take(len)
	}

	/// Reads `len` booleans packed eight to a byte.
	pub fn read_bools(&mut self, len: usize) -> Result<Vec<bool>, Error> {
		let bytes = self.take(len.div_ceil(8))?;
		Ok((0..len).map(|i| bytes[i / 8] & (1 << (i % 8)) != 0).collect())
	}

	/// A capacity hint for `count` elements of at least `width` bytes each,
	/// which never exceeds what the remaining input could hold.
	pub fn capacity_hint(&self, count: usize, width: usize) -> usize {
		count.min(self.remaining() / width.max(1))
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::buf::Output;

	#[rstest]
	#[case::empty("")]
	#[case::ascii("hello world")]
	#[case::multibyte("héllo wörld ñ")]
	#[case::cjk("中文字符串")]
	#[case::emoji("emoji 😀🎉")]
	fn test_string_round_trip(#[case] s: &str) {
		let mut out = Output::with_limit(1024);
		out.write_str(s).unwrap();
		let bytes = out.finish();
		let mut input = Input::new(&bytes);
		assert_eq!(input.read_str().unwrap(), s);
		assert!(input.is_empty());
	}

	#[test]
	fn test_number_extremes() {
		let mut out = Output::with_limit(1024);
		out.write_i8(i8::MIN).unwrap();
		out.write_i16(i16::MIN).unwrap();
		out.write_i16(i16::MAX).unwrap();
		out.write_varuint(i64::MAX as u64).unwrap();
		out.write_varuint(u64::MAX).unwrap();
		out.write_varint(i64::MIN).unwrap();
		out.write_f64(f64::MIN_POSITIVE).unwrap();
		out.write_f32(f32::NEG_INFINITY).unwrap();
		let bytes = out.finish();
		let mut input = Input::new(&bytes);
		assert_eq!(input.read_i8().unwrap(), i8::MIN);
		assert_eq!(input.read_i16().unwrap(), i16::MIN);
		assert_eq!(input.read_i16().unwrap(), i16::MAX);
		assert_eq!(input.read_varuint().unwrap(), i64::MAX as u64);
		assert_eq!(input.read_varuint().unwrap(), u64::MAX);
		assert_eq!(input.read_varint().unwrap(), i64::MIN);
		assert_eq!(input.read_f64().unwrap(), f64::MIN_POSITIVE);
		assert_eq!(input.read_f32().unwrap(), f32::NEG_INFINITY);
	}

	#[test]
	fn test_overlong_varint() {
		let bytes = [0xFFu8; 1024];
		let mut input = Input::new(&bytes);
		assert!(matches!(input.read_varuint(), Err(Error::UnexpectedRead(_))));
	}

	#[test]
	fn test_varint_overflowing_last_byte() {
		let mut bytes = [0xFFu8; 10];
		bytes[9] = 0x02;
		assert!(matches!(Input::new(&bytes).read_varuint(), Err(Error::UnexpectedRead(_))));
	}

	#[rstest]
	#[case::string(&[0x0F], |i: &mut Input| i.read_str().map(drop))]
	#[case::short(&[0x01], |i: &mut Input| i.read_i16().map(drop))]
	#[case::varuint(&[0x80, 0x80], |i: &mut Input| i.read_varuint().map(drop))]
	#[case::double(&[0, 0, 0, 0], |i: &mut Input| i.read_f64().map(drop))]
	#[case::float(&[0, 0], |i: &mut Input| i.read_f32().map(drop))]
	#[case::byte(&[], |i: &mut Input| i.read_i8().map(drop))]
	#[case::bools(&[0xFF], |i: &mut Input| i.read_bools(9).map(drop))]
	#[case::bytes(&[1, 2, 3], |i: &mut Input| i.read_bytes(4).map(drop))]
	#[case::nothing(&[], |i: &mut Input| i.read_u8().map(drop))]
	fn test_truncated_input(#[case] bytes: &[u8], #[case] read: fn(&mut Input) -> Result<(), Error>) {
		let mut input = Input::new(bytes);
		assert!(matches!(read(&mut input), Err(Error::UnexpectedEnd { .. })));
	}

	#[test]
	fn test_invalid_utf8() {
		let bytes = [0x02, 0xC3, 0x28];
		assert!(matches!(Input::new(&bytes).read_str(), Err(Error::UnexpectedRead(_))));
	}

	#[test]
	fn test_bools_round_trip() {
		let values: Vec<bool> = (0..19).map(|i| i % 3 == 0).collect();
		let mut out = Output::with_limit(64);
		out.write_bools(&values).unwrap();
		assert_eq!(out.len(), 3);
		let bytes = out.finish();
		assert_eq!(Input::new(&bytes).read_bools(values.len()).unwrap(), values);
	}

	#[test]
	fn test_capacity_hint_is_bounded() {
		let bytes = [0u8; 16];
		let input = Input::new(&bytes);
		assert_eq!(input.capacity_hint(usize::MAX, 8), 2);
		assert_eq!(input.capacity_hint(3, 8), 2);
		assert_eq!(input.capacity_hint(1, 0), 1);
	}
}

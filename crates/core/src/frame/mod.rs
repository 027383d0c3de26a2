//! Encoding and decoding of frames.
//!
//! A frame is a header, the dictionary changes and literals the body needs,
//! and the body itself:
//!
//! ```text
//! frame   := head:u8 sequence:varuint [data-section] [schema-section] body
//! head    := (PROTOCOL_VERSION << 4) | HAS_SEQUENCE | HAS_DATA? | HAS_SCHEMA?
//! section := record+
//! record  := varuint((count << 4) | (flag << 1) | more) items
//! value   := varuint((payload << 3) | tag) ...
//! ```
//!
//! A [`FrameWriter`] and a [`FrameReader`] hold the two ends of the same
//! dictionaries, so frames must be read in the order they were written.

mod reader;
mod writer;

pub use self::reader::FrameReader;
pub use self::writer::FrameWriter;

/// The version written in the upper four bits of every frame header.
pub const PROTOCOL_VERSION: u8 = 1;

pub(crate) mod head {
	/// A data section follows the sequence number
	pub const HAS_DATA: u8 = 0x01;
	/// A schema section follows the data section
	pub const HAS_SCHEMA: u8 = 0x02;
	/// The header is followed by the frame sequence number
	pub const HAS_SEQUENCE: u8 = 0x04;
	pub const MASK: u8 = 0x07;
}

/// Record flags of the data section
pub(crate) mod data {
	pub const FLOAT: u8 = 1;
	pub const DOUBLE: u8 = 2;
	pub const VARINT: u8 = 3;
	pub const STRING: u8 = 4;
	pub const SYMBOL_ADDED: u8 = 5;
	pub const SYMBOL_EXPIRED: u8 = 6;
}

/// Record flags of the schema section
pub(crate) mod schema {
	pub const NAME_TMP: u8 = 1;
	pub const STRUCT_TMP: u8 = 2;
	pub const NAME_ADDED: u8 = 3;
	pub const NAME_EXPIRED: u8 = 4;
	pub const STRUCT_ADDED: u8 = 5;
	pub const STRUCT_EXPIRED: u8 = 6;
}

/// Value tags of the body
pub(crate) mod tag {
	pub const CONST: u64 = 0;
	pub const VARINT: u64 = 1;
	pub const FLOAT: u64 = 2;
	pub const DOUBLE: u64 = 3;
	pub const STRING: u64 = 4;
	pub const SYMBOL: u64 = 5;
	pub const ARRAY: u64 = 6;
	pub const OBJECT: u64 = 7;
	pub const BITS: u32 = 3;
	pub const MASK: u64 = 0x07;
}

/// Payloads of constant values
pub(crate) mod constant {
	pub const NULL: u64 = 0;
	pub const FALSE: u64 = 1;
	pub const TRUE: u64 = 2;
}

/// Bit layout of section records
pub(crate) mod record {
	pub const COUNT_SHIFT: u32 = 4;
	pub const FLAG_MASK: u64 = 0x07;
}

/// Bit layout of array slice records
pub(crate) mod slice {
	pub const COUNT_SHIFT: u32 = 5;
	pub const KIND_MASK: u64 = 0x0F;
}

/// The number of entries each dictionary gained and lost in a frame
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PoolCount {
	pub added: usize,
	pub expired: usize,
}

/// A summary of the dictionary changes carried by the last frame
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FrameDiff {
	pub names: PoolCount,
	pub structs: PoolCount,
	pub symbols: PoolCount,
}

impl FrameDiff {
	pub fn is_empty(&self) -> bool {
		*self == FrameDiff::default()
	}
}

impl From<&crate::ctx::ContextDiff> for FrameDiff {
	fn from(diff: &crate::ctx::ContextDiff) -> Self {
		FrameDiff {
			names: PoolCount {
				added: diff.names.added.len(),
				expired: diff.names.expired.len(),
			},
			structs: PoolCount {
				added: diff.structs.added.len(),
				expired: diff.structs.expired.len(),
			},
			symbols: PoolCount {
				added: diff.symbols.added.len(),
				expired: diff.symbols.expired.len(),
			},
		}
	}
}

/// The frame number which follows `v`.
pub(crate) fn next_sequence(v: i64) -> i64 {
	if v == i64::MAX {
		0
	} else {
		v + 1
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sequence_wraps() {
		assert_eq!(next_sequence(0), 1);
		assert_eq!(next_sequence(i64::MAX - 1), i64::MAX);
		assert_eq!(next_sequence(i64::MAX), 0);
	}
}

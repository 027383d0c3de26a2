//! Primitive encoding of values into and out of byte buffers.
//!
//! Fixed-width values are little-endian. Unsigned integers are written as
//! LEB128 varints, signed integers are zigzag-mapped first so that values of
//! small magnitude stay short. Strings are a varint byte length followed by
//! their UTF-8 bytes.

mod input;
mod output;

pub use self::input::Input;
pub use self::output::Output;

/// The longest encoding of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Maps a signed integer onto an unsigned one, interleaving positive and
/// negative values.
pub fn zigzag(v: i64) -> u64 {
	((v << 1) ^ (v >> 63)) as u64
}

/// Reverses [`zigzag`].
pub fn unzigzag(v: u64) -> i64 {
	((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// The number of bytes needed to write `v` as a varint.
pub fn varuint_len(v: u64) -> usize {
	let bits = 64 - (v | 1).leading_zeros() as usize;
	bits.div_ceil(7)
}

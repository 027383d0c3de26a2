use std::sync::LazyLock;

/// The maximum size in bytes of a single encoded frame (default: 64 MiB)
pub static MAX_FRAME_SIZE: LazyLock<usize> =
	lazy_env_parse!("PACKWIRE_MAX_FRAME_SIZE", usize, 64 * 1024 * 1024);

/// The number of bytes allocated up front for an output buffer (default: 1 KiB)
pub static INITIAL_FRAME_CAPACITY: LazyLock<usize> =
	lazy_env_parse!("PACKWIRE_INITIAL_FRAME_CAPACITY", usize, 1024);

/// The maximum nesting of arrays and objects which is accepted when encoding
/// or decoding a frame (default: 128)
pub static MAX_NESTING_DEPTH: LazyLock<u32> =
	lazy_env_parse!("PACKWIRE_MAX_NESTING_DEPTH", u32, 128);

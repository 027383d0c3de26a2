/// A macro that allows lazily parsing a value from the environment variable,
/// with a fallback default value if the variable is not set or parsing fails.
///
/// # Parameters
///
/// - `$key`: An expression representing the name of the environment variable.
/// - `$t`: The type of the value to be parsed.
/// - `$default`: The default value to fall back to if the environment variable is not set or
///   parsing fails.
///
/// # Return Value
///
/// A lazy static variable of type `std::sync::LazyLock`, which holds the parsed
/// value from the environment variable or the default value.
macro_rules! lazy_env_parse {
	// With no default specified
	($key:expr_2021, $t:ty) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or_default()
		})
	};
	// With a static expression for the default value
	($key:expr_2021, $t:ty, $default:expr_2021) => {
		std::sync::LazyLock::new(|| {
			std::env::var($key).ok().and_then(|s| s.parse::<$t>().ok()).unwrap_or($default)
		})
	};
}

/// Bails out of a converter with the given crate error.
///
/// Converters return `anyhow::Result`, and the registry downcasts the error
/// back into an [`Error`](crate::err::Error) when the conversion fails.
macro_rules! fail {
	($err:expr_2021) => {
		return Err(::anyhow::Error::new($err))
	};
}

#[cfg(test)]
mod tests {
	#[test]
	fn test_lazy_env_parse_default() {
		let value: std::sync::LazyLock<usize> =
			lazy_env_parse!("PACKWIRE_TEST_UNSET_VARIABLE", usize, 42);
		assert_eq!(*value, 42);
	}

	#[test]
	fn test_lazy_env_parse_no_default() {
		let value: std::sync::LazyLock<u32> = lazy_env_parse!("PACKWIRE_TEST_UNSET_VARIABLE", u32);
		assert_eq!(*value, 0);
	}
}

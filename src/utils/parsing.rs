//! Parsing utilities
//!
//! Helpers for CLI arguments and for the hex encoded quantities and byte strings
//! returned by JSON-RPC nodes.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human readable size ("1GB", "500MB", "1024KiB") into bytes.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// Parses a JSON-RPC quantity such as `"0x1b4"` into a `u64`.
pub fn parse_hex_quantity(s: &str) -> Result<u64, String> {
	let digits = s
		.strip_prefix("0x")
		.ok_or_else(|| format!("Quantity '{}' is missing the 0x prefix", s))?;
	if digits.is_empty() {
		return Err(format!("Quantity '{}' has no digits", s));
	}
	u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid quantity '{}': {}", s, e))
}

/// Decodes a JSON-RPC data string (`"0x..."`, possibly empty) into bytes.
pub fn decode_hex_data(s: &str) -> Result<Vec<u8>, String> {
	let digits = s
		.strip_prefix("0x")
		.ok_or_else(|| format!("Data '{}' is missing the 0x prefix", s))?;
	hex::decode(digits).map_err(|e| format!("Invalid hex data: {}", e))
}

/// Trims and lowercases a string for case-insensitive comparisons.
pub fn normalize_string(input: &str) -> String {
	input.trim().to_lowercase()
}

//! Utility functions

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;

pub const OBJECT_ID_LENGTH: usize = 10;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Characters escaped by `encode_uri_component`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Random lowercase hex string of `len` characters
pub fn random_hex_string(len: usize) -> String {
	let mut rng = rand::rng();
	(0..len).map(|_| HEX[rng.random_range(0..HEX.len())] as char).collect()
}

/// Random alphanumeric string of `len` characters
pub fn random_string(len: usize) -> String {
	let mut rng = rand::rng();
	(0..len).map(|_| SAFE[rng.random_range(0..SAFE.len())]).collect()
}

/// New random object id
pub fn new_object_id() -> String {
	random_string(OBJECT_ID_LENGTH)
}

/// New session token (`r:` followed by 32 hex characters)
pub fn new_session_token() -> String {
	format!("r:{}", random_hex_string(32))
}

/// Percent-encodes a single URI component, leaving `A-Za-z0-9-_.!~*'()` as is
pub fn encode_uri_component(s: &str) -> String {
	utf8_percent_encode(s, URI_COMPONENT).to_string()
}


// vim: ts=4

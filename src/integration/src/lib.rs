//! Integration tests.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(missing_docs)]

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use iid_attest::Scheme;
use rand::Rng;

/// Claim of the mock identity documents that can be altered without making
/// the document unparseable or changing the region it claims.
pub const TAMPERABLE_CLAIM: &str = "instanceId";

/// Flip the low bit of byte `index` of a base64 encoded signature and
/// re-encode it. Negative indexes count from the end.
///
/// # Panics
///
/// Panics if `encoded` is not base64 or `index` is out of range.
#[must_use]
pub fn tamper_signature_byte(encoded: &str, index: isize) -> String {
	let compact: String =
		encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
	let mut bytes = STANDARD.decode(compact).expect("valid base64");

	let index = if index < 0 {
		bytes.len() - index.unsigned_abs()
	} else {
		index.unsigned_abs()
	};
	bytes[index] ^= 0x01;

	STANDARD.encode(bytes)
}

/// Replace the `nth` base64 data character of `encoded` with a different
/// one. Whitespace and padding are not counted.
///
/// # Panics
///
/// Panics if `encoded` has fewer than `nth + 1` data characters.
#[must_use]
pub fn flip_signature_char(encoded: &str, nth: usize) -> String {
	let position = encoded
		.char_indices()
		.filter(|(_, c)| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
		.nth(nth)
		.map(|(i, _)| i)
		.expect("signature has enough characters");

	let mut flipped = encoded.to_string();
	let replacement = if &encoded[position..=position] == "A" { "B" } else { "A" };
	flipped.replace_range(position..=position, replacement);
	flipped
}

/// Number of base64 data characters in `encoded`.
#[must_use]
pub fn signature_char_count(encoded: &str) -> usize {
	encoded
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
		.count()
}

/// Change one randomly chosen character in the string value of `claim`,
/// keeping the document valid JSON.
///
/// # Panics
///
/// Panics if `document` has no string `claim` member.
#[must_use]
pub fn tamper_document_claim<R: Rng>(
	document: &[u8],
	claim: &str,
	rng: &mut R,
) -> Vec<u8> {
	let key = format!("\"{claim}\"");
	let key_at = document
		.windows(key.len())
		.position(|window| window == key.as_bytes())
		.expect("claim is present");
	let value_start = key_at
		+ key.len()
		+ document[key_at + key.len()..]
			.iter()
			.position(|b| *b == b'"')
			.expect("claim has a string value")
		+ 1;
	let value_len = document[value_start..]
		.iter()
		.position(|b| *b == b'"')
		.expect("string value is terminated");

	let mut tampered = document.to_vec();
	let position = value_start + rng.gen_range(0..value_len);
	tampered[position] = if tampered[position] == b'0' { b'1' } else { b'0' };
	tampered
}

/// Write `cert` where a [`iid_attest::FsCertStore`] rooted at `root` looks up
/// the anchor for `region` under `scheme`, using extension `ext`.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_anchor(
	root: &Path,
	scheme: Scheme,
	region: &str,
	ext: &str,
	cert: &[u8],
) {
	let dir = root.join(scheme.namespace());
	std::fs::create_dir_all(&dir).expect("create namespace dir");
	std::fs::write(dir.join(format!("{region}.{ext}")), cert)
		.expect("write anchor");
}

//! Verifier configuration.

/// What to do when an anchor's RSA modulus does not have the size its
/// scheme prescribes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeySizePolicy {
	/// Refuse the anchor with [`crate::AttestError::InvalidKeyMaterial`].
	#[default]
	Strict,
	/// Log a warning and verify with the anchor anyway.
	Warn,
}

/// Configuration for a [`crate::Verifier`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifierConfig {
	/// Handling of anchors with an unexpected modulus size.
	pub key_size_policy: KeySizePolicy,
}

impl VerifierConfig {
	/// Configuration that tolerates anchors with an unexpected modulus size.
	#[must_use]
	pub fn lenient() -> Self {
		Self { key_size_policy: KeySizePolicy::Warn }
	}
}

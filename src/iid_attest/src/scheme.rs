//! Signing schemes the provider has used for identity documents.

use std::{fmt, str::FromStr};

use crate::AttestError;

/// Certificate store namespace of [`Scheme::RawRsa1024`].
pub const RAW_RSA_1024: &str = "raw-rsa-1024";
/// Certificate store namespace of [`Scheme::RawRsa2048Envelope`].
pub const RAW_RSA_2048_CMS: &str = "raw-rsa-2048-cms";
/// Certificate store namespace of [`Scheme::DsaLegacy`].
pub const DSA_LEGACY: &str = "dsa-legacy";

/// A signing scheme. Each scheme owns exactly one certificate store
/// namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
	/// Bare PKCS#1 v1.5 RSA signature over the SHA-256 digest of the
	/// document, checked with a 1024 bit anchor.
	RawRsa1024,
	/// CMS `SignedData` envelope with a detached document, checked with a
	/// 2048 bit anchor.
	RawRsa2048Envelope,
	/// Legacy DSA scheme. Anchors can still be resolved but signatures are
	/// no longer verified.
	DsaLegacy,
}

impl Scheme {
	/// Every scheme, in namespace order.
	pub const ALL: [Scheme; 3] =
		[Scheme::RawRsa1024, Scheme::RawRsa2048Envelope, Scheme::DsaLegacy];

	/// The stable certificate store namespace for this scheme.
	#[must_use]
	pub fn namespace(&self) -> &'static str {
		match self {
			Scheme::RawRsa1024 => RAW_RSA_1024,
			Scheme::RawRsa2048Envelope => RAW_RSA_2048_CMS,
			Scheme::DsaLegacy => DSA_LEGACY,
		}
	}

	/// RSA modulus size in bits an anchor of this scheme must have. `None`
	/// for schemes without RSA anchors.
	#[must_use]
	pub fn expected_modulus_bits(&self) -> Option<usize> {
		match self {
			Scheme::RawRsa1024 => Some(1024),
			Scheme::RawRsa2048Envelope => Some(2048),
			Scheme::DsaLegacy => None,
		}
	}

	/// Whether signatures under this scheme are still verified.
	#[must_use]
	pub fn is_verifiable(&self) -> bool {
		!matches!(self, Scheme::DsaLegacy)
	}

	/// Map the procedure names used by older tooling (`base64`, `rsa2048`,
	/// `pkcs7`) to a scheme.
	pub fn from_legacy_procedure(procedure: &str) -> Result<Self, AttestError> {
		match procedure {
			"base64" => Ok(Scheme::RawRsa1024),
			"rsa2048" => Ok(Scheme::RawRsa2048Envelope),
			"pkcs7" => Ok(Scheme::DsaLegacy),
			other => Err(AttestError::UnsupportedScheme(other.to_string())),
		}
	}
}

impl fmt::Display for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.namespace())
	}
}

impl FromStr for Scheme {
	type Err = AttestError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Scheme::ALL
			.into_iter()
			.find(|scheme| scheme.namespace() == s)
			.ok_or_else(|| AttestError::UnsupportedScheme(s.to_string()))
	}
}

//! Errors for identity document verification.
//!
//! Every variant is a fault the caller or an operator has to act on. A
//! signature that does not verify is never an error, it is `Ok(false)`.

use crate::scheme::Scheme;

/// Attestation error.
#[derive(Debug)]
pub enum AttestError {
	/// The scheme name is unknown, or the scheme is known but can no longer
	/// be verified.
	UnsupportedScheme(String),
	/// A required input was empty. Holds the name of the input.
	MissingInput(&'static str),
	/// The certificate store has no anchor for this scheme and region.
	AnchorNotFound {
		/// Scheme whose namespace was searched.
		scheme: Scheme,
		/// Region key that was looked up.
		region: String,
	},
	/// The anchor was resolved for a different scheme than the one the
	/// signature is checked under.
	AnchorSchemeMismatch {
		/// Scheme the signature is checked under.
		expected: Scheme,
		/// Scheme the anchor belongs to.
		actual: Scheme,
	},
	/// The stored anchor bytes are not an X.509 certificate.
	MalformedCertificate(der::Error),
	/// The anchor's public key cannot be used to verify this scheme.
	InvalidKeyMaterial(String),
	/// The signature container could not be decoded as CMS `SignedData`.
	MalformedSignature(String),
	/// The CMS `SignedData` does not carry exactly one `SignerInfo`.
	UnsupportedSignerCount(usize),
	/// The identity document is not a JSON object.
	MalformedDocument(String),
	/// The identity document has no string `region` member.
	MissingRegion,
	/// The certificate store failed for a reason other than a missing entry.
	StoreIo(std::io::Error),
}

impl From<std::io::Error> for AttestError {
	fn from(e: std::io::Error) -> Self {
		Self::StoreIo(e)
	}
}

impl std::fmt::Display for AttestError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnsupportedScheme(scheme) => {
				write!(f, "unsupported scheme: {scheme}")
			}
			Self::MissingInput(input) => write!(f, "missing input: {input}"),
			Self::AnchorNotFound { scheme, region } => {
				write!(f, "no {scheme} certificate for region: {region}")
			}
			Self::AnchorSchemeMismatch { expected, actual } => {
				write!(
					f,
					"anchor belongs to {actual}, signature is checked under {expected}"
				)
			}
			Self::MalformedCertificate(e) => {
				write!(f, "malformed certificate: {e}")
			}
			Self::InvalidKeyMaterial(reason) => {
				write!(f, "invalid key material: {reason}")
			}
			Self::MalformedSignature(reason) => {
				write!(f, "malformed signature container: {reason}")
			}
			Self::UnsupportedSignerCount(count) => {
				write!(f, "expected exactly one signer, found {count}")
			}
			Self::MalformedDocument(reason) => {
				write!(f, "malformed identity document: {reason}")
			}
			Self::MissingRegion => {
				write!(f, "identity document has no region")
			}
			Self::StoreIo(e) => write!(f, "certificate store error: {e}"),
		}
	}
}

impl std::error::Error for AttestError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::MalformedCertificate(e) => Some(e),
			Self::StoreIo(e) => Some(e),
			_ => None,
		}
	}
}

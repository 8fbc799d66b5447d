//! The verification entry point.
//!
//! A verification moves through three states: the inputs are checked, the
//! anchor for the region the document claims is resolved, and the signature
//! is checked against it, ending valid or invalid. Contract violations stop
//! the machine with an error before a verdict is reached.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::{
	anchor, cms, raw, syntactic_validation, AttestError, CertStore, Scheme,
	TrustAnchor, VerifierConfig,
};

/// JSON member of the identity document naming its region.
const REGION_CLAIM: &str = "region";

/// Verifies identity documents against the anchors of a [`CertStore`].
///
/// A verifier holds no mutable state, so one instance can serve any number
/// of threads as long as the store can.
#[derive(Debug, Clone)]
pub struct Verifier<S> {
	store: S,
	config: VerifierConfig,
}

impl<S: CertStore> Verifier<S> {
	/// Create a verifier with the default configuration.
	pub fn new(store: S) -> Self {
		Self::with_config(store, VerifierConfig::default())
	}

	/// Create a verifier with `config`.
	pub fn with_config(store: S, config: VerifierConfig) -> Self {
		Self { store, config }
	}

	/// The configuration in effect.
	pub fn config(&self) -> VerifierConfig {
		self.config
	}

	/// The backing certificate store.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Resolve the anchor registered for `region` under `scheme`. Useful on
	/// its own for diagnostics, and for caching anchors to use with
	/// [`Self::verify_with_anchor`].
	pub fn resolve_anchor(
		&self,
		region: &str,
		scheme: Scheme,
	) -> Result<TrustAnchor, AttestError> {
		anchor::resolve(&self.store, region, scheme)
	}

	/// Verify the base64 encoded `signature` over the exact bytes of
	/// `document` under `scheme`.
	///
	/// The anchor is chosen by the `region` member of the document. Returns
	/// `Ok(false)` when the signature is not genuine for this document.
	///
	/// # Arguments
	///
	/// * `document` - the identity document exactly as it was signed.
	/// * `signature` - the signature in its base64 transport encoding, line
	///   breaks allowed.
	/// * `scheme` - the scheme the signature was produced with.
	pub fn verify(
		&self,
		document: &[u8],
		signature: &str,
		scheme: Scheme,
	) -> Result<bool, AttestError> {
		syntactic_validation::document(document)?;
		syntactic_validation::signature(signature)?;
		syntactic_validation::verifiable(scheme)?;

		let region = document_region(document)?;
		let anchor = self.resolve_anchor(&region, scheme)?;

		self.check(document, signature, scheme, &anchor)
	}

	/// [`Self::verify`] with the scheme given by its namespace name, for
	/// callers that receive it as a string.
	pub fn verify_named(
		&self,
		document: &[u8],
		signature: &str,
		scheme: &str,
	) -> Result<bool, AttestError> {
		self.verify(document, signature, scheme.parse()?)
	}

	/// [`Self::verify`] with an anchor the caller already resolved.
	///
	/// A document claiming a region other than the anchor's is not genuine
	/// for that anchor and yields `Ok(false)`.
	pub fn verify_with_anchor(
		&self,
		document: &[u8],
		signature: &str,
		scheme: Scheme,
		anchor: &TrustAnchor,
	) -> Result<bool, AttestError> {
		syntactic_validation::document(document)?;
		syntactic_validation::signature(signature)?;
		syntactic_validation::verifiable(scheme)?;
		if anchor.scheme() != scheme {
			return Err(AttestError::AnchorSchemeMismatch {
				expected: scheme,
				actual: anchor.scheme(),
			});
		}

		let region = document_region(document)?;
		if region != anchor.region() {
			log::warn!(
				"document claims region {region}, anchor is for {}",
				anchor.region()
			);
			return Ok(false);
		}

		self.check(document, signature, scheme, anchor)
	}

	fn check(
		&self,
		document: &[u8],
		signature: &str,
		scheme: Scheme,
		anchor: &TrustAnchor,
	) -> Result<bool, AttestError> {
		let signature = match decode_signature(signature) {
			Ok(signature) => signature,
			Err(e) => {
				log::warn!("signature is not base64: {e}");
				return Ok(false);
			}
		};

		let policy = self.config.key_size_policy;
		let verdict = match scheme {
			Scheme::RawRsa1024 => {
				raw::verify_raw(document, &signature, anchor, policy)?
			}
			Scheme::RawRsa2048Envelope => {
				cms::verify_enveloped(document, &signature, anchor, policy)?
			}
			Scheme::DsaLegacy => {
				return Err(AttestError::UnsupportedScheme(scheme.to_string()))
			}
		};

		log::debug!(
			"{scheme} signature for {} is {}",
			anchor.region(),
			if verdict { "valid" } else { "invalid" }
		);
		Ok(verdict)
	}
}

/// The region an identity document claims.
///
/// Fails with [`AttestError::MalformedDocument`] if `document` is not a JSON
/// object and with [`AttestError::MissingRegion`] if it has no non-empty
/// string `region` member.
pub fn document_region(document: &[u8]) -> Result<String, AttestError> {
	let claims = match serde_json::from_slice(document) {
		Ok(Value::Object(claims)) => claims,
		Ok(_) => {
			return Err(AttestError::MalformedDocument(
				"not a JSON object".to_string(),
			))
		}
		Err(e) => return Err(AttestError::MalformedDocument(e.to_string())),
	};

	match claims.get(REGION_CLAIM) {
		Some(Value::String(region)) if !region.is_empty() => Ok(region.clone()),
		_ => Err(AttestError::MissingRegion),
	}
}

/// Decode a signature from its base64 transport encoding. ASCII whitespace,
/// such as the line breaks the provider inserts, is ignored.
pub(crate) fn decode_signature(
	encoded: &str,
) -> Result<Vec<u8>, base64::DecodeError> {
	let compact: String =
		encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
	STANDARD.decode(compact)
}

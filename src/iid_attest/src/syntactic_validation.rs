//! Basic validation of the caller supplied inputs of a verification.

use crate::{AttestError, Scheme};

/// Mandatory input
pub(crate) fn document(document: &[u8]) -> Result<(), AttestError> {
	if document.is_empty() {
		Err(AttestError::MissingInput("document"))
	} else {
		Ok(())
	}
}
/// Mandatory input. Whitespace alone is not a signature.
pub(crate) fn signature(signature: &str) -> Result<(), AttestError> {
	if signature.trim().is_empty() {
		Err(AttestError::MissingInput("signature"))
	} else {
		Ok(())
	}
}
/// Mandatory input
pub(crate) fn region(region: &str) -> Result<(), AttestError> {
	if region.is_empty() {
		Err(AttestError::MissingInput("region"))
	} else {
		Ok(())
	}
}

/// The scheme must still be verified.
pub(crate) fn verifiable(scheme: Scheme) -> Result<(), AttestError> {
	if scheme.is_verifiable() {
		Ok(())
	} else {
		Err(AttestError::UnsupportedScheme(scheme.to_string()))
	}
}
